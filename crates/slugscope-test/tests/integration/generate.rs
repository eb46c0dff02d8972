use slugscope_core::types::{EntityId, ScopeId};
use slugscope_service::ScopedSlugResolver;
use slugscope_service::entity::Attribute;
use slugscope_service::index::MemoryPathIndex;
use slugscope_service::scope::MapConfigLookup;
use slugscope_service::token::SequenceTokenSource;
use slugscope_test::{CollidingIndex, HTML, PRODUCT, RecordingIndex, URL_KEY, entity, path, two_websites};

#[test_log::test]
fn test_blue_shoes_end_to_end() {
    let index = RecordingIndex::default();
    let resolver = ScopedSlugResolver::new(&index, two_websites(), MapConfigLookup::new())
        .with_default_suffix(Some(HTML.to_string()));

    let generated = resolver
        .generate_projected(
            &entity(Some(42), Some(1), "Blue Shoes"),
            &Attribute::store(PRODUCT, URL_KEY),
        )
        .unwrap();

    assert_eq!(generated.value, "Blue Shoes.html");
    assert_eq!(generated.paths, vec![path(1, 42, PRODUCT, "Blue Shoes.html")]);

    let exact = index.exact_queries();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0], path(1, 42, PRODUCT, "Blue Shoes.html").criteria());

    let record = serde_json::to_value(&generated.paths[0]).unwrap();
    assert_eq!(
        record,
        serde_json::json!({
            "store_id": 1,
            "entity_id": 42,
            "entity_type": "catalog_product",
            "request_path": "Blue Shoes.html"
        })
    );
}

#[test_log::test]
fn test_other_entity_forces_token() {
    let index = MemoryPathIndex::new();
    index.insert(path(1, 7, PRODUCT, "shoes.html")).unwrap();
    let resolver = ScopedSlugResolver::new(&index, two_websites(), MapConfigLookup::new())
        .with_default_suffix(Some(HTML.to_string()));

    let value = resolver
        .generate(&entity(Some(42), Some(1), "shoes"), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_ne!(value, "shoes.html");
    let token = value
        .strip_prefix("shoes-")
        .and_then(|rest| rest.strip_suffix(HTML))
        .unwrap();
    assert_eq!(token.chars().count(), 4);
}

#[test]
fn test_self_update_keeps_value() {
    let index = MemoryPathIndex::new();
    index.insert(path(1, 42, PRODUCT, "shoes.html")).unwrap();
    let tokens = SequenceTokenSource::new(["zzzz"]);
    let resolver =
        ScopedSlugResolver::with_tokens(&index, two_websites(), MapConfigLookup::new(), &tokens)
            .with_default_suffix(Some(HTML.to_string()));

    for candidate in ["shoes", "shoes.html", "SHOES.HTML"] {
        let generated = resolver
            .generate_projected(
                &entity(Some(42), Some(1), candidate),
                &Attribute::store(PRODUCT, URL_KEY),
            )
            .unwrap();

        assert_eq!(generated.attempts, 0, "candidate {candidate}");
        assert!(generated.available);
    }
    assert_eq!(tokens.issued(), 0);
}

#[test]
fn test_same_path_other_entity_type_collides() {
    let index = MemoryPathIndex::new();
    index.insert(path(1, 42, "catalog_category", "shoes.html")).unwrap();
    let tokens = SequenceTokenSource::new(["c4t1"]);
    let resolver =
        ScopedSlugResolver::with_tokens(&index, two_websites(), MapConfigLookup::new(), &tokens)
            .with_default_suffix(Some(HTML.to_string()));

    let value = resolver
        .generate(&entity(Some(42), Some(1), "shoes"), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(value, "shoes-c4t1.html");
}

#[test]
fn test_new_entity_collides_with_existing_path() {
    let index = MemoryPathIndex::new();
    index.insert(path(2, 7, PRODUCT, "boots.html")).unwrap();
    let tokens = SequenceTokenSource::new(["n3w1"]);
    let resolver =
        ScopedSlugResolver::with_tokens(&index, two_websites(), MapConfigLookup::new(), &tokens)
            .with_default_suffix(Some(HTML.to_string()));

    let generated = resolver
        .generate_projected(&entity(None, Some(2), "boots"), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(generated.value, "boots-n3w1.html");
    assert!(generated.paths.iter().all(|p| p.entity_id.is_none()));
}

#[test_log::test]
fn test_retry_bound() {
    let tokens = SequenceTokenSource::new(["a1b2", "c3d4"]);
    let resolver =
        ScopedSlugResolver::with_tokens(CollidingIndex, two_websites(), MapConfigLookup::new(), &tokens)
            .with_default_suffix(Some(HTML.to_string()));

    let generated = resolver
        .generate_projected(&entity(Some(42), Some(1), "shoes"), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(tokens.issued(), 100);
    assert_eq!(generated.attempts, 100);
    assert!(!generated.available);
    // 100th token wraps back to the second entry
    assert_eq!(generated.value, "shoes-c3d4.html");
}

#[test]
fn test_retry_bound_configurable() {
    let tokens = SequenceTokenSource::new(["a1b2"]);
    let resolver =
        ScopedSlugResolver::with_tokens(CollidingIndex, two_websites(), MapConfigLookup::new(), &tokens)
            .with_max_attempts(5);

    let generated = resolver
        .generate_projected(&entity(Some(42), Some(1), "shoes"), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(generated.attempts, 5);
    assert_eq!(tokens.issued(), 5);
}

#[test]
fn test_empty_value_omits_request_path() {
    let index = RecordingIndex::default();
    let resolver = ScopedSlugResolver::new(&index, two_websites(), MapConfigLookup::new());

    let generated = resolver
        .generate_projected(&entity(Some(42), Some(1), ""), &Attribute::store(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(generated.value, "");
    let record = serde_json::to_value(&generated.paths[0]).unwrap();
    assert!(record.get("request_path").is_none());
    assert_eq!(record.get("store_id"), Some(&serde_json::json!(1)));
    // nothing to collide with, so no broad query is issued
    assert!(index.broad_queries().is_empty());
}

#[test]
fn test_missing_attribute_value_treated_as_empty() {
    let resolver = ScopedSlugResolver::new(MemoryPathIndex::new(), two_websites(), MapConfigLookup::new())
        .with_default_suffix(Some(HTML.to_string()));

    let value = resolver
        .generate(&entity(Some(1), Some(1), "x"), &Attribute::store(PRODUCT, "name"))
        .unwrap();

    assert_eq!(value, HTML);
}

#[test]
fn test_per_scope_suffix_in_projection() {
    let lookup = MapConfigLookup::new()
        .with_value("seo/suffix", "store", ScopeId(1), ".html")
        .with_value("seo/suffix", "store", ScopeId(2), ".htm");
    let resolver = ScopedSlugResolver::new(MemoryPathIndex::new(), two_websites(), &lookup)
        .with_suffix_config_path(Some("seo/suffix".to_string()));

    let generated = resolver
        .generate_projected(&entity(Some(5), Some(2), "hats"), &Attribute::website(PRODUCT, URL_KEY))
        .unwrap();

    assert_eq!(generated.value, "hats.htm");
    let request_paths: Vec<_> = generated
        .paths
        .iter()
        .map(|p| (p.store_id, p.entity_id, p.request_path.as_str()))
        .collect();
    assert_eq!(
        request_paths,
        [
            (ScopeId(1), Some(EntityId(5)), "hats.html"),
            (ScopeId(2), Some(EntityId(5)), "hats.htm"),
        ]
    );
    assert_eq!(lookup.reads(), 2);
}
