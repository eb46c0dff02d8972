use slugscope_core::types::ScopeId;
use slugscope_service::entity::Attribute;
use slugscope_service::index::MemoryPathIndex;
use slugscope_service::scope::MapConfigLookup;
use slugscope_service::token::SequenceTokenSource;
use slugscope_service::{ScopedSlugResolver, ServiceError};
use slugscope_test::{HTML, PRODUCT, URL_KEY, entity, two_websites};

#[test_log::test]
fn test_persisted_paths_block_later_entities() {
    let index = MemoryPathIndex::new();
    let tokens = SequenceTokenSource::new(["q1w2"]);
    let resolver =
        ScopedSlugResolver::with_tokens(&index, two_websites(), MapConfigLookup::new(), &tokens)
            .with_default_suffix(Some(HTML.to_string()));
    let attribute = Attribute::website(PRODUCT, URL_KEY);

    let first = resolver
        .generate_projected(&entity(Some(1), Some(1), "hats"), &attribute)
        .unwrap();
    index.persist(&first.paths).unwrap();

    let second = resolver
        .generate_projected(&entity(Some(2), Some(2), "hats"), &attribute)
        .unwrap();
    index.persist(&second.paths).unwrap();

    assert_eq!(first.value, "hats.html");
    assert_eq!(second.value, "hats-q1w2.html");
    assert_eq!(index.records().unwrap().len(), 4);
}

#[test]
fn test_resave_updates_in_place() {
    let index = MemoryPathIndex::new();
    let resolver = ScopedSlugResolver::new(&index, two_websites(), MapConfigLookup::new())
        .with_default_suffix(Some(HTML.to_string()));
    let attribute = Attribute::global(PRODUCT, URL_KEY);

    let first = resolver
        .generate_projected(&entity(Some(1), None, "hats"), &attribute)
        .unwrap();
    let first_ids = index.persist(&first.paths).unwrap();

    let again = resolver
        .generate_projected(&entity(Some(1), None, "hats.html"), &attribute)
        .unwrap();
    let again_ids = index.persist(&again.paths).unwrap();

    assert_eq!(again.attempts, 0);
    assert_eq!(first_ids, again_ids);
    assert_eq!(index.records().unwrap().len(), 3);
}

#[test]
fn test_race_window_caught_by_persist() {
    let index = MemoryPathIndex::new();
    let resolver = ScopedSlugResolver::new(&index, two_websites(), MapConfigLookup::new())
        .with_default_suffix(Some(HTML.to_string()));
    let attribute = Attribute::store(PRODUCT, URL_KEY);

    // both resolve before either persists
    let first = resolver
        .generate_projected(&entity(Some(1), Some(3), "hats"), &attribute)
        .unwrap();
    let second = resolver
        .generate_projected(&entity(Some(2), Some(3), "hats"), &attribute)
        .unwrap();
    assert_eq!(first.value, second.value);

    index.persist(&first.paths).unwrap();
    let err = index.persist(&second.paths).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // a fresh resolution now sees the recorded path
    let retried = resolver
        .generate_projected(&entity(Some(2), Some(3), "hats"), &attribute)
        .unwrap();
    assert_ne!(retried.value, first.value);
    assert!(retried.paths.iter().all(|p| p.store_id == ScopeId(3)));
    index.persist(&retried.paths).unwrap();
}
