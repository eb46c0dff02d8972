use slugscope_app::fixture::Fixture;
use slugscope_app::runner::run;
use slugscope_core::config::Settings;
use slugscope_service::token::SequenceTokenSource;

const CATALOG: &str = r#"{
    "stores": [
        { "id": 1, "website": "base" },
        { "id": 2, "website": "base" },
        { "id": 3, "website": "outlet" }
    ],
    "config": [
        { "path": "catalog/seo/product_url_suffix", "scope_id": 1, "value": ".html" },
        { "path": "catalog/seo/product_url_suffix", "scope_id": 2, "value": ".html" },
        { "path": "catalog/seo/product_url_suffix", "scope_id": 3, "value": "" }
    ],
    "paths": [
        { "url_rewrite_id": 1, "store_id": 3, "entity_id": 5,
          "entity_type": "catalog_product", "request_path": "boots" }
    ],
    "requests": [
        {
            "attribute": { "entity_type": "catalog_product", "code": "url_key", "scope": "global" },
            "entity": { "id": 6, "data": { "url_key": "boots" } },
            "persist": true
        },
        {
            "attribute": { "entity_type": "catalog_product", "code": "url_key", "scope": "store" },
            "entity": { "id": 5, "data": { "store_id": 3, "url_key": "boots" } }
        },
        {
            "attribute": { "entity_type": "catalog_product", "code": "url_key", "scope": "website" },
            "entity": { "id": 7, "data": { "scope_id": 2, "url_key": "Boots.HTML" } },
            "extensible": true
        }
    ]
}"#;

const SETTINGS: &str = r#"
[resolver]
default_suffix = ".html"
suffix_config_path = "catalog/seo/product_url_suffix"

[logging]
level = "debug"
"#;

#[test_log::test]
fn test_fixture_run() {
    let settings = Settings::from_toml_str(SETTINGS).unwrap();
    let fixture = Fixture::from_json_str(CATALOG).unwrap();
    let index = fixture.index();
    let tokens = SequenceTokenSource::new(["r2d2", "c3po"]);

    let resolutions = run(&settings.resolver, &fixture, &index, &tokens).unwrap();
    let values: Vec<_> = resolutions.iter().map(|r| r.value.as_str()).collect();

    // global request: scope 3 has no suffix, so "boots" collides with entity 5
    // request 2: entity 5 re-saving its own path in scope 3
    // request 3: existing suffix normalized to the configured case
    assert_eq!(values, ["boots-r2d2.html", "boots", "Boots.html"]);
    assert_eq!(tokens.issued(), 1);
    assert_eq!(resolutions[0].paths.len(), 3);
    assert_eq!(resolutions[0].paths[2].request_path, "boots-r2d2");
    assert_eq!(resolutions[1].attempts, 0);
    assert_eq!(index.records().unwrap().len(), 4);
}

#[test]
fn test_resolution_serializes_without_empty_fields() {
    let fixture = Fixture::from_json_str(
        r#"{
            "stores": [{ "id": 1, "website": "base" }],
            "requests": [{
                "attribute": { "entity_type": "cms_page", "code": "identifier" },
                "entity": { "data": { "identifier": "about-us" } }
            }]
        }"#,
    )
    .unwrap();
    let index = fixture.index();
    let settings = Settings::from_toml_str("").unwrap();

    let resolutions = run(&settings.resolver, &fixture, &index, SequenceTokenSource::new(["x"])).unwrap();
    let line = serde_json::to_value(&resolutions[0]).unwrap();

    assert_eq!(line["value"], "about-us");
    assert_eq!(
        line["paths"][0],
        serde_json::json!({
            "store_id": 1,
            "entity_type": "cms_page",
            "request_path": "about-us"
        })
    );
}
