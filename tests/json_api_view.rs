use jsonapi_view::logic::{JsonApiEncoder, SchemaResolver, StaticSchema};
use jsonapi_view::model::{
    EncodeError, EntityClass, Environment, PresentationOptions, Record, ViewVars,
};
use jsonapi_view::seed;
use jsonapi_view::store::{FindQuery, MemoryStore, RecordStore};
use serde_json::{json, Value};
use std::sync::Arc;

const COUNTRY_COMPACT: &str = r#"{"data":{"type":"countries","id":"1","attributes":{"code":"NL","name":"The Netherlands","dummy-counter":11111},"relationships":{"currency":{"links":{"self":"\/currencies\/1"},"data":{"type":"currencies","id":"1"}},"national-capital":{"links":{"self":"\/national_capitals\/view\/1"},"data":{"type":"national-capitals","id":"1"}}},"links":{"self":"\/countries\/1"}}}"#;

const COUNTRY_PRETTY: &str = r#"{
    "data": {
        "type": "countries",
        "id": "1",
        "attributes": {
            "code": "NL",
            "name": "The Netherlands",
            "dummy-counter": 11111
        },
        "relationships": {
            "currency": {
                "links": {
                    "self": "\/currencies\/1"
                },
                "data": {
                    "type": "currencies",
                    "id": "1"
                }
            },
            "national-capital": {
                "links": {
                    "self": "\/national_capitals\/view\/1"
                },
                "data": {
                    "type": "national-capitals",
                    "id": "1"
                }
            }
        },
        "links": {
            "self": "\/countries\/1"
        }
    }
}"#;

const COUNTRIES_COMPACT: &str = r#"{"data":[{"type":"countries","id":"1","attributes":{"code":"NL","name":"The Netherlands","dummy-counter":11111},"relationships":{"currency":{"links":{"self":"\/currencies\/1"},"data":{"type":"currencies","id":"1"}},"national-capital":{"links":{"self":"\/national_capitals\/view\/1"},"data":{"type":"national-capitals","id":"1"}}},"links":{"self":"\/countries\/1"}},{"type":"countries","id":"2","attributes":{"code":"BE","name":"Belgium","dummy-counter":22222},"relationships":{"currency":{"links":{"self":"\/currencies\/1"},"data":{"type":"currencies","id":"1"}},"national-capital":{"links":{"self":"\/national_capitals\/view\/2"},"data":{"type":"national-capitals","id":"2"}}},"links":{"self":"\/countries\/2"}}]}"#;

// Test fixture wrapper around the seeded store and one encoder
struct ViewFixture {
    store: MemoryStore,
    encoder: JsonApiEncoder,
}

impl ViewFixture {
    fn new() -> Self {
        Self::with_store(seed::seeded_store().unwrap())
    }

    fn with_store(store: MemoryStore) -> Self {
        let encoder = JsonApiEncoder::new(Arc::new(SchemaResolver::new(store.registry())));
        Self { store, encoder }
    }

    async fn country(&self, id: &str) -> Record {
        self.store.get("Countries", id, &[]).await.unwrap().unwrap()
    }

    async fn countries(&self) -> Vec<Record> {
        self.store
            .find_all("Countries", &FindQuery::default())
            .await
            .unwrap()
            .records
    }

    fn render(&self, vars: &ViewVars) -> Result<Option<String>, EncodeError> {
        self.encoder
            .render_view_vars(vars, &PresentationOptions::default())
    }

    fn render_json(&self, vars: &ViewVars) -> Value {
        let body = self.render(vars).unwrap().unwrap();
        serde_json::from_str(&body).unwrap()
    }
}

#[tokio::test]
async fn test_encode_with_generic_entity() {
    let mut registry = seed::registry();
    let countries = registry.get("Countries").unwrap();
    registry.register((*countries).clone().with_entity_class(EntityClass::Generic));
    let store = MemoryStore::new(Arc::new(registry));
    seed::load_seed_data(&store).unwrap();
    let fixture = ViewFixture::with_store(store);

    let vars = ViewVars::new().with("countries", fixture.countries().await);
    let err = fixture.render(&vars).unwrap_err();

    assert!(matches!(err, EncodeError::Schema(_)));
    assert_eq!(
        err.to_string(),
        "Entity classes must not be the generic \"Entity\" class for repository \"Countries\""
    );
}

#[tokio::test]
async fn test_encode_with_dynamic_schemas() {
    let fixture = ViewFixture::new();

    // collection of entities without relationships
    let vars = ViewVars::new()
        .with("countries", fixture.countries().await)
        .with("_jsonOptions", json!(0))
        .with("_debugPrettyPrint", false);
    assert_eq!(fixture.render(&vars).unwrap().unwrap(), COUNTRIES_COMPACT);

    // single entity without relationships
    let vars = ViewVars::new().with("countries", fixture.country("1").await);
    assert_eq!(fixture.render(&vars).unwrap().unwrap(), COUNTRY_PRETTY);
}

#[tokio::test]
async fn test_encode_without_schemas() {
    let fixture = ViewFixture::new();

    // empty body
    let vars = ViewVars::new().with("_meta", false);
    assert_eq!(fixture.render(&vars).unwrap(), None);

    // body with only a `meta` node
    let vars = ViewVars::new().with("_meta", json!({"author": "bravo-kernel"}));
    assert_eq!(
        fixture.render(&vars).unwrap().unwrap(),
        "{\n    \"meta\": {\n        \"author\": \"bravo-kernel\"\n    }\n}"
    );
}

#[tokio::test]
async fn test_optional_with_json_api_version() {
    let fixture = ViewFixture::new();
    let countries = fixture.countries().await;

    let vars = ViewVars::new()
        .with("countries", countries.clone())
        .with("_withJsonApiVersion", true);
    assert_eq!(fixture.render_json(&vars)["jsonapi"], json!({"version": "1.1"}));

    let vars = ViewVars::new()
        .with("countries", countries.clone())
        .with(
            "_withJsonApiVersion",
            json!({"meta-key-1": "meta-val-1", "meta-key-2": "meta-val-2"}),
        );
    assert_eq!(
        fixture.render_json(&vars)["jsonapi"],
        json!({"version": "1.1", "meta": {"meta-key-1": "meta-val-1", "meta-key-2": "meta-val-2"}})
    );

    let vars = ViewVars::new()
        .with("countries", countries)
        .with("_withJsonApiVersion", false);
    assert!(fixture.render_json(&vars).get("jsonapi").is_none());
}

#[tokio::test]
async fn test_optional_meta() {
    let fixture = ViewFixture::new();
    let countries = fixture.countries().await;

    let vars = ViewVars::new()
        .with("countries", countries.clone())
        .with("_meta", json!({"author": "bravo-kernel"}));
    assert_eq!(fixture.render_json(&vars)["meta"], json!({"author": "bravo-kernel"}));

    let vars = ViewVars::new()
        .with("countries", countries)
        .with("_meta", false);
    assert!(fixture.render_json(&vars).get("meta").is_none());

    // meta-only document when the data variable holds nothing
    let vars = ViewVars::new()
        .with("countries", Value::Null)
        .with("_meta", json!({"author": "bravo-kernel"}));
    assert_eq!(
        fixture.render_json(&vars),
        json!({"meta": {"author": "bravo-kernel"}})
    );
}

#[tokio::test]
async fn test_optional_debug_pretty_print() {
    let fixture = ViewFixture::new();

    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with("_debugPrettyPrint", true);
    assert_eq!(fixture.render(&vars).unwrap().unwrap(), COUNTRY_PRETTY);

    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with("_debugPrettyPrint", false)
        .with("_jsonOptions", json!(0));
    assert_eq!(fixture.render(&vars).unwrap().unwrap(), COUNTRY_COMPACT);
}

#[tokio::test]
async fn test_production_never_pretty_prints() {
    let fixture = ViewFixture::new();
    let base = PresentationOptions {
        environment: Environment::Production,
        ..PresentationOptions::default()
    };

    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with("_debugPrettyPrint", true);
    let body = fixture.encoder.render_view_vars(&vars, &base).unwrap().unwrap();
    assert_eq!(body, COUNTRY_COMPACT);
}

#[tokio::test]
async fn test_resource_types() {
    let fixture = ViewFixture::new();
    let vars = ViewVars::new().with("countries", fixture.country("1").await);
    assert_eq!(fixture.render_json(&vars)["data"]["type"], "countries");
}

#[tokio::test]
async fn test_serialize_directive_selects_data() {
    let fixture = ViewFixture::new();
    let country = fixture.country("1").await;
    let currency = fixture.store.get("Currencies", "1", &[]).await.unwrap().unwrap();

    let vars = ViewVars::new()
        .with("countries", country.clone())
        .with("currencies", currency.clone())
        .with("_serialize", json!(["currencies", "countries"]));
    assert_eq!(fixture.render_json(&vars)["data"]["type"], "currencies");

    // several domain variables and no directive: nothing to encode
    let vars = ViewVars::new()
        .with("countries", country)
        .with("currencies", currency)
        .with("_meta", false);
    assert_eq!(fixture.render(&vars).unwrap(), None);
}

#[tokio::test]
async fn test_object_serialize_directive_is_rejected() {
    let fixture = ViewFixture::new();
    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with("_serialize", json!({"id": 1}));

    let err = fixture.render(&vars).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Assigning an object to JsonApiListener \"_serialize\" is deprecated, assign the object to its own variable and assign \"_serialize\" = true instead."
    );
}

#[tokio::test]
async fn test_api_pagination_listener() {
    let fixture = ViewFixture::new();
    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with(
            "_pagination",
            json!({
                "self": "/countries?page=2",
                "first": "/countries?page=1",
                "last": "/countries?page=3",
                "prev": "/countries?page=1",
                "next": "/countries?page=3",
                "record_count": 28,
                "page_count": 3,
                "page_limit": 10
            }),
        );

    let document = fixture.render_json(&vars);
    assert_eq!(
        document["links"],
        json!({
            "self": "/countries?page=2",
            "first": "/countries?page=1",
            "last": "/countries?page=3",
            "prev": "/countries?page=1",
            "next": "/countries?page=3"
        })
    );
    assert_eq!(
        document["meta"],
        json!({"record_count": 28, "page_count": 3, "page_limit": 10})
    );
}

#[tokio::test]
async fn test_api_query_log_listener() {
    let fixture = ViewFixture::new();
    let vars = ViewVars::new()
        .with("countries", fixture.country("1").await)
        .with("queryLog", "viewVar only set by ApiQueryLogListener");

    let document = fixture.render_json(&vars);
    assert_eq!(document["query"], "viewVar only set by ApiQueryLogListener");
    assert_eq!(document["data"]["id"], "1");
}

#[tokio::test]
async fn test_contained_associations_are_included() {
    let fixture = ViewFixture::new();
    let contain = vec!["Currency".to_string(), "Cultures".to_string()];
    let belgium = fixture.store.get("Countries", "2", &contain).await.unwrap().unwrap();

    let vars = ViewVars::new()
        .with("countries", belgium)
        .with("_contain", json!(contain))
        .with("_fieldSets", json!({"cultures": ["code"]}));
    let document = fixture.render_json(&vars);

    assert_eq!(
        document["data"]["relationships"]["cultures"],
        json!({
            "links": {"self": "/cultures?country_id=2"},
            "data": [{"type": "cultures", "id": "2"}, {"type": "cultures", "id": "3"}]
        })
    );
    let included = document["included"].as_array().unwrap();
    let types: Vec<&str> = included.iter().map(|r| r["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["currencies", "cultures", "cultures"]);
    assert_eq!(included[1]["attributes"], json!({"code": "nl-BE"}));
    assert!(included[1].get("relationships").is_none());
}

#[tokio::test]
async fn test_static_schema_is_used_verbatim() {
    let store = seed::seeded_store().unwrap();
    let registry = store.registry();
    let currencies = registry.get("Currencies").unwrap();
    let resolver = SchemaResolver::new(registry.clone())
        .with_static_schema(StaticSchema::new(&currencies, "money").attribute("code", "iso_code"));
    let encoder = JsonApiEncoder::new(Arc::new(resolver));

    let currency = store.get("Currencies", "2", &[]).await.unwrap().unwrap();
    let vars = ViewVars::new()
        .with("currencies", currency)
        .with("_jsonOptions", json!(64))
        .with("_debugPrettyPrint", false);
    let body = encoder
        .render_view_vars(&vars, &PresentationOptions::default())
        .unwrap()
        .unwrap();

    assert_eq!(
        body,
        r#"{"data":{"type":"money","id":"2","attributes":{"iso_code":"USD"},"links":{"self":"/currencies/2"}}}"#
    );
}
