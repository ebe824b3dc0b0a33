//! Generated JSON Schemas for the wire shapes accept what serde produces and
//! reject what serde would refuse.

use chrono::Utc;
use pretty_assertions::assert_eq;
use schemars::schema_for;
use serde_json::json;
use tessera_core::entities::Entity;
use tessera_core::requests::{Filter, SearchEntities};
use tessera_core::responses::SearchPage;

fn errors_for(schema: &serde_json::Value, instance: &serde_json::Value) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should compile");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

#[test]
fn search_page_instance_matches_its_schema() {
    let now = Utc::now();
    let page = SearchPage {
        items: vec![Entity {
            id: "ent-0011223344556677".into(),
            tenant_id: "t1".into(),
            blueprint_id: "service".into(),
            identifier: "checkout".into(),
            title: Some("Checkout".into()),
            data: json!({"tier": 1, "tags": ["pci"]}),
            created_at: now,
            updated_at: now,
        }],
        total: 7,
        limit: 50,
        offset: 0,
    };

    let schema = serde_json::to_value(schema_for!(SearchPage)).unwrap();
    let instance = serde_json::to_value(&page).unwrap();
    assert_eq!(errors_for(&schema, &instance), Vec::<String>::new());
}

#[test]
fn filter_schema_rejects_unknown_operator() {
    let schema = serde_json::to_value(schema_for!(Filter)).unwrap();

    let good = json!({"property": "tier", "operator": "gte", "value": 2});
    assert!(errors_for(&schema, &good).is_empty());

    let bad = json!({"property": "tier", "operator": "between", "value": [1, 2]});
    assert!(!errors_for(&schema, &bad).is_empty());
    assert!(serde_json::from_value::<Filter>(bad).is_err());
}

#[test]
fn search_request_schema_accepts_minimal_request() {
    let schema = serde_json::to_value(schema_for!(SearchEntities)).unwrap();
    let minimal = json!({"blueprint_id": "service"});
    assert!(errors_for(&schema, &minimal).is_empty());

    let parsed: SearchEntities = serde_json::from_value(minimal).unwrap();
    assert!(parsed.filters.is_empty());
    assert_eq!(parsed.limit, None);
}
