//! Wire JSON through parsing, compilation and `SQLite` rendering.

use pretty_assertions::assert_eq;
use serde_json::json;

use tessera_core::requests::SearchEntities;
use tessera_query::sqlite::{self, DocumentTable, SqlParam};
use tessera_query::{PageLimits, QueryError, compile, parse_filters};

const TABLE: DocumentTable = DocumentTable {
    alias: "e",
    document_column: "data",
    id_column: "id",
};

#[test]
fn wire_request_to_sql() {
    let filters = parse_filters(&json!([
        {"property": "spec.tier", "operator": "lte", "value": "2"},
        {"property": "tags", "operator": "contains", "value": "pci"}
    ]))
    .unwrap();
    let search = SearchEntities {
        blueprint_id: "service".into(),
        filters,
        order_by: Some("updated_at".into()),
        order_dir: None,
        limit: Some(25),
        offset: Some(50),
    };

    let compiled = compile(&search, &PageLimits::default()).unwrap();
    let query = sqlite::render(&compiled, TABLE, 3);

    assert_eq!(query.order_sql, "e.updated_at DESC, e.id DESC");
    assert_eq!(query.page_sql, "LIMIT ?8 OFFSET ?9");
    assert_eq!(
        query.where_params,
        vec![
            SqlParam::Text("$.\"spec\".\"tier\"".into()),
            SqlParam::Integer(2),
            SqlParam::Text("$.\"tags\"".into()),
            SqlParam::Text("pci".into()),
            SqlParam::Text("%pci%".into()),
        ]
    );
    assert_eq!(
        query.fetch_params()[5..],
        [SqlParam::Integer(25), SqlParam::Integer(50)]
    );
}

#[test]
fn search_entities_deserializes_from_wire_json() {
    let search: SearchEntities = serde_json::from_value(json!({
        "blueprint_id": "service",
        "filters": [{"property": "name", "operator": "in", "value": ["a", "b"]}],
        "order_dir": "ASC",
        "limit": 500,
        "offset": -3
    }))
    .unwrap();

    let compiled = compile(&search, &PageLimits::default()).unwrap();
    assert_eq!(compiled.page.limit, 50);
    assert_eq!(compiled.page.offset, 0);
}

#[test]
fn unknown_operator_in_wire_json() {
    let err = parse_filters(&json!([{"property": "a", "operator": "regex", "value": ".*"}]))
        .unwrap_err();
    assert_eq!(err, QueryError::UnknownOperator("regex".into()));
}
