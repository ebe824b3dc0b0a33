//! `SQLite` rendering of a [`CompiledQuery`].
//!
//! Every caller-supplied value, JSON paths included, is bound as a numbered
//! `?N` parameter. The only text spliced into SQL is fixed keywords, the
//! table alias and column names chosen by the storage layer, and the
//! allow-listed sort columns.
//!
//! Type handling follows `json_type`: `eq` on a number never matches a
//! string holding the same digits. Numeric comparisons see `integer` and
//! `real` values plus text that is itself a JSON number (`"15"`); any other
//! text is false. A missing key yields `NULL` so it fails every operator
//! except `exists: false`.

use serde_json::{Number, Value};

use crate::CompiledQuery;
use crate::order::{OrderTarget, Ordering};
use crate::predicate::Predicate;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlParam {
    fn from_number(n: &Number) -> Self {
        n.as_i64().map_or_else(
            || n.as_f64().map_or(Self::Null, Self::Real),
            Self::Integer,
        )
    }
}

/// Names the storage layer uses for the searched table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTable {
    /// Alias the table is given in the `FROM` clause.
    pub alias: &'static str,
    /// Column holding the JSON document.
    pub document_column: &'static str,
    /// Unique row id, used as the ordering tie-breaker.
    pub id_column: &'static str,
}

/// Rendered SQL fragments plus their parameters.
///
/// Placeholders are numbered from the `first_index` passed to [`render`],
/// in order: filter parameters, then ordering parameters, then limit and
/// offset. A count query uses only [`SqliteQuery::where_sql`] and
/// [`SqliteQuery::count_params`].
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteQuery {
    /// Boolean expression; `1` when there are no filters.
    pub where_sql: String,
    pub where_params: Vec<SqlParam>,
    /// `ORDER BY` body (without the keyword).
    pub order_sql: String,
    pub order_params: Vec<SqlParam>,
    /// `LIMIT ?a OFFSET ?b`.
    pub page_sql: String,
    pub page_params: Vec<SqlParam>,
}

impl SqliteQuery {
    /// Parameters for a count over the `WHERE` clause.
    #[must_use]
    pub fn count_params(&self) -> Vec<SqlParam> {
        self.where_params.clone()
    }

    /// Parameters for the page fetch: filters, ordering, limit, offset.
    #[must_use]
    pub fn fetch_params(&self) -> Vec<SqlParam> {
        let mut params = self.where_params.clone();
        params.extend(self.order_params.iter().cloned());
        params.extend(self.page_params.iter().cloned());
        params
    }
}

/// Hands out placeholder numbers while collecting the values.
struct Binder {
    next: usize,
    params: Vec<SqlParam>,
}

impl Binder {
    const fn new(first_index: usize) -> Self {
        Self {
            next: first_index,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, param: SqlParam) -> String {
        let placeholder = format!("?{}", self.next);
        self.next += 1;
        self.params.push(param);
        placeholder
    }

    fn take(&mut self) -> Vec<SqlParam> {
        std::mem::take(&mut self.params)
    }
}

/// Render `query` against `table`, numbering placeholders from
/// `first_index` (the caller owns `?1 .. ?first_index-1`).
#[must_use]
pub fn render(query: &CompiledQuery, table: DocumentTable, first_index: usize) -> SqliteQuery {
    let doc = format!("{}.{}", table.alias, table.document_column);
    let mut binder = Binder::new(first_index);

    let where_sql = if query.filters.is_empty() {
        "1".to_string()
    } else {
        query
            .filters
            .iter()
            .map(|p| predicate_sql(p, &doc, &mut binder))
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    let where_params = binder.take();

    let order_sql = order_sql(&query.order, table, &doc, &mut binder);
    let order_params = binder.take();

    let limit = binder.bind(SqlParam::Integer(i64::from(query.page.limit)));
    let offset = binder.bind(SqlParam::Integer(
        i64::try_from(query.page.offset).unwrap_or(i64::MAX),
    ));
    let page_params = binder.take();

    SqliteQuery {
        where_sql,
        where_params,
        order_sql,
        order_params,
        page_sql: format!("LIMIT {limit} OFFSET {offset}"),
        page_params,
    }
}

fn predicate_sql(predicate: &Predicate, doc: &str, binder: &mut Binder) -> String {
    let path = binder.bind(SqlParam::Text(predicate.path().json_path()));
    let t = format!("json_type({doc}, {path})");
    let v = format!("json_extract({doc}, {path})");

    match predicate {
        Predicate::Equals { value, .. } => equals_sql(&t, &v, value, binder),
        Predicate::NotEquals { value, .. } => {
            format!("({t} IS NOT NULL AND NOT {})", equals_sql(&t, &v, value, binder))
        }
        Predicate::Compare { op, value, .. } => {
            let p = binder.bind(SqlParam::from_number(value));
            compare_sql(&t, &v, op.as_sql(), &p)
        }
        Predicate::Contains { needle, .. } => contains_sql(&t, &v, doc, &path, needle, binder),
        Predicate::Exists { present: true, .. } => format!("{t} IS NOT NULL"),
        Predicate::Exists { present: false, .. } => format!("{t} IS NULL"),
        Predicate::In { values, .. } => {
            if values.is_empty() {
                return "0".to_string();
            }
            let alternatives: Vec<String> = values
                .iter()
                .map(|value| equals_sql(&t, &v, value, binder))
                .collect();
            format!("({})", alternatives.join(" OR "))
        }
    }
}

/// Numeric comparison. Text is cast only when it parses as a JSON number;
/// the inner `CASE` keeps `json_type` off malformed input.
fn compare_sql(t: &str, v: &str, op: &str, p: &str) -> String {
    format!(
        "(CASE WHEN {t} IN ('integer', 'real') THEN {v} {op} {p} \
         WHEN {t} = 'text' AND (CASE WHEN json_valid({v}) THEN json_type({v}) END) IN ('integer', 'real') \
         THEN CAST({v} AS REAL) {op} {p} ELSE 0 END)"
    )
}

/// Type-sensitive equality of the JSON value described by `t` (its
/// `json_type`) and `v` (its SQL value) against `value`.
fn equals_sql(t: &str, v: &str, value: &Value, binder: &mut Binder) -> String {
    match value {
        Value::Null => format!("{t} = 'null'"),
        Value::Bool(true) => format!("{t} = 'true'"),
        Value::Bool(false) => format!("{t} = 'false'"),
        Value::Number(n) => {
            let p = binder.bind(SqlParam::from_number(n));
            format!("({t} IN ('integer', 'real') AND {v} = {p})")
        }
        Value::String(s) => {
            let p = binder.bind(SqlParam::Text(s.clone()));
            format!("({t} = 'text' AND {v} = {p})")
        }
        Value::Array(_) | Value::Object(_) => {
            let kind = if value.is_array() { "array" } else { "object" };
            let p = binder.bind(SqlParam::Text(value.to_string()));
            format!("({t} = '{kind}' AND {v} = json({p}))")
        }
    }
}

fn contains_sql(
    t: &str,
    v: &str,
    doc: &str,
    path: &str,
    needle: &Value,
    binder: &mut Binder,
) -> String {
    let member = equals_sql("je.type", "je.value", needle, binder);
    let pattern = binder.bind(SqlParam::Text(like_pattern(needle)));
    format!(
        "(CASE WHEN {t} = 'array' \
         THEN EXISTS (SELECT 1 FROM json_each({doc}, {path}) AS je WHERE {member}) \
         ELSE lower(CASE {t} WHEN 'true' THEN 'true' WHEN 'false' THEN 'false' \
         ELSE CAST({v} AS TEXT) END) LIKE lower({pattern}) ESCAPE '\\' END)"
    )
}

/// `%needle%` with LIKE metacharacters escaped. Non-string needles match
/// their JSON text.
fn like_pattern(needle: &Value) -> String {
    let text = match needle {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn order_sql(order: &Ordering, table: DocumentTable, doc: &str, binder: &mut Binder) -> String {
    let dir = order.direction.as_sql();
    let primary = match &order.target {
        OrderTarget::Column(column) => format!("{}.{} {dir}", table.alias, column.as_str()),
        OrderTarget::Path(path) => {
            let p = binder.bind(SqlParam::Text(path.json_path()));
            format!("CAST(json_extract({doc}, {p}) AS TEXT) {dir}")
        }
    };
    format!("{primary}, {}.{} {dir}", table.alias, table.id_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::page::PageLimits;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessera_core::enums::{FilterOperator, SortDirection};
    use tessera_core::requests::{Filter, SearchEntities};

    const TABLE: DocumentTable = DocumentTable {
        alias: "e",
        document_column: "data",
        id_column: "id",
    };

    fn render_search(search: &SearchEntities) -> SqliteQuery {
        let compiled = compile(search, &PageLimits::default()).unwrap();
        render(&compiled, TABLE, 3)
    }

    #[test]
    fn no_filters_renders_true_and_default_order() {
        let q = render_search(&SearchEntities::new("service"));
        assert_eq!(q.where_sql, "1");
        assert!(q.where_params.is_empty());
        assert_eq!(q.order_sql, "e.created_at DESC, e.id DESC");
        assert_eq!(q.page_sql, "LIMIT ?3 OFFSET ?4");
        assert_eq!(
            q.fetch_params(),
            vec![SqlParam::Integer(50), SqlParam::Integer(0)]
        );
    }

    #[test]
    fn equality_binds_path_and_value() {
        let q = render_search(
            &SearchEntities::new("service").filter(Filter::new("spec.tier", FilterOperator::Eq, json!(5))),
        );
        assert_eq!(
            q.where_sql,
            "(json_type(e.data, ?3) IN ('integer', 'real') AND json_extract(e.data, ?3) = ?4)"
        );
        assert_eq!(
            q.where_params,
            vec![
                SqlParam::Text("$.\"spec\".\"tier\"".into()),
                SqlParam::Integer(5)
            ]
        );
    }

    #[test]
    fn string_equality_is_type_sensitive() {
        let q = render_search(
            &SearchEntities::new("service").filter(Filter::new("v", FilterOperator::Eq, json!("5"))),
        );
        assert!(q.where_sql.contains("= 'text'"));
        assert_eq!(q.where_params[1], SqlParam::Text("5".into()));
    }

    #[test]
    fn filters_are_conjoined_and_numbered_in_order() {
        let q = render_search(
            &SearchEntities::new("service")
                .filter(Filter::new("v", FilterOperator::Gte, json!(10)))
                .filter(Filter::new("owner", FilterOperator::Exists, json!(true)))
                .order("name", SortDirection::Asc)
                .page(10, 20),
        );
        assert_eq!(
            q.where_sql,
            "(CASE WHEN json_type(e.data, ?3) IN ('integer', 'real') \
             THEN json_extract(e.data, ?3) >= ?4 \
             WHEN json_type(e.data, ?3) = 'text' \
             AND (CASE WHEN json_valid(json_extract(e.data, ?3)) THEN json_type(json_extract(e.data, ?3)) END) \
             IN ('integer', 'real') \
             THEN CAST(json_extract(e.data, ?3) AS REAL) >= ?4 ELSE 0 END) \
             AND json_type(e.data, ?5) IS NOT NULL"
        );
        assert_eq!(
            q.order_sql,
            "CAST(json_extract(e.data, ?6) AS TEXT) ASC, e.id ASC"
        );
        assert_eq!(q.page_sql, "LIMIT ?7 OFFSET ?8");
        assert_eq!(q.count_params().len(), 3);
        assert_eq!(
            q.fetch_params(),
            vec![
                SqlParam::Text("$.\"v\"".into()),
                SqlParam::Integer(10),
                SqlParam::Text("$.\"owner\"".into()),
                SqlParam::Text("$.\"name\"".into()),
                SqlParam::Integer(10),
                SqlParam::Integer(20),
            ]
        );
    }

    #[test]
    fn empty_in_matches_nothing() {
        let q = render_search(
            &SearchEntities::new("service").filter(Filter::new("env", FilterOperator::In, json!([]))),
        );
        assert_eq!(q.where_sql, "0");
    }

    #[test]
    fn in_expands_to_alternatives() {
        let q = render_search(
            &SearchEntities::new("service")
                .filter(Filter::new("env", FilterOperator::In, json!(["prod", null]))),
        );
        assert_eq!(
            q.where_sql,
            "((json_type(e.data, ?3) = 'text' AND json_extract(e.data, ?3) = ?4) \
             OR json_type(e.data, ?3) = 'null')"
        );
    }

    #[test]
    fn contains_escapes_like_metacharacters() {
        assert_eq!(like_pattern(&json!("50%_off\\")), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern(&json!(42)), "%42%");

        let q = render_search(
            &SearchEntities::new("service")
                .filter(Filter::new("tags", FilterOperator::Contains, json!("Prod"))),
        );
        assert!(q.where_sql.contains("json_each(e.data, ?3) AS je"));
        assert!(q.where_sql.contains("LIKE lower(?5) ESCAPE"));
        assert_eq!(q.where_params[2], SqlParam::Text("%Prod%".into()));
    }

    #[test]
    fn hostile_values_never_reach_sql_text() {
        let hostile = "x' OR '1'='1";
        let q = render_search(
            &SearchEntities::new("service")
                .filter(Filter::new("name", FilterOperator::Eq, json!(hostile)))
                .filter(Filter::new("name", FilterOperator::Contains, json!(hostile))),
        );
        assert!(!q.where_sql.contains(hostile));
        assert!(!q.where_sql.contains("'1'"));
    }

    #[test]
    fn float_values_bind_as_real() {
        assert_eq!(SqlParam::from_number(&Number::from(7)), SqlParam::Integer(7));
        let n = Number::from_f64(2.5).unwrap();
        assert_eq!(SqlParam::from_number(&n), SqlParam::Real(2.5));
    }
}
