//! Filter parsing and compilation into [`Predicate`]s.

use std::str::FromStr;

use serde_json::{Number, Value};
use tessera_core::enums::FilterOperator;
use tessera_core::requests::Filter;

use crate::error::QueryError;
use crate::path::PropertyPath;
use crate::predicate::{Comparison, Predicate};

/// Parse raw wire JSON (an array of `{property, operator, value}`) into
/// filters.
///
/// Paths are not checked here; [`compile_filter`] does that.
///
/// # Errors
///
/// Returns `QueryError::Malformed` for shape problems and
/// `QueryError::UnknownOperator` for an operator outside the supported set.
pub fn parse_filters(raw: &Value) -> Result<Vec<Filter>, QueryError> {
    let items = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(QueryError::Malformed {
                index: 0,
                reason: "filters must be an array".into(),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_one(index, item))
        .collect()
}

fn parse_one(index: usize, item: &Value) -> Result<Filter, QueryError> {
    let malformed = |reason: &str| QueryError::Malformed {
        index,
        reason: reason.to_string(),
    };

    let obj = item
        .as_object()
        .ok_or_else(|| malformed("filter must be an object"))?;
    let property = obj
        .get("property")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("'property' must be a string"))?;
    let operator = obj
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("'operator' must be a string"))?;
    let operator = FilterOperator::from_str(operator)
        .map_err(|_| QueryError::UnknownOperator(operator.to_string()))?;

    Ok(Filter {
        property: property.to_string(),
        operator,
        value: obj.get("value").cloned().unwrap_or(Value::Null),
    })
}

/// Compile one filter. The property path is validated before anything else.
///
/// # Errors
///
/// Returns `QueryError::InvalidProperty` for a path outside the grammar and
/// `QueryError::InvalidValue` when the value does not fit the operator.
pub fn compile_filter(filter: &Filter) -> Result<Predicate, QueryError> {
    let path = PropertyPath::parse(&filter.property)?;
    let value = &filter.value;

    let predicate = match filter.operator {
        FilterOperator::Eq => Predicate::Equals {
            path,
            value: value.clone(),
        },
        FilterOperator::Neq => Predicate::NotEquals {
            path,
            value: value.clone(),
        },
        FilterOperator::Gt => numeric(filter, path, Comparison::Gt)?,
        FilterOperator::Gte => numeric(filter, path, Comparison::Gte)?,
        FilterOperator::Lt => numeric(filter, path, Comparison::Lt)?,
        FilterOperator::Lte => numeric(filter, path, Comparison::Lte)?,
        FilterOperator::Contains => Predicate::Contains {
            path,
            needle: value.clone(),
        },
        FilterOperator::Exists => match value {
            Value::Bool(present) => Predicate::Exists {
                path,
                present: *present,
            },
            _ => return Err(invalid_value(filter, "expected a boolean")),
        },
        FilterOperator::In => match value {
            Value::Array(values) => Predicate::In {
                path,
                values: values.clone(),
            },
            _ => return Err(invalid_value(filter, "expected an array")),
        },
    };
    Ok(predicate)
}

fn numeric(filter: &Filter, path: PropertyPath, op: Comparison) -> Result<Predicate, QueryError> {
    let value = match &filter.value {
        Value::Number(n) => n.clone(),
        Value::String(s) => parse_number(s.trim())
            .ok_or_else(|| invalid_value(filter, "expected a number"))?,
        _ => return Err(invalid_value(filter, "expected a number")),
    };
    Ok(Predicate::Compare { path, op, value })
}

/// Numeric-looking strings are accepted as comparison operands.
fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn invalid_value(filter: &Filter, reason: &str) -> QueryError {
    QueryError::InvalidValue {
        property: filter.property.clone(),
        operator: filter.operator.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn filter(property: &str, operator: FilterOperator, value: Value) -> Filter {
        Filter::new(property, operator, value)
    }

    #[test]
    fn parse_filters_from_wire_json() {
        let raw = json!([
            {"property": "tier", "operator": "gte", "value": 2},
            {"property": "owner", "operator": "exists", "value": true},
            {"property": "deprecated", "operator": "eq"}
        ]);
        let filters = parse_filters(&raw).unwrap();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].operator, FilterOperator::Gte);
        assert_eq!(filters[2].value, Value::Null);
        assert!(parse_filters(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn parse_filters_rejects_unknown_operator() {
        let raw = json!([{"property": "tier", "operator": "between", "value": [1, 2]}]);
        assert_eq!(
            parse_filters(&raw).unwrap_err(),
            QueryError::UnknownOperator("between".into())
        );
    }

    #[test]
    fn parse_filters_rejects_bad_shapes() {
        assert!(matches!(
            parse_filters(&json!({"property": "a"})),
            Err(QueryError::Malformed { index: 0, .. })
        ));
        assert!(matches!(
            parse_filters(&json!([{"property": "a", "operator": "eq"}, "nope"])),
            Err(QueryError::Malformed { index: 1, .. })
        ));
        assert!(matches!(
            parse_filters(&json!([{"property": 5, "operator": "eq"}])),
            Err(QueryError::Malformed { index: 0, .. })
        ));
    }

    #[test]
    fn injection_paths_rejected_before_compiling() {
        for property in ["a; DROP TABLE x", "a..b", "a') OR 1=1 --"] {
            let err = compile_filter(&filter(property, FilterOperator::Eq, json!(1))).unwrap_err();
            assert!(matches!(err, QueryError::InvalidProperty { .. }), "{property}");
        }
    }

    #[test]
    fn numeric_operators_accept_numbers_and_numeric_strings() {
        let pred = compile_filter(&filter("v", FilterOperator::Gte, json!(10))).unwrap();
        assert_eq!(
            pred,
            Predicate::Compare {
                path: PropertyPath::parse("v").unwrap(),
                op: Comparison::Gte,
                value: Number::from(10),
            }
        );

        let pred = compile_filter(&filter("v", FilterOperator::Lt, json!(" 2.5 "))).unwrap();
        assert!(matches!(pred, Predicate::Compare { ref value, .. } if value.as_f64() == Some(2.5)));
    }

    #[test]
    fn numeric_operators_reject_non_numbers() {
        for value in [json!("ten"), json!(true), json!(null), json!([1])] {
            let err = compile_filter(&filter("v", FilterOperator::Gt, value)).unwrap_err();
            assert!(matches!(err, QueryError::InvalidValue { .. }));
        }
    }

    #[test]
    fn exists_requires_boolean() {
        let pred = compile_filter(&filter("a.b", FilterOperator::Exists, json!(false))).unwrap();
        assert!(matches!(pred, Predicate::Exists { present: false, .. }));

        let err = compile_filter(&filter("a.b", FilterOperator::Exists, json!("yes"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'a.b' exists: expected a boolean"
        );
    }

    #[test]
    fn in_requires_array() {
        let pred = compile_filter(&filter("env", FilterOperator::In, json!(["prod", 1]))).unwrap();
        assert!(matches!(pred, Predicate::In { ref values, .. } if values.len() == 2));

        let err = compile_filter(&filter("env", FilterOperator::In, json!("prod"))).unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }
}
