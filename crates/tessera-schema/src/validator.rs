//! Document validation against runtime-supplied blueprint schemas.
//!
//! Two modes:
//! - [`ValidationMode::Full`] enforces the schema as written (used on create).
//! - [`ValidationMode::Partial`] validates against a deep copy of the schema
//!   with every presence constraint removed at every nesting level (used on
//!   merge-updates).
//!
//! Every violated constraint is reported, not just the first. There is no
//! type coercion: `"5"` never satisfies `{"type": "number"}`.

use jsonschema::error::ValidationErrorKind;
use serde_json::{Map, Value};
use tessera_core::validation::{FieldError, ROOT_PATH};

use crate::error::SchemaError;

/// Which constraints a validation pass enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Every constraint, including `required` at every level.
    #[default]
    Full,
    /// Presence constraints (`required`, `dependentRequired`, array-valued
    /// `dependencies`) suppressed recursively.
    Partial,
}

/// Validates documents against schema documents.
pub trait DocumentValidator: Send + Sync {
    /// Validate `document` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` with one `FieldError` per
    /// violated constraint, or `SchemaError::InvalidSchema` if `schema`
    /// cannot be compiled.
    fn validate(
        &self,
        document: &Value,
        schema: &Value,
        mode: ValidationMode,
    ) -> Result<(), SchemaError>;

    /// Check that `schema` is a usable schema document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` describing the problem.
    fn check_schema(&self, schema: &Value) -> Result<(), SchemaError>;
}

/// [`DocumentValidator`] backed by the `jsonschema` crate.
///
/// Holds no state; each call compiles the schema it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentValidator for JsonSchemaValidator {
    fn validate(
        &self,
        document: &Value,
        schema: &Value,
        mode: ValidationMode,
    ) -> Result<(), SchemaError> {
        if is_unconstrained(schema) {
            return Ok(());
        }

        let stripped;
        let effective = match mode {
            ValidationMode::Full => schema,
            ValidationMode::Partial => {
                stripped = strip_required(schema);
                &stripped
            }
        };

        let validator = compile(effective)?;
        let errors = field_errors(&validator, document);
        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                ?mode,
                violations = errors.len(),
                "document rejected by schema"
            );
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    fn check_schema(&self, schema: &Value) -> Result<(), SchemaError> {
        if is_unconstrained(schema) {
            return Ok(());
        }
        compile(schema).map(|_| ())
    }
}

/// An absent or empty schema accepts every document.
fn is_unconstrained(schema: &Value) -> bool {
    match schema {
        Value::Null | Value::Bool(true) => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn compile(schema: &Value) -> Result<jsonschema::Validator, SchemaError> {
    if !matches!(schema, Value::Object(_) | Value::Bool(_)) {
        return Err(SchemaError::InvalidSchema(format!(
            "schema must be an object or boolean, got {}",
            type_name(schema)
        )));
    }
    jsonschema::validator_for(schema).map_err(|e| SchemaError::InvalidSchema(e.to_string()))
}

/// Collect every violation as a [`FieldError`].
pub(crate) fn field_errors(validator: &jsonschema::Validator, document: &Value) -> Vec<FieldError> {
    validator
        .iter_errors(document)
        .map(|error| {
            let mut path = field_path(document, &error.instance_path.to_string());
            if let ValidationErrorKind::Required { property } = &error.kind {
                if let Some(name) = property.as_str() {
                    path = join_path(&path, name);
                }
            }
            FieldError::new(path, error.to_string())
        })
        .collect()
}

/// Render a JSON pointer as a dot/array path, walking `document` so array
/// indices become `[i]` and numeric object keys stay keys.
fn field_path(document: &Value, pointer: &str) -> String {
    let mut path = String::new();
    let mut node = Some(document);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match node {
            Some(Value::Array(items)) => {
                path.push('[');
                path.push_str(&segment);
                path.push(']');
                node = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            other => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&segment);
                node = other.and_then(|v| v.get(segment.as_str()));
            }
        }
    }

    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent == ROOT_PATH {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Presence-constraint stripping
// ---------------------------------------------------------------------------

/// Keywords whose value is a map of name -> subschema.
const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Keywords whose value is a subschema or an array of subschemas.
///
/// `not` and `if` are absent: stripping inside them would tighten the
/// schema, so they are kept as written.
const SUBSCHEMA_KEYWORDS: [&str; 13] = [
    "additionalProperties",
    "unevaluatedProperties",
    "propertyNames",
    "items",
    "additionalItems",
    "unevaluatedItems",
    "prefixItems",
    "contains",
    "then",
    "else",
    "allOf",
    "anyOf",
    "oneOf",
];

/// Deep copy of `schema` with every presence constraint removed.
///
/// Recurses through nested `properties`, array `items`, and the
/// `allOf`/`anyOf`/`oneOf` combinators, among others. Only keyword positions
/// are touched: a property that happens to be *named* `required` survives.
/// Negated (`not`) and conditional (`if`) subschemas are left intact.
#[must_use]
pub fn strip_required(schema: &Value) -> Value {
    let mut copy = schema.clone();
    strip_node(&mut copy);
    copy
}

fn strip_node(node: &mut Value) {
    match node {
        Value::Object(map) => strip_schema_object(map),
        Value::Array(items) => items.iter_mut().for_each(strip_node),
        _ => {}
    }
}

fn strip_schema_object(map: &mut Map<String, Value>) {
    map.remove("required");
    map.remove("dependentRequired");

    // Draft-7 `dependencies`: array values are presence rules, object
    // values are subschemas.
    if let Some(Value::Object(deps)) = map.get_mut("dependencies") {
        deps.retain(|_, dep| !dep.is_array());
        deps.values_mut().for_each(strip_node);
    }

    for keyword in SCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(children)) = map.get_mut(keyword) {
            children.values_mut().for_each(strip_node);
        }
    }

    for keyword in SUBSCHEMA_KEYWORDS {
        if let Some(child) = map.get_mut(keyword) {
            strip_node(child);
        }
    }
}
