//! Validated document paths.
//!
//! `PropertyPath` is the only way a caller-supplied path reaches SQL. Its
//! constructor enforces the token grammar, so every path that exists is made
//! of `[A-Za-z0-9_]+` segments joined by `.`.

use std::fmt;

use crate::error::QueryError;

/// Longest accepted path, in bytes.
pub const MAX_PATH_LEN: usize = 256;

/// Deepest accepted path, in segments.
pub const MAX_PATH_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dot-separated path.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidProperty` if the path is empty, too long,
    /// too deep, has an empty segment, or a segment with a character outside
    /// `[A-Za-z0-9_]`.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let invalid = |reason: String| QueryError::InvalidProperty {
            path: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("path is empty".into()));
        }
        if raw.len() > MAX_PATH_LEN {
            return Err(invalid(format!("longer than {MAX_PATH_LEN} bytes")));
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty path segment".into()));
            }
            if !segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                return Err(invalid(format!(
                    "segment '{segment}' may only contain A-Z, a-z, 0-9 and _"
                )));
            }
            segments.push(segment.to_string());
        }
        if segments.len() > MAX_PATH_DEPTH {
            return Err(invalid(format!("deeper than {MAX_PATH_DEPTH} segments")));
        }

        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `SQLite` JSON path with every segment as a quoted object label:
    /// `a.b` -> `$."a"."b"`.
    #[must_use]
    pub fn json_path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.segments {
            out.push_str(".\"");
            out.push_str(segment);
            out.push('"');
        }
        out
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
