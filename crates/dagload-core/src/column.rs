//! Column headers and identifier conventions
//!
//! Headers follow the record store's import notation: `country_id/id`
//! references a country by external identifier, `country_id/.id` by
//! internal database identifier, and a bare `country_id` by display name.
//! The dataset's own identifier lives in a column headed `id` or `.id`.

use dagload_common::{LoadError, Result};
use serde::{Deserialize, Serialize};

/// Identifier convention carried by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subfield {
    /// Business identifier (`id`)
    External,
    /// Database identifier (`.id`)
    Internal,
}

impl Subfield {
    /// The header suffix (or index header) for this convention
    pub fn as_str(&self) -> &'static str {
        match self {
            Subfield::External => "id",
            Subfield::Internal => ".id",
        }
    }
}

impl std::fmt::Display for Subfield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header exactly as it appeared in the input; sent to the store as-is
    pub header: String,
    /// Field name with the identifier suffix stripped
    pub name: String,
    pub subfield: Option<Subfield>,
    /// Referenced model, set by metadata enrichment for relational fields
    pub references: Option<String>,
}

impl Column {
    pub fn is_relational(&self) -> bool {
        self.references.is_some()
    }
}

/// Identifier convention of an index header, if it is one
pub fn index_convention(header: &str) -> Option<Subfield> {
    match header {
        "id" => Some(Subfield::External),
        ".id" => Some(Subfield::Internal),
        _ => None,
    }
}

/// Split a header into field name and identifier convention
///
/// Only a single trailing `/id` or `/.id` is understood. Anything else after
/// a slash is nested-record notation, which cannot be ordered without first
/// creating the referenced records, and is rejected.
pub fn parse_header(model: &str, header: &str) -> Result<Column> {
    let unsupported = || LoadError::UnsupportedSubfield {
        model: model.to_string(),
        column: header.to_string(),
    };

    let (name, subfield) = match header.rsplit_once('/') {
        None => (header, index_convention(header)),
        Some((name, "id")) => (name, Some(Subfield::External)),
        Some((name, ".id")) => (name, Some(Subfield::Internal)),
        Some(_) => return Err(unsupported()),
    };

    if name.is_empty() || name.contains('/') {
        return Err(unsupported());
    }

    Ok(Column {
        header: header.to_string(),
        name: name.to_string(),
        subfield,
        references: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_header() {
        let col = parse_header("res.partner", "name").unwrap();
        assert_eq!(col.name, "name");
        assert_eq!(col.subfield, None);
        assert!(!col.is_relational());
    }

    #[test]
    fn test_identifier_suffixes_are_stripped() {
        let col = parse_header("res.partner", "country_id/id").unwrap();
        assert_eq!(col.name, "country_id");
        assert_eq!(col.header, "country_id/id");
        assert_eq!(col.subfield, Some(Subfield::External));

        let col = parse_header("res.partner", "parent_id/.id").unwrap();
        assert_eq!(col.name, "parent_id");
        assert_eq!(col.subfield, Some(Subfield::Internal));
    }

    #[test]
    fn test_index_headers() {
        assert_eq!(parse_header("m", "id").unwrap().subfield, Some(Subfield::External));
        assert_eq!(parse_header("m", ".id").unwrap().subfield, Some(Subfield::Internal));
        assert_eq!(index_convention("name"), None);
    }

    #[test]
    fn test_nested_notation_is_rejected() {
        for header in ["child_ids/name", "child_ids/country_id/id", "/id", "a/b/.id"] {
            let err = parse_header("res.partner", header).unwrap_err();
            assert!(
                matches!(err, LoadError::UnsupportedSubfield { ref column, .. } if column == header),
                "{header} should be rejected, got {err:?}"
            );
        }
    }
}
