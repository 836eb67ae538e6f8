//! Static field schemas and alias resolution
//!
//! Record types describe their fields once, as a `&'static [Field]`, instead
//! of being inspected at runtime. Each field may carry an alias, which is the
//! name it is known by outside the type (table columns, wire keys).
//!
//! ```
//! use insight_data::{ColumnType, Field};
//!
//! const FIELDS: &[Field] = &[
//!     Field::new("a", ColumnType::Integer),
//!     Field::new("b", ColumnType::Integer).alias("B"),
//! ];
//!
//! assert_eq!(FIELDS[0].resolve_name(), "a");
//! assert_eq!(FIELDS[1].resolve_name(), "B");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Declared value type of a field, and of the table column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key of the field in the type's serialized form
    pub name: &'static str,
    /// External name, if it differs from `name`
    pub alias: Option<&'static str>,
    /// Declared value type
    pub kind: ColumnType,
    /// Whether table import may assign this field
    pub writable: bool,
    /// Whether the field accepts a null value
    pub nullable: bool,
}

impl Field {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            alias: None,
            kind,
            writable: true,
            nullable: false,
        }
    }

    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Exclude the field from assignment when importing a table.
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The declared alias, or the field's own name when none is declared.
    ///
    /// An empty alias counts as undeclared.
    pub fn resolve_name(&self) -> &'static str {
        match self.alias {
            Some(alias) if !alias.is_empty() => alias,
            _ => self.name,
        }
    }
}

/// Resolve the external name of the field called `name` in `schema`.
pub fn resolve_name(schema: &[Field], name: &str) -> Option<&'static str> {
    schema
        .iter()
        .find(|field| field.name == name)
        .map(Field::resolve_name)
}

/// Check that every field resolves to exactly one distinct, non-empty name.
pub fn validate_schema(schema: &[Field]) -> Result<()> {
    let mut seen = HashSet::with_capacity(schema.len());
    for field in schema {
        if field.name.is_empty() {
            return Err(Error::Schema {
                message: "field name cannot be empty".into(),
            });
        }
        let resolved = field.resolve_name();
        if !seen.insert(resolved) {
            return Err(Error::Schema {
                message: format!(
                    "field '{}' resolves to column '{}', which is already taken",
                    field.name, resolved
                ),
            });
        }
    }
    Ok(())
}
