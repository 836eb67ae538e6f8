//! Data marshalling for the Insight utility toolkit
//!
//! Values move between types through one canonical exchange format (JSON).
//! On top of that sit a converter for re-typing values, a static alias
//! schema for naming fields externally, and a mapper between record lists
//! and tables.

pub mod alias;
pub mod codec;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod table;
pub mod text;

pub use alias::{ColumnType, Field, resolve_name, validate_schema};
pub use codec::{deserialize, serialize, serialize_pretty};
pub use convert::{clone_value, convert_to};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use table::{Cell, Column, Record, Table, TableRow, from_table, to_table};
pub use text::{eq_ignore_case, from_base64, to_base64};
