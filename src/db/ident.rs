use thiserror::Error;

use crate::constants::MAX_IDENTIFIER_BYTES;

/// Reasons a schema or table name is refused before it reaches SQL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier must not be empty")]
    Empty,

    #[error("identifier {0:?} contains a NUL byte")]
    NulByte(String),

    #[error("identifier {name:?} is {len} bytes, the limit is {max}")]
    TooLong { name: String, len: usize, max: usize },
}

/// Check that a name can be used verbatim as a PostgreSQL identifier
///
/// Names longer than the limit would be truncated silently by the server,
/// which breaks every later lookup by the original name.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if name.contains('\0') {
        return Err(IdentifierError::NulByte(name.to_string()));
    }

    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(IdentifierError::TooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_IDENTIFIER_BYTES,
        });
    }

    Ok(())
}

/// Quote a single identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a `schema.table` pair
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}
