pub mod campaign;
pub mod persona;

use std::str::FromStr;

use adpilot_core::error::CoreError;

/// Parse an enum-valued TEXT column, treating unknown values as corruption.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, CoreError>
where
    T: FromStr<Err = CoreError>,
{
    value
        .parse()
        .map_err(|_| CoreError::Internal(format!("unexpected value '{value}' in column {column}")))
}
