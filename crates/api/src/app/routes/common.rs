use std::str::FromStr;

use stayhub_core::DomainError;

use crate::app::errors::ApiError;

/// Parse a path id; anything malformed is a 400 "Invalid ID format".
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}
