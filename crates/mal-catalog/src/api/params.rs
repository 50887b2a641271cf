//! Request parameter validation and capping.

use super::error::CatalogError;
use tracing::warn;

/// Hard cap applied to every `limit` parameter before dispatch
pub const LIMIT_CAP: u64 = 20;

/// Field set requested when a caller does not narrow an anime lookup
pub const DEFAULT_ANIME_FIELDS: &str =
    "id,title,main_picture,start_date,end_date,mean,num_episodes,start_season";

/// Check that a numeric-typed argument consists only of decimal digits.
///
/// Empty strings are accepted; the endpoints treat emptiness as "use the
/// server default". Signs, decimal points, letters and non-ASCII digits are
/// all rejected before any request is built.
pub(crate) fn require_numeric(field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.is_empty() || value.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }

    warn!(field, value, "numeric argument check failed");
    Err(CatalogError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Cap a validated limit at [`LIMIT_CAP`].
///
/// Values at or below the cap (including "0") pass through byte-for-byte.
pub(crate) fn cap_limit(limit: &str) -> String {
    match limit.parse::<u64>() {
        Ok(n) if n > LIMIT_CAP => LIMIT_CAP.to_string(),
        _ => limit.to_string(),
    }
}
