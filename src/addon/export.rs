//! Locates the encoded export string inside a SavedVariables file.
//!
//! The addon writes a Lua table literal of the form
//!
//! ```text
//! MissionMinderDB = {
//!     ["export"] = "eJyrVkrOz0lVslIqS8wpTVWqBQA...",
//! }
//! ```
//!
//! and the payload is everything between the two markers.

use super::error::ExtractError;

/// Marker preceding the payload.
pub const EXPORT_PREFIX: &[u8] = br#"["export"] = ""#;

/// Marker terminating the payload.
pub const EXPORT_SUFFIX: &[u8] = br#"","#;

/// Return the bytes strictly between the first prefix marker and the first
/// suffix marker after it.
///
/// # Errors
///
/// [`ExtractError::EmptyContents`] when `data` is empty, and
/// [`ExtractError::NotFound`] when either marker is missing.
pub fn extract_export(data: &[u8]) -> Result<&[u8], ExtractError> {
    if data.is_empty() {
        return Err(ExtractError::EmptyContents);
    }

    let start = find(data, EXPORT_PREFIX).ok_or(ExtractError::NotFound)? + EXPORT_PREFIX.len();
    let rest = &data[start..];
    let end = find(rest, EXPORT_SUFFIX).ok_or(ExtractError::NotFound)?;

    Ok(&rest[..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
