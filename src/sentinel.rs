//! The shared "data not found" error.

use alloc::{string::String, vec::Vec};
use core::panic::Location;

use crate::TrailError;

/// Code of [`NO_DATA`].
pub const NO_DATA_CODE: &str = "data not found";

const SENTINEL_LOCATION: &Location<'static> = Location::caller();

/// A process-wide error meaning "the requested data does not exist".
///
/// It is built on first use and never changes afterwards. Return annotated
/// copies of it, and recognize them with [`equal`](crate::equal), which
/// compares by code:
///
/// ```
/// use errtrail::{NO_DATA, TrailError};
///
/// fn find(id: u32) -> Result<&'static str, TrailError> {
///     match id {
///         1 => Ok("alice"),
///         _ => Err(NO_DATA.annotate_with([id])),
///     }
/// }
///
/// let error = find(7).unwrap_err();
/// assert!(NO_DATA.equal(&error));
/// assert_eq!(error.code(), "data not found");
/// ```
pub static NO_DATA: spin::Lazy<TrailError> = spin::Lazy::new(|| {
    TrailError::new_at(String::from(NO_DATA_CODE), SENTINEL_LOCATION, Vec::new())
});
