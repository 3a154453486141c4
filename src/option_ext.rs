//! Extension methods for turning a missing `Option` value into a
//! [`TrailError`].
//!
//! # Quick Start
//!
//! ```
//! use errtrail::{NO_DATA, TrailError, option_ext::OptionExt};
//!
//! fn lookup(name: &str) -> Option<u32> {
//!     (name == "alice").then_some(1)
//! }
//!
//! fn user_id(name: &str) -> Result<u32, TrailError> {
//!     let id = lookup(name).ok_or_no_data()?;
//!     Ok(id)
//! }
//!
//! assert_eq!(user_id("alice").unwrap(), 1);
//! assert!(NO_DATA.equal(&user_id("bob").unwrap_err()));
//! ```
//!
//! # Usage Considerations
//!
//! Some developers prefer to keep `Option` and `Result` handling visually
//! distinct. [`Option::ok_or_else`] with [`TrailError::new`] works just as
//! well if that is a concern.

use alloc::{string::String, vec::Vec};
use core::panic::Location;

use crate::{NO_DATA, TrailError};

/// Extension trait for `Option` that produces [`TrailError`]s for `None`.
pub trait OptionExt<V> {
    /// Converts `None` into an annotated copy of [`NO_DATA`].
    ///
    /// The result compares equal to [`NO_DATA`] and has a trail entry for the
    /// caller.
    #[track_caller]
    fn ok_or_no_data(self) -> Result<V, TrailError>;

    /// Converts `None` into a new [`TrailError`] with `code`, created at the
    /// caller.
    ///
    /// ```
    /// use errtrail::option_ext::OptionExt;
    ///
    /// let port: Option<u16> = None;
    /// let error = port.ok_or_trail("port not configured").unwrap_err();
    /// assert_eq!(error.code(), "port not configured");
    /// ```
    #[track_caller]
    fn ok_or_trail(self, code: impl Into<String>) -> Result<V, TrailError>;
}

impl<V> OptionExt<V> for Option<V> {
    #[track_caller]
    fn ok_or_no_data(self) -> Result<V, TrailError> {
        match self {
            Some(value) => Ok(value),
            None => Err(NO_DATA.annotate_at(Location::caller(), Vec::new())),
        }
    }

    #[track_caller]
    fn ok_or_trail(self, code: impl Into<String>) -> Result<V, TrailError> {
        match self {
            Some(value) => Ok(value),
            None => Err(TrailError::new_at(
                code.into(),
                Location::caller(),
                Vec::new(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_some_passes_through() {
        assert_eq!(Some(5).ok_or_no_data().unwrap(), 5);
        assert_eq!(Some(5).ok_or_trail("missing").unwrap(), 5);
    }

    #[test]
    fn test_none_becomes_no_data() {
        let error = None::<u8>.ok_or_no_data().unwrap_err();
        assert!(NO_DATA.equal(&error));
        assert!(!NO_DATA.is_same_instance(&error));
        assert_eq!(error.trail().len(), NO_DATA.trail().len() + 1);
        assert!(error.trail().last().site().as_str().contains(file!()));
    }

    #[test]
    fn test_none_becomes_new_error() {
        let error = None::<u8>.ok_or_trail("missing").unwrap_err();
        assert_eq!(error.code(), "missing");
        assert_eq!(error.trail().len(), 1);
        assert!(error.trail().first().site().as_str().contains(file!()));
    }
}
