//! Integration with the [`eyre`] 0.6.x error handling library.
//!
//! Works like [`anyhow1`](super::anyhow1): [`eyre::Report`] implements
//! [`IntoTrailError`], and [`IntoEyre`] converts the other way.
//!
//! ```
//! use errtrail::{TrailError, compat::eyre06::IntoEyre, prelude::*};
//!
//! fn eyre_function() -> eyre::Result<String> {
//!     eyre::bail!("timeout");
//! }
//!
//! fn errtrail_function() -> Result<String, TrailError> {
//!     let value = eyre_function().into_trail_result()?;
//!     Ok(value)
//! }
//!
//! let error = errtrail_function().unwrap_err();
//! assert_eq!(error.code(), "timeout");
//!
//! let report: eyre::Report = error.clone().into_eyre();
//! assert!(report.into_trail_error().is_same_instance(&error));
//! ```

use core::panic::Location;

use crate::{IntoTrailError, TrailError};

impl IntoTrailError for eyre::Report {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        if let Some(error) = self.downcast_ref::<TrailError>() {
            return error.clone();
        }
        TrailError::resolve_at(&*self, Location::caller())
    }
}

/// Converts [`TrailError`]s into [`eyre::Report`].
pub trait IntoEyre {
    /// The type produced by the conversion.
    ///
    /// - For [`TrailError`]: produces [`eyre::Report`]
    /// - For [`Result<T, TrailError>`]: produces [`eyre::Result<T>`]
    type Output;

    /// Converts this value into an eyre type.
    fn into_eyre(self) -> Self::Output;
}

impl IntoEyre for TrailError {
    type Output = eyre::Report;

    fn into_eyre(self) -> Self::Output {
        eyre::Report::new(self)
    }
}

impl<T> IntoEyre for Result<T, TrailError> {
    type Output = eyre::Result<T>;

    fn into_eyre(self) -> Self::Output {
        self.map_err(IntoEyre::into_eyre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_instance() {
        let error = TrailError::new("code").annotate_with(["ctx"]);
        let back = error.clone().into_eyre().into_trail_error();
        assert!(back.is_same_instance(&error));
    }

    #[test]
    fn test_wrapped_report_keeps_inner_instance() {
        let error = TrailError::new("code");
        let wrapped = error.clone().into_eyre().wrap_err("while saving");
        assert!(wrapped.into_trail_error().is_same_instance(&error));
    }

    #[test]
    fn test_foreign_message_becomes_code() {
        let converted = eyre::eyre!("plain failure").into_trail_error();
        assert_eq!(converted.code(), "plain failure");
    }
}
