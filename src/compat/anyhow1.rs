//! Integration with the [`anyhow`] 1.x error handling library.
//!
//! # Converting from Anyhow
//!
//! [`anyhow::Error`] implements [`IntoTrailError`]. An `anyhow::Error` that
//! wraps a [`TrailError`] gives back that same instance. Any other error is
//! resolved from its text, as by [`TrailError::from_dyn`]:
//!
//! ```
//! use errtrail::prelude::*;
//!
//! fn anyhow_function() -> anyhow::Result<String> {
//!     anyhow::bail!("connection refused");
//! }
//!
//! fn errtrail_function() -> Result<String, TrailError> {
//!     let value = anyhow_function().into_trail_result()?;
//!     Ok(value)
//! }
//!
//! assert_eq!(errtrail_function().unwrap_err().code(), "connection refused");
//! ```
//!
//! # Converting to Anyhow
//!
//! [`TrailError`] is a regular error, so `?` and `From` already work. The
//! [`IntoAnyhow`] trait spells the conversion out:
//!
//! ```
//! use errtrail::{TrailError, compat::anyhow1::IntoAnyhow};
//!
//! fn errtrail_function() -> Result<String, TrailError> {
//!     Err(TrailError::new("database connection failed"))
//! }
//!
//! fn anyhow_function() -> anyhow::Result<String> {
//!     let value = errtrail_function().into_anyhow()?;
//!     Ok(value)
//! }
//!
//! let error = anyhow_function().unwrap_err();
//! assert!(error.downcast_ref::<TrailError>().is_some());
//! ```

use core::panic::Location;

use crate::{IntoTrailError, TrailError};

impl IntoTrailError for anyhow::Error {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        if let Some(error) = self.downcast_ref::<TrailError>() {
            return error.clone();
        }
        TrailError::resolve_at(&*self, Location::caller())
    }
}

/// Converts [`TrailError`]s into [`anyhow::Error`].
pub trait IntoAnyhow {
    /// The type produced by the conversion.
    ///
    /// - For [`TrailError`]: produces [`anyhow::Error`]
    /// - For [`Result<T, TrailError>`]: produces [`anyhow::Result<T>`]
    type Output;

    /// Converts this value into an anyhow type.
    fn into_anyhow(self) -> Self::Output;
}

impl IntoAnyhow for TrailError {
    type Output = anyhow::Error;

    fn into_anyhow(self) -> Self::Output {
        anyhow::Error::new(self)
    }
}

impl<T> IntoAnyhow for Result<T, TrailError> {
    type Output = anyhow::Result<T>;

    fn into_anyhow(self) -> Self::Output {
        self.map_err(IntoAnyhow::into_anyhow)
    }
}
