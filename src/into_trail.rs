use alloc::boxed::Box;
use core::{error::Error, panic::Location};

use crate::TrailError;

/// Converts errors into [`TrailError`]s.
///
/// A [`TrailError`] converts into itself, keeping its identity. Any other
/// error is resolved as by [`TrailError::from_dyn`]: its text is parsed, so
/// an error that wraps an encoded trail gets it back, and anything else
/// becomes a new error created at the caller.
///
/// This trait is what the [`annotate!`](crate::annotate!) macro and the
/// compat conversions accept. For owned foreign errors, pass a reference:
///
/// ```
/// use errtrail::{IntoTrailError, TrailError};
///
/// let io = std::io::Error::other("disk full");
/// let error: TrailError = (&io).into_trail_error();
/// assert_eq!(error.code(), "disk full");
///
/// let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(io);
/// assert_eq!(boxed.into_trail_error().code(), "disk full");
/// ```
pub trait IntoTrailError {
    /// Performs the conversion.
    #[track_caller]
    #[must_use]
    fn into_trail_error(self) -> TrailError;
}

impl IntoTrailError for TrailError {
    #[inline(always)]
    fn into_trail_error(self) -> TrailError {
        self
    }
}

impl<E> IntoTrailError for &E
where
    E: Error + 'static,
{
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        TrailError::resolve_at(self, Location::caller())
    }
}

impl IntoTrailError for &(dyn Error + 'static) {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        TrailError::resolve_at(self, Location::caller())
    }
}

impl IntoTrailError for &(dyn Error + Send + Sync + 'static) {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        TrailError::resolve_at(self, Location::caller())
    }
}

impl IntoTrailError for Box<dyn Error + 'static> {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        TrailError::resolve_at(&*self, Location::caller())
    }
}

impl IntoTrailError for Box<dyn Error + Send + Sync + 'static> {
    #[track_caller]
    fn into_trail_error(self) -> TrailError {
        TrailError::resolve_at(&*self, Location::caller())
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for TrailError {
    #[track_caller]
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        error.into_trail_error()
    }
}

/// Converts the error of a [`Result`] with [`IntoTrailError`].
///
/// ```
/// use errtrail::{IntoTrailResult, TrailError};
///
/// fn legacy() -> Result<u8, Box<dyn std::error::Error + Send + Sync>> {
///     Err("connection reset".into())
/// }
///
/// let result: Result<u8, TrailError> = legacy().into_trail_result();
/// assert_eq!(result.unwrap_err().code(), "connection reset");
/// ```
pub trait IntoTrailResult<T> {
    /// Performs the conversion.
    #[track_caller]
    fn into_trail_result(self) -> Result<T, TrailError>;
}

impl<T, E> IntoTrailResult<T> for Result<T, E>
where
    E: IntoTrailError,
{
    #[track_caller]
    fn into_trail_result(self) -> Result<T, TrailError> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(error.into_trail_error()),
        }
    }
}
