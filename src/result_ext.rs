//! Extension methods for annotating the error of a [`Result`].
//!
//! This is the `?`-friendly form of [`annotate()`](fn@crate::annotate): the error
//! is resolved into a [`TrailError`] and annotated at the caller, the success
//! value passes through untouched.
//!
//! ```
//! use errtrail::{TrailError, result_ext::ResultExt};
//!
//! fn read_config(path: &str) -> Result<String, TrailError> {
//!     let text = std::fs::read_to_string(path).annotate_with([path])?;
//!     Ok(text)
//! }
//!
//! let error = read_config("/does/not/exist").unwrap_err();
//! assert_eq!(error.trail().len(), 2);
//! ```

use alloc::vec::Vec;
use core::{error::Error, panic::Location};

use crate::{TrailError, Value, record::collect_context};

/// Extension trait for annotating the error of a [`Result`].
///
/// See the [module documentation](self).
pub trait ResultExt<T> {
    /// Annotates the error at the caller.
    ///
    /// ```
    /// use errtrail::{TrailError, result_ext::ResultExt};
    ///
    /// let result: Result<(), TrailError> = Err(TrailError::new("boom"));
    /// let error = result.annotate().unwrap_err();
    /// assert_eq!(error.code(), "boom");
    /// assert_eq!(error.trail().len(), 2);
    /// ```
    #[track_caller]
    fn annotate(self) -> Result<T, TrailError>;

    /// Annotates the error at the caller with `context`.
    #[track_caller]
    fn annotate_with<I>(self, context: I) -> Result<T, TrailError>
    where
        I: IntoIterator,
        I::Item: Into<Value>;

    /// Annotates the error at the caller with context computed by `context`.
    ///
    /// The closure only runs if there is an error.
    ///
    /// ```
    /// use errtrail::{TrailError, Value, result_ext::ResultExt};
    ///
    /// let result: Result<(), TrailError> = Err(TrailError::new("boom"));
    /// let error = result
    ///     .annotate_lazy(|| [format!("attempt {}", 3)])
    ///     .unwrap_err();
    /// assert_eq!(
    ///     error.trail().last().context(),
    ///     &[Value::from("attempt 3")]
    /// );
    /// ```
    #[track_caller]
    fn annotate_lazy<F, I>(self, context: F) -> Result<T, TrailError>
    where
        F: FnOnce() -> I,
        I: IntoIterator,
        I::Item: Into<Value>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + 'static,
{
    #[track_caller]
    fn annotate(self) -> Result<T, TrailError> {
        annotate_err(self, Location::caller(), Vec::new)
    }

    #[track_caller]
    fn annotate_with<I>(self, context: I) -> Result<T, TrailError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        annotate_err(self, Location::caller(), || collect_context(context))
    }

    #[track_caller]
    fn annotate_lazy<F, I>(self, context: F) -> Result<T, TrailError>
    where
        F: FnOnce() -> I,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        annotate_err(self, Location::caller(), || collect_context(context()))
    }
}

fn annotate_err<T, E, F>(
    result: Result<T, E>,
    location: &'static Location<'static>,
    context: F,
) -> Result<T, TrailError>
where
    E: Error + 'static,
    F: FnOnce() -> Vec<Value>,
{
    match result {
        Ok(value) => Ok(value),
        Err(error) => Err(TrailError::resolve_at(&error, location).annotate_at(location, context())),
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u8, TrailError> = Ok(3);
        assert_eq!(result.annotate().unwrap(), 3);

        let result: Result<u8, TrailError> = Ok(3);
        let value = result
            .annotate_lazy(|| -> [Value; 0] { panic!("context computed for Ok") })
            .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn test_annotation_site_is_caller() {
        let result: Result<(), TrailError> = Err(TrailError::new("code"));
        let line = line!() + 1;
        let error = result.annotate_with(["ctx", "more"]).unwrap_err();
        let last = error.trail().last();
        assert!(
            last.site()
                .as_str()
                .contains(&format!("{}:{}", file!(), line))
        );
        assert_eq!(last.context(), &[Value::from("ctx"), Value::from("more")]);
    }

    #[test]
    fn test_foreign_error_is_resolved_then_annotated() {
        let result: Result<(), core::fmt::Error> = Err(core::fmt::Error);
        let error = result.annotate().unwrap_err();
        assert_eq!(error.code(), format!("{}", core::fmt::Error));
        assert_eq!(error.trail().len(), 2);
        assert_eq!(error.trail().first().site(), error.trail().last().site());
    }
}
