//! Interoperability with other error handling libraries.
//!
//! Each submodule implements [`IntoTrailError`](crate::IntoTrailError) for the
//! library's error type, and a trait to convert in the other direction:
//!
//! - [`anyhow1`] - `anyhow` 1.x (requires the `compat-anyhow1` feature flag)
//! - [`eyre06`] - `eyre` 0.6.x (requires the `compat-eyre06` feature flag)
//!
//! Boxed `dyn Error` values are supported without any feature flag through
//! [`IntoTrailError`](crate::IntoTrailError) and `From`.
//!
//! In both directions a [`TrailError`](crate::TrailError) that is wrapped by
//! the other library comes back as the same instance, so its code and trail
//! survive a round trip.
//!
//! ```
//! use errtrail::prelude::*;
//!
//! # #[cfg(feature = "compat-anyhow1")] {
//! fn legacy_function() -> anyhow::Result<String> {
//!     anyhow::bail!("something went wrong");
//! }
//!
//! fn new_function() -> Result<String, TrailError> {
//!     let value = legacy_function().into_trail_result()?;
//!     Ok(value)
//! }
//!
//! assert_eq!(new_function().unwrap_err().code(), "something went wrong");
//! # }
//! ```

#[cfg(feature = "compat-anyhow1")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-anyhow1")))]
pub mod anyhow1;

#[cfg(feature = "compat-eyre06")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-eyre06")))]
pub mod eyre06;
