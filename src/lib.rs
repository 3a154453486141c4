#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![forbid(unsafe_code)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Errors that carry a stable code and the trail of places they passed
//! through.
//!
//! ## Overview
//!
//! A [`TrailError`] pairs two things:
//! - a **code**, fixed when the error is created, which is what equality is
//!   based on;
//! - a **trail**, an append-only list of entries. Each entry records a
//!   **call site** (where the error was created or annotated) and any
//!   number of free-form **context** values.
//!
//! Annotating an error never changes it. It returns a new error with the same
//! code and one more entry, sharing the old trail as a prefix. Errors are
//! therefore safe to share and annotate from any number of threads.
//!
//! The whole error encodes to a compact JSON text and parses back, so the
//! trail survives crossing a process boundary as a plain string. Text that
//! is not an encoded error becomes the code of a new one.
//!
//! ## Quick Example
//!
//! ```
//! use errtrail::{TrailError, result_ext::ResultExt};
//!
//! fn load_user(id: u32) -> Result<String, TrailError> {
//!     if id == 0 {
//!         errtrail::bail!("user not found", id);
//!     }
//!     Ok(format!("user-{id}"))
//! }
//!
//! fn handler(id: u32) -> Result<String, TrailError> {
//!     let user = load_user(id).annotate_with(["while handling request"])?;
//!     Ok(user)
//! }
//!
//! let error = handler(0).unwrap_err();
//! assert_eq!(error.code(), "user not found");
//! assert_eq!(error.trail().len(), 2);
//!
//! // The text form carries the trail across boundaries.
//! let text = error.to_string();
//! let parsed = errtrail::parse(&text).unwrap();
//! assert!(errtrail::equal(Some(&parsed), Some(&error)));
//! assert_eq!(parsed.trail(), error.trail());
//! ```
//!
//! ## Working with other errors
//!
//! Any error can be brought in with [`TrailError::from_dyn`],
//! [`parse_error`], the [`annotate()`] free function, or the
//! [`ResultExt`](result_ext::ResultExt) methods. A `TrailError` hidden behind
//! `dyn Error` is recovered as the same instance. Any other error is
//! rendered to text and parsed.
//!
//! [`equal`] compares any two errors. It also looks through
//! [`source`](core::error::Error::source) chains, so a wrapper around a
//! `TrailError` compares equal to it.
//!
//! ## Call sites
//!
//! Every entry point is `#[track_caller]`. The call site of an entry is the
//! direct caller in user code, rendered by the installed
//! [`CallSiteProvider`](callsite::CallSiteProvider). See [`callsite`].
//!
//! ## Ecosystem
//!
//! - **[`errtrail-backtrace`]** - A call-site provider that adds the name of
//!   the enclosing function.
//! - **[`errtrail-tracing`]** - Logging of errors that are handled rather
//!   than returned, and annotation with the current tracing span.
//!
//! [`errtrail-backtrace`]: https://docs.rs/errtrail-backtrace
//! [`errtrail-tracing`]: https://docs.rs/errtrail-tracing
//!
//! ## Features
//!
//! - `std` - Use `std` locks and read configuration from the environment.
//! - `compat-anyhow1`, `compat-eyre06` - Conversions to and from `anyhow`
//!   and `eyre`.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod callsite;
pub mod compat;
pub mod option_ext;
pub mod prelude;
pub mod result_ext;
pub mod trail;

mod entry;
mod into_trail;
mod record;
mod sentinel;
mod value;

pub use self::{
    entry::Entry,
    into_trail::{IntoTrailError, IntoTrailResult},
    record::{INIT_MARKER, TrailError, annotate, annotate_with, equal, parse, parse_error},
    sentinel::{NO_DATA, NO_DATA_CODE},
    trail::Trail,
    value::Value,
};

/// A [`Result`](core::result::Result) type alias where the error defaults to
/// [`TrailError`].
///
/// ```
/// fn might_fail() -> errtrail::Result<String> {
///     Ok("success".to_string())
/// }
/// ```
pub type Result<T, E = TrailError> = core::result::Result<T, E>;

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use alloc::vec::Vec;
    use core::panic::Location;

    #[doc(hidden)]
    pub use core::result::Result::Err;

    use crate::{TrailError, Value};

    #[doc(hidden)]
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn annotate<const N: usize>(error: TrailError, context: [Value; N]) -> TrailError {
        error.annotate_at(Location::caller(), Vec::from(context))
    }
}
