//! Commonly used items for convenient importing.
//!
//! ```rust
//! use errtrail::prelude::*;
//!
//! fn divide(a: i32, b: i32) -> Result<i32, TrailError> {
//!     if b == 0 {
//!         bail!("division by zero", a);
//!     }
//!     Ok(a / b)
//! }
//!
//! assert_eq!(divide(10, 2).unwrap(), 5);
//! assert_eq!(divide(1, 0).unwrap_err().code(), "division by zero");
//! ```

pub use crate::{
    IntoTrailError, IntoTrailResult, NO_DATA, TrailError, Value, annotate, bail,
    option_ext::OptionExt, result_ext::ResultExt, trail,
};
