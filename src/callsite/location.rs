use alloc::{format, string::String};
use core::panic::Location;

use super::CallSiteProvider;

/// How much of the source path a [`LocationProvider`] keeps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStyle {
    /// The path as the compiler reports it, e.g. `src/db/pool.rs`.
    Full,
    /// Only the last path component, e.g. `pool.rs`.
    FileName,
}

/// The default [`CallSiteProvider`], rendering `file:line:column`.
///
/// ```rust
/// use errtrail::callsite::{CallSiteProvider, LocationProvider, PathStyle};
///
/// let provider = LocationProvider {
///     path_style: PathStyle::FileName,
///     column: false,
/// };
/// let location = core::panic::Location::caller();
/// let described = provider.describe(location).unwrap();
/// assert_eq!(described, format!("{}:{}", location.file().rsplit('/').next().unwrap(), location.line()));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocationProvider {
    /// Which part of the source path to keep.
    pub path_style: PathStyle,
    /// Whether to append the column number.
    pub column: bool,
}

impl LocationProvider {
    /// Full path, with column.
    pub const DEFAULT: Self = Self {
        path_style: PathStyle::Full,
        column: true,
    };

    /// Builds a provider from the `ERRTRAIL_CALLSITE` environment variable.
    ///
    /// The variable is read once per process.
    ///
    /// # Environment Variables
    ///
    /// - `ERRTRAIL_CALLSITE` - Comma-separated options:
    ///   - `short_paths` - Use [`PathStyle::FileName`]
    ///   - `no_column` - Leave out the column number
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        *Self::configured()
    }

    /// Parses the option list accepted by `ERRTRAIL_CALLSITE`.
    ///
    /// Unknown options are ignored.
    ///
    /// ```rust
    /// use errtrail::callsite::{LocationProvider, PathStyle};
    ///
    /// let provider = LocationProvider::from_options("short_paths, NO_COLUMN");
    /// assert_eq!(provider.path_style, PathStyle::FileName);
    /// assert!(!provider.column);
    /// ```
    pub fn from_options(options: &str) -> Self {
        let mut provider = Self::DEFAULT;
        for option in options.split(',').map(str::trim) {
            if option.eq_ignore_ascii_case("short_paths") {
                provider.path_style = PathStyle::FileName;
            } else if option.eq_ignore_ascii_case("no_column") {
                provider.column = false;
            }
        }
        provider
    }

    #[cfg(feature = "std")]
    pub(crate) fn configured() -> &'static Self {
        static CONFIGURED: std::sync::OnceLock<LocationProvider> = std::sync::OnceLock::new();

        CONFIGURED.get_or_init(|| match std::env::var_os("ERRTRAIL_CALLSITE") {
            Some(var) => Self::from_options(&var.to_string_lossy()),
            None => Self::DEFAULT,
        })
    }

    #[cfg(not(feature = "std"))]
    pub(crate) fn configured() -> &'static Self {
        &Self::DEFAULT
    }

    /// Renders `location` according to this provider's settings.
    pub fn render(&self, location: &Location<'_>) -> String {
        let file = match self.path_style {
            PathStyle::Full => location.file(),
            PathStyle::FileName => file_name(location.file()),
        };
        if self.column {
            format!("{}:{}:{}", file, location.line(), location.column())
        } else {
            format!("{}:{}", file, location.line())
        }
    }
}

impl Default for LocationProvider {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CallSiteProvider for LocationProvider {
    fn describe(&self, location: &'static Location<'static>) -> Option<String> {
        Some(self.render(location))
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("src/db/pool.rs"), "pool.rs");
        assert_eq!(file_name(r"src\db\pool.rs"), "pool.rs");
        assert_eq!(file_name("lib.rs"), "lib.rs");
    }

    #[test]
    fn test_render_default() {
        let location = Location::caller();
        let rendered = LocationProvider::DEFAULT.render(location);
        assert_eq!(
            rendered,
            format!("{}:{}:{}", file!(), location.line(), location.column())
        );
    }

    #[test]
    fn test_unknown_options_are_ignored() {
        assert_eq!(
            LocationProvider::from_options("leafs,,full_paths"),
            LocationProvider::DEFAULT
        );
    }
}
