//! Call-site descriptors and the provider that renders them.
//!
//! Every trail entry starts with a [`CallSite`]: an opaque, human-readable
//! string naming the place in the code where the error was created or
//! annotated. All public entry points of this crate are `#[track_caller]`, so
//! the location handed to the provider is always the direct caller in user
//! code, whether the method form, the free-function form, a macro or an
//! extension trait was used.
//!
//! # Providers
//!
//! Turning a [`Location`] into a descriptor is the job of a
//! [`CallSiteProvider`]. Unless one is installed, [`LocationProvider`] renders
//! `file:line:column`. A different provider can be installed once per process:
//!
//! ```rust
//! use errtrail::callsite::{LocationProvider, PathStyle, install_provider};
//!
//! install_provider(LocationProvider {
//!     path_style: PathStyle::FileName,
//!     column: false,
//! })
//! .expect("failed to install call-site provider");
//! ```
//!
//! Closures work as providers too:
//!
//! ```rust
//! use errtrail::callsite::replace_provider;
//!
//! replace_provider(|location: &'static core::panic::Location<'static>| {
//!     Some(format!("{}@{}", location.line(), location.file()))
//! });
//! ```
//!
//! Resolution never fails. A provider that returns `None` or an empty string
//! yields [`UNKNOWN_CALL_SITE`] instead.
//!
//! # Environment Variables
//!
//! With the `std` feature the default provider is configured once from
//! `ERRTRAIL_CALLSITE`, a comma-separated list of options:
//! - `short_paths` - Only keep the file name of the source path
//! - `no_column` - Leave out the column number

mod location;
mod lock;

use alloc::{boxed::Box, string::String};
use core::{fmt, panic::Location};

use triomphe::Arc;
use unsize::CoerceUnsize;

pub use self::location::{LocationProvider, PathStyle};
use self::lock::ProviderLock;

/// Descriptor used when a provider cannot describe a location.
pub const UNKNOWN_CALL_SITE: &str = "<unknown call site>";

/// An opaque descriptor of the place where a trail entry was recorded.
///
/// The descriptor is never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallSite(String);

impl CallSite {
    /// Wraps a descriptor, substituting [`UNKNOWN_CALL_SITE`] for an empty
    /// string.
    pub fn new(descriptor: impl Into<String>) -> Self {
        let descriptor = descriptor.into();
        if descriptor.is_empty() {
            Self(String::from(UNKNOWN_CALL_SITE))
        } else {
            Self(descriptor)
        }
    }

    /// Describes the location of the caller with the installed provider.
    ///
    /// ```rust
    /// use errtrail::callsite::CallSite;
    ///
    /// let here = CallSite::current();
    /// assert!(here.as_str().contains(file!()));
    /// ```
    #[track_caller]
    #[must_use]
    pub fn current() -> Self {
        describe(Location::caller())
    }

    /// Returns the descriptor text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no provider could describe the location.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CALL_SITE
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl AsRef<str> for CallSite {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Renders a source location into a call-site descriptor.
///
/// Implementations must not panic or block. Returning `None` is the way to
/// signal that the location cannot be described.
pub trait CallSiteProvider: Send + Sync + 'static {
    /// Describes `location`, the direct caller of a public entry point.
    fn describe(&self, location: &'static Location<'static>) -> Option<String>;
}

impl<F> CallSiteProvider for F
where
    F: Fn(&'static Location<'static>) -> Option<String> + Send + Sync + 'static,
{
    fn describe(&self, location: &'static Location<'static>) -> Option<String> {
        self(location)
    }
}

/// Error returned by [`install_provider`] when a provider is already in
/// place.
///
/// Contains the provider that was rejected.
pub struct ProviderAlreadyInstalledError(pub Box<dyn CallSiteProvider>);

impl fmt::Debug for ProviderAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderAlreadyInstalledError").finish()
    }
}

impl fmt::Display for ProviderAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a call-site provider is already installed")
    }
}

impl core::error::Error for ProviderAlreadyInstalledError {}

static PROVIDER: ProviderLock = ProviderLock::new();

/// Installs `provider` globally.
///
/// Fails if a provider was installed before; see [`replace_provider`] to
/// overwrite it.
pub fn install_provider<P: CallSiteProvider>(
    provider: P,
) -> Result<(), ProviderAlreadyInstalledError> {
    let mut guard = PROVIDER.write();
    let slot = guard.get();
    if slot.is_some() {
        return Err(ProviderAlreadyInstalledError(Box::new(provider)));
    }
    *slot = Some(share(provider));
    Ok(())
}

/// Installs `provider` globally and returns the previously installed one.
pub fn replace_provider<P: CallSiteProvider>(provider: P) -> Option<Arc<dyn CallSiteProvider>> {
    PROVIDER.write().get().replace(share(provider))
}

/// Removes the installed provider, restoring the default one.
pub fn reset_provider() -> Option<Arc<dyn CallSiteProvider>> {
    PROVIDER.write().get().take()
}

fn share<P: CallSiteProvider>(provider: P) -> Arc<dyn CallSiteProvider> {
    Arc::new(provider).unsize(unsize::Coercion!(to dyn CallSiteProvider))
}

pub(crate) fn describe(location: &'static Location<'static>) -> CallSite {
    // The lock is released before the provider runs, so providers may record
    // errors or swap the provider themselves.
    let provider = PROVIDER.read().get().cloned();
    let descriptor = match provider {
        Some(provider) => provider.describe(location),
        None => LocationProvider::configured().describe(location),
    };
    CallSite::new(descriptor.unwrap_or_default())
}
