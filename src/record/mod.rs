mod codec;
mod equality;

use alloc::{string::String, vec::Vec};
use core::{fmt, hash, panic::Location};

use triomphe::Arc;

pub use self::{codec::parse, equality::equal};
use crate::{
    Value, callsite,
    entry::Entry,
    trail::{self, Trail},
};

/// Context recorded on the creation entry when the caller supplies none.
pub const INIT_MARKER: &str = "[init]";

struct Record {
    code: Arc<String>,
    trail: Trail,
}

/// An error made of a stable code and the trail of places it passed through.
///
/// The code is set once, when the error is created, and is what equality is
/// based on. The trail starts with the creation entry and grows by one entry
/// every time the error is annotated. Annotating never modifies an existing
/// `TrailError`; it returns a new one that shares the old trail as a prefix.
///
/// Cloning a `TrailError` is cheap and yields another handle to the *same*
/// instance (see [`is_same_instance`](Self::is_same_instance)).
///
/// The [`Display`](fmt::Display) output is the canonical text encoding, a
/// JSON array of the code followed by the entries:
///
/// ```
/// use errtrail::TrailError;
///
/// let error = TrailError::new("timeout").annotate_with(["db", "users"]);
/// let text = error.to_string();
/// assert!(text.starts_with(r#"["timeout",["#));
/// assert_eq!(errtrail::parse(&text).unwrap().code(), "timeout");
/// ```
#[derive(Clone)]
pub struct TrailError(Arc<Record>);

impl TrailError {
    /// Creates an error whose creation entry records the caller and the
    /// `"[init]"` marker.
    ///
    /// ```
    /// use errtrail::TrailError;
    ///
    /// let error = TrailError::new("user not found");
    /// assert_eq!(error.code(), "user not found");
    /// assert_eq!(error.trail().len(), 1);
    /// ```
    #[track_caller]
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self::new_at(code.into(), Location::caller(), Vec::new())
    }

    /// Creates an error whose creation entry records the caller and
    /// `context`.
    ///
    /// An empty `context` records the `"[init]"` marker, like
    /// [`new`](Self::new).
    #[track_caller]
    #[must_use]
    pub fn with_context<I>(code: impl Into<String>, context: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new_at(code.into(), Location::caller(), collect_context(context))
    }

    /// Returns a new error with an entry for the caller appended to the trail.
    ///
    /// `self` is left untouched.
    ///
    /// ```
    /// use errtrail::TrailError;
    ///
    /// let original = TrailError::new("boom");
    /// let annotated = original.annotate();
    /// assert_eq!(original.trail().len(), 1);
    /// assert_eq!(annotated.trail().len(), 2);
    /// assert!(!annotated.is_same_instance(&original));
    /// ```
    #[track_caller]
    #[must_use]
    pub fn annotate(&self) -> Self {
        self.annotate_at(Location::caller(), Vec::new())
    }

    /// Returns a new error with an entry for the caller and `context`
    /// appended to the trail.
    ///
    /// Use the [`annotate!`](crate::annotate!) macro for context values of
    /// different types.
    #[track_caller]
    #[must_use]
    pub fn annotate_with<I>(&self, context: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.annotate_at(Location::caller(), collect_context(context))
    }

    /// The code this error was created with.
    pub fn code(&self) -> &str {
        &self.0.code
    }

    /// The trail of entries, creation entry first.
    pub fn trail(&self) -> &Trail {
        &self.0.trail
    }

    /// Iterates over the trail entries, creation entry first.
    pub fn entries(&self) -> trail::Iter<'_> {
        self.0.trail.iter()
    }

    /// Returns `true` if both handles point to the same instance.
    ///
    /// Clones share an instance; annotating or parsing always creates a new
    /// one.
    pub fn is_same_instance(&self, other: &TrailError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Encodes the error as compact JSON text. Same as `to_string()`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encodes the error as indented JSON text. Same as `format!("{:#}")`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn new_at(
        code: String,
        location: &'static Location<'static>,
        mut context: Vec<Value>,
    ) -> Self {
        if context.is_empty() {
            context.push(Value::from(INIT_MARKER));
        }
        let entry = Entry::new(callsite::describe(location), context);
        Self::from_parts(Arc::new(code), Trail::new(entry))
    }

    pub(crate) fn annotate_at(
        &self,
        location: &'static Location<'static>,
        context: Vec<Value>,
    ) -> Self {
        let entry = Entry::new(callsite::describe(location), context);
        Self::from_parts(self.0.code.clone(), self.0.trail.pushed(entry))
    }

    fn from_parts(code: Arc<String>, trail: Trail) -> Self {
        Self(Arc::new(Record { code, trail }))
    }
}

pub(crate) fn collect_context<I>(context: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    context.into_iter().map(Into::into).collect()
}

/// Annotates a possibly absent error at the caller.
///
/// Foreign errors are resolved with [`TrailError::from_dyn`] first. `None`
/// passes through, so the result of a fallible call can be annotated without
/// branching.
///
/// ```
/// use errtrail::TrailError;
///
/// assert!(errtrail::annotate(None::<TrailError>).is_none());
///
/// let io = std::io::Error::other("disk full");
/// let annotated = errtrail::annotate(Some(io)).unwrap();
/// assert_eq!(annotated.code(), "disk full");
/// assert_eq!(annotated.trail().len(), 2);
/// ```
#[track_caller]
pub fn annotate<E>(error: Option<E>) -> Option<TrailError>
where
    E: core::error::Error + 'static,
{
    let location = Location::caller();
    let error = error?;
    Some(TrailError::resolve_at(&error, location).annotate_at(location, Vec::new()))
}

/// Like [`annotate()`], attaching `context` to the new entry.
#[track_caller]
pub fn annotate_with<E, I>(error: Option<E>, context: I) -> Option<TrailError>
where
    E: core::error::Error + 'static,
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let location = Location::caller();
    let error = error?;
    Some(TrailError::resolve_at(&error, location).annotate_at(location, collect_context(context)))
}

/// Resolves a possibly absent error into a [`TrailError`].
///
/// See [`TrailError::from_dyn`].
#[track_caller]
pub fn parse_error(error: Option<&(dyn core::error::Error + 'static)>) -> Option<TrailError> {
    let location = Location::caller();
    error.map(|error| TrailError::resolve_at(error, location))
}

impl fmt::Display for TrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = if f.alternate() {
            self.to_json_pretty()
        } else {
            self.to_json()
        };
        match encoded {
            Ok(text) => f.write_str(&text),
            Err(_) => fmt::Debug::fmt(self, f),
        }
    }
}

impl fmt::Debug for TrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrailError")
            .field("code", &self.code())
            .field("trail", self.trail())
            .finish()
    }
}

impl core::error::Error for TrailError {}

impl PartialEq for TrailError {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_instance(other) || self.code() == other.code()
    }
}

impl Eq for TrailError {}

impl hash::Hash for TrailError {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;

    #[test]
    fn test_trail_error_send_sync() {
        static_assertions::assert_impl_all!(TrailError: Send, Sync, Clone, core::error::Error);
        static_assertions::assert_not_impl_any!(TrailError: Copy);
    }

    #[test]
    fn test_new_records_init_marker() {
        let error = TrailError::new("code");
        let first = error.trail().first();
        assert_eq!(first.context(), &[Value::from(INIT_MARKER)]);
        assert!(first.site().as_str().contains(file!()));
    }

    #[test]
    fn test_empty_context_records_init_marker() {
        let error = TrailError::with_context("code", Vec::<Value>::new());
        assert_eq!(error.trail().first().context(), &[Value::from(INIT_MARKER)]);

        let error = TrailError::with_context("code", [1, 2]);
        assert_eq!(
            error.trail().first().context(),
            &[Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_annotation_keeps_code_and_grows_trail() {
        let base = TrailError::new("code");
        let once = base.annotate_with(["reason"]);
        let twice = once.annotate();

        assert_eq!(twice.code(), "code");
        assert_eq!(base.trail().len(), 1);
        assert_eq!(once.trail().len(), 2);
        assert_eq!(twice.trail().len(), 3);
        assert_eq!(once.trail().last().context(), &[Value::from("reason")]);
        assert!(twice.trail().last().context().is_empty());
        assert!(twice.trail().extends(base.trail()));
    }

    #[test]
    fn test_annotation_records_direct_caller() {
        let base = TrailError::new("code");
        let line = line!() + 1;
        let annotated = base.annotate();
        let site = annotated.trail().last().site().to_string();
        assert!(site.contains(&alloc::format!("{}:{}", file!(), line)), "{site}");
    }

    #[test]
    fn test_clone_is_same_instance() {
        let error = TrailError::new("code");
        let clone = error.clone();
        assert!(error.is_same_instance(&clone));
        assert!(!error.is_same_instance(&TrailError::new("code")));
        assert_eq!(error, TrailError::new("code"));
        assert_ne!(error, TrailError::new("other"));
    }

    #[test]
    fn test_debug_output() {
        let error = TrailError::with_context("code", vec![Value::Bool(true)]);
        let debug = alloc::format!("{error:?}");
        assert!(debug.starts_with(r#"TrailError { code: "code", trail: ["#));
    }
}
