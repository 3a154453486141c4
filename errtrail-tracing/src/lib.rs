#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing integration for `errtrail`.
//!
//! An error should either be annotated and returned to the caller, or
//! logged. This crate covers the second half, and lets trails record which
//! tracing span was active when they were annotated.
//!
//! # Logging handled errors
//!
//! [`LogExt`] turns a `Result` into an `Option`, annotating and logging the
//! error on the way:
//!
//! ```
//! use errtrail::TrailError;
//! use errtrail_tracing::LogExt;
//!
//! fn refresh_cache() -> Result<(), TrailError> {
//!     Err(TrailError::new("cache backend unavailable"))
//! }
//!
//! // Logs at ERROR level with `code` and `trail` fields.
//! assert!(refresh_cache().log_err().is_none());
//! ```
//!
//! # Span annotations
//!
//! Add [`TrailLayer`] to your subscriber so that span field values are
//! captured, then use [`SpanExt::annotate_span`]:
//!
//! ```
//! use errtrail::TrailError;
//! use errtrail_tracing::{SpanExt, TrailLayer};
//! use tracing_subscriber::{Registry, layer::SubscriberExt};
//!
//! let subscriber = Registry::default()
//!     .with(TrailLayer) // Captures span field values
//!     .with(tracing_subscriber::fmt::layer()); // Your normal console output
//! tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
//!
//! #[tracing::instrument(fields(user_id = 42))]
//! fn load_user() -> Result<(), TrailError> {
//!     Err(TrailError::new("user not found")).annotate_span()
//! }
//!
//! let error = load_user().unwrap_err();
//! assert_eq!(
//!     error.trail().last().context()[0].as_str(),
//!     Some("load_user{user_id=42}")
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `ERRTRAIL_TRACING` - Comma-separated options:
//!   - `names_only` - Record span names without their field values

use std::{
    fmt::{self, Write},
    sync::OnceLock,
};

use errtrail::TrailError;
use tracing::{
    Level, Span,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Registry, layer::Context, registry::LookupSpan};

/// Field values captured for a span by [`TrailLayer`].
#[derive(Clone, Default)]
struct CapturedFields(String);

struct FieldVisitor<'a> {
    output: &'a mut String,
}

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if !self.output.is_empty() {
            self.output.push(' ');
        }
        let _ = write!(self.output, "{}={:?}", field.name(), value);
    }
}

/// A tracing layer that captures span field values for
/// [`SpanExt::annotate_span`].
///
/// Without it, annotations list the span names with their field names only.
///
/// # Examples
///
/// ```
/// use errtrail_tracing::TrailLayer;
/// use tracing_subscriber::{Registry, layer::SubscriberExt};
///
/// let subscriber = Registry::default()
///     .with(TrailLayer)
///     .with(tracing_subscriber::fmt::layer());
///
/// tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct TrailLayer;

impl<S> tracing_subscriber::Layer<S> for TrailLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut buf = String::new();
        attrs.record(&mut FieldVisitor { output: &mut buf });
        span.extensions_mut().insert(CapturedFields(buf));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<CapturedFields>() {
            Some(fields) => values.record(&mut FieldVisitor {
                output: &mut fields.0,
            }),
            None => {
                let mut buf = String::new();
                values.record(&mut FieldVisitor { output: &mut buf });
                extensions.insert(CapturedFields(buf));
            }
        }
    }
}

#[derive(Debug)]
struct TracingEnvOptions {
    names_only: bool,
}

impl TracingEnvOptions {
    fn get() -> &'static Self {
        static ERRTRAIL_TRACING_FLAGS: OnceLock<TracingEnvOptions> = OnceLock::new();

        ERRTRAIL_TRACING_FLAGS.get_or_init(|| {
            let mut names_only = false;

            if let Some(var) = std::env::var_os("ERRTRAIL_TRACING") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("names_only") {
                        names_only = true;
                    }
                }
            }

            TracingEnvOptions { names_only }
        })
    }
}

/// Renders the current span and its ancestors, outermost first.
///
/// Each span is written as `name{field=value ...}` and spans are joined with
/// `" > "`. Returns `None` when no span is active or the subscriber is not
/// built on a [`Registry`].
///
/// ```
/// use errtrail_tracing::{TrailLayer, current_span_path};
/// use tracing_subscriber::{Registry, layer::SubscriberExt};
///
/// let subscriber = Registry::default().with(TrailLayer);
/// tracing::subscriber::with_default(subscriber, || {
///     assert_eq!(current_span_path(), None);
///
///     let _outer = tracing::info_span!("request", id = 7).entered();
///     let _inner = tracing::info_span!("query").entered();
///     assert_eq!(current_span_path().as_deref(), Some("request{id=7} > query"));
/// });
/// ```
pub fn current_span_path() -> Option<String> {
    render_span(&Span::current(), TracingEnvOptions::get().names_only)
}

fn render_span(span: &Span, names_only: bool) -> Option<String> {
    span.with_subscriber(|(span_id, dispatch)| {
        let registry = dispatch.downcast_ref::<Registry>()?;
        let span_ref = registry.span(span_id)?;

        let mut out = String::new();
        for ancestor in span_ref.scope().from_root() {
            if !out.is_empty() {
                out.push_str(" > ");
            }
            out.push_str(ancestor.name());
            if names_only {
                continue;
            }

            let extensions = ancestor.extensions();
            if let Some(fields) = extensions.get::<CapturedFields>() {
                if !fields.0.is_empty() {
                    let _ = write!(out, "{{{}}}", fields.0);
                }
            } else {
                let fields = ancestor.metadata().fields();
                if !fields.is_empty() {
                    let names: Vec<&str> = fields.iter().map(|field| field.name()).collect();
                    let _ = write!(out, "{{{}}}", names.join(" "));
                }
            }
        }
        Some(out)
    })
    .flatten()
}

/// Extension trait for annotating errors with the current tracing span.
pub trait SpanExt: Sized {
    /// Annotates at the caller, with the rendering of
    /// [`current_span_path`] as context.
    ///
    /// Outside of any span the entry is recorded without context.
    #[track_caller]
    #[must_use]
    fn annotate_span(self) -> Self;
}

impl SpanExt for TrailError {
    #[track_caller]
    fn annotate_span(self) -> Self {
        self.annotate_with(current_span_path())
    }
}

impl<T> SpanExt for Result<T, TrailError> {
    #[track_caller]
    fn annotate_span(self) -> Self {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(error.annotate_span()),
        }
    }
}

/// Emits a tracing event for `error` at `level`.
///
/// The event carries the error code in the `code` field and the encoded
/// error in the `trail` field.
pub fn log_trail(error: &TrailError, level: Level) {
    let code = error.code();
    if level == Level::ERROR {
        tracing::error!(code, trail = %error, "error handled");
    } else if level == Level::WARN {
        tracing::warn!(code, trail = %error, "error handled");
    } else if level == Level::INFO {
        tracing::info!(code, trail = %error, "error handled");
    } else if level == Level::DEBUG {
        tracing::debug!(code, trail = %error, "error handled");
    } else {
        tracing::trace!(code, trail = %error, "error handled");
    }
}

/// Extension trait for logging errors that are handled instead of returned.
///
/// Each method annotates the error at the caller, logs it with
/// [`log_trail`] and returns the success value, if any.
pub trait LogExt<T> {
    /// Logs the error at [`Level::ERROR`].
    #[track_caller]
    fn log_err(self) -> Option<T>;

    /// Logs the error at [`Level::WARN`].
    #[track_caller]
    fn log_warn(self) -> Option<T>;

    /// Logs the error at `level`.
    #[track_caller]
    fn log_at(self, level: Level) -> Option<T>;
}

impl<T, E> LogExt<T> for Result<T, E>
where
    E: core::error::Error + 'static,
{
    #[track_caller]
    fn log_err(self) -> Option<T> {
        self.log_at(Level::ERROR)
    }

    #[track_caller]
    fn log_warn(self) -> Option<T> {
        self.log_at(Level::WARN)
    }

    #[track_caller]
    fn log_at(self, level: Level) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let error = TrailError::from_dyn(&error).annotate();
                log_trail(&error, level);
                None
            }
        }
    }
}
