#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! A call-site provider for `errtrail` that names the enclosing function.
//!
//! By default `errtrail` describes a call site as `file:line:column`. The
//! [`FunctionNameProvider`] in this crate walks the stack when an entry is
//! recorded, finds the frame of the caller and renders
//! `file:line#function` instead:
//!
//! ```text
//! ["user not found",["handlers.rs:42#handlers::load_user","[init]"]]
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use errtrail::callsite::install_provider;
//! use errtrail_backtrace::FunctionNameProvider;
//!
//! install_provider(FunctionNameProvider::new_from_env())
//!     .expect("failed to install call-site provider");
//! ```
//!
//! # Cost
//!
//! Every creation and annotation captures and symbolizes a stack trace,
//! which is orders of magnitude slower than the default provider. Function
//! names also require debug info; without it the provider falls back to
//! `file:line`.
//!
//! # Environment Variables
//!
//! - `RUST_BACKTRACE=full` - Implies `full_paths`
//! - `ERRTRAIL_BACKTRACE` - Comma-separated options:
//!   - `full_paths` - Keep the full source path instead of the file name
//!   - `full_names` - Keep the full function path instead of its last two
//!     segments

use std::{panic::Location, sync::OnceLock};

use errtrail::callsite::{CallSiteProvider, LocationProvider, PathStyle};

/// A [`CallSiteProvider`] rendering `file:line#function`.
///
/// # Examples
///
/// ```rust
/// use errtrail_backtrace::FunctionNameProvider;
///
/// let provider = FunctionNameProvider {
///     show_full_path: true,
///     show_full_name: false,
/// };
/// errtrail::callsite::replace_provider(provider);
///
/// let error = errtrail::TrailError::new("boom");
/// assert!(error.trail().first().site().as_str().contains(file!()));
/// # errtrail::callsite::reset_provider();
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FunctionNameProvider {
    /// Whether to keep the full source path instead of only the file name.
    pub show_full_path: bool,
    /// Whether to keep the full path of the function instead of its last two
    /// segments.
    pub show_full_name: bool,
}

impl FunctionNameProvider {
    /// File name and shortened function name.
    pub const DEFAULT: Self = Self {
        show_full_path: false,
        show_full_name: false,
    };

    /// Creates a provider configured from the environment.
    ///
    /// The environment is read once per process. See the
    /// [crate documentation](crate) for the variables.
    pub fn new_from_env() -> Self {
        let env_options = EnvOptions::get();
        Self {
            show_full_path: env_options.show_full_path,
            show_full_name: env_options.show_full_name,
        }
    }

    fn location_provider(&self) -> LocationProvider {
        LocationProvider {
            path_style: if self.show_full_path {
                PathStyle::Full
            } else {
                PathStyle::FileName
            },
            column: false,
        }
    }
}

impl Default for FunctionNameProvider {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CallSiteProvider for FunctionNameProvider {
    fn describe(&self, location: &'static Location<'static>) -> Option<String> {
        let position = self.location_provider().describe(location)?;
        let Some(symbol) = find_function(location) else {
            return Some(position);
        };
        let function = strip_closures(&symbol);
        let function = if self.show_full_name {
            function
        } else {
            short_function_name(function)
        };
        Some(format!("{position}#{function}"))
    }
}

#[derive(Debug)]
struct EnvOptions {
    show_full_path: bool,
    show_full_name: bool,
}

impl EnvOptions {
    fn get() -> &'static Self {
        static ERRTRAIL_FLAGS: OnceLock<EnvOptions> = OnceLock::new();

        ERRTRAIL_FLAGS.get_or_init(|| {
            let rust_backtrace_full =
                std::env::var_os("RUST_BACKTRACE").is_some_and(|var| var == "full");
            let mut options = EnvOptions {
                show_full_path: rust_backtrace_full,
                show_full_name: false,
            };
            if let Some(var) = std::env::var_os("ERRTRAIL_BACKTRACE") {
                options.apply(&var.to_string_lossy());
            }
            options
        })
    }

    fn apply(&mut self, var: &str) {
        for v in var.split(',').map(str::trim) {
            if v.eq_ignore_ascii_case("full_paths") {
                self.show_full_path = true;
            } else if v.eq_ignore_ascii_case("full_names") {
                self.show_full_name = true;
            }
        }
    }
}

/// Demangled name of the function containing `location`, if a frame on the
/// current stack resolves to it.
fn find_function(location: &'static Location<'static>) -> Option<String> {
    let mut found = None;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let (Some(name), Some(filename), Some(lineno)) =
                (symbol.name(), symbol.filename(), symbol.lineno())
            else {
                return;
            };
            if lineno == location.line() && filename.ends_with(location.file()) {
                found = Some(format!("{name:#}"));
            }
        });
        found.is_none()
    });
    found
}

/// Removes the trailing closure and async block segments of a symbol.
fn strip_closures(symbol: &str) -> &str {
    static CLOSURE_SUFFIX: OnceLock<Option<regex::Regex>> = OnceLock::new();
    // Matches both the legacy `{{closure}}` and the v0 `{closure#0}` forms.
    let regex = CLOSURE_SUFFIX.get_or_init(|| {
        regex::Regex::new(r"(?:::\{\{closure\}\}|::\{closure#[0-9]+\})+$").ok()
    });
    match regex.as_ref().and_then(|regex| regex.find(symbol)) {
        Some(suffix) => &symbol[..suffix.start()],
        None => symbol,
    }
}

/// The last two top-level path segments of a function name.
///
/// Generic arguments and `<T as Trait>` qualifiers count as part of the
/// segment they belong to.
fn short_function_name(s: &str) -> &str {
    let mut segment_starts = [0usize; 2];
    let mut angle_nesting_level = 0u64;
    let mut curly_nesting_level = 0u64;
    let mut potential_function_arrow = false;
    let mut inside_word = false;
    let mut previous = None;

    for (i, c) in s.char_indices() {
        let top_level = curly_nesting_level == 0 && angle_nesting_level == 0;
        let starts_segment = top_level
            && !inside_word
            && (unicode_ident::is_xid_start(c) || c == '<' || c == '{')
            && matches!(previous, None | Some(':'));
        if starts_segment {
            segment_starts = [segment_starts[1], i];
        }
        if top_level {
            inside_word = unicode_ident::is_xid_continue(c);
        }

        let was_potential_function_arrow = potential_function_arrow;
        potential_function_arrow = c == '-';

        if c == '<' {
            angle_nesting_level = angle_nesting_level.saturating_add(1);
        } else if c == '>' && !was_potential_function_arrow {
            angle_nesting_level = angle_nesting_level.saturating_sub(1);
        } else if c == '{' {
            curly_nesting_level = curly_nesting_level.saturating_add(1);
        } else if c == '}' {
            curly_nesting_level = curly_nesting_level.saturating_sub(1);
        }
        previous = Some(c);
    }

    &s[segment_starts[0]..]
}
