/// Creates a [`TrailError`](crate::TrailError) at the macro call site.
///
/// The first argument is the code, anything convertible into a `String`. Any
/// further arguments are context values for the creation entry; each is
/// converted with [`Value::from`](crate::Value), so they may have different
/// types. Without context the creation entry records `"[init]"`, as with
/// [`TrailError::new`](crate::TrailError::new).
///
/// # Examples
///
/// ```
/// use errtrail::{Value, trail};
///
/// let error = trail!("user not found");
/// assert_eq!(error.trail().first().context(), &[Value::from("[init]")]);
///
/// let error = trail!("user not found", "alice", 42, true);
/// assert_eq!(
///     error.trail().first().context(),
///     &[Value::from("alice"), Value::Int(42), Value::Bool(true)]
/// );
/// ```
#[macro_export]
macro_rules! trail {
    ($code:expr $(,)?) => {
        $crate::TrailError::new($code)
    };
    ($code:expr, $($context:expr),+ $(,)?) => {
        $crate::TrailError::with_context(
            $code,
            [$($crate::Value::from($context)),+],
        )
    };
}

/// Annotates an error at the macro call site.
///
/// The first argument is anything implementing
/// [`IntoTrailError`](crate::IntoTrailError): a `TrailError`, a reference to
/// any error, or a boxed error. Any further arguments are context values of
/// possibly different types.
///
/// # Examples
///
/// ```
/// use errtrail::{TrailError, Value, annotate};
///
/// let base = TrailError::new("timeout");
/// let annotated = annotate!(base.clone(), "db", 3);
/// assert_eq!(annotated.code(), "timeout");
/// assert_eq!(
///     annotated.trail().last().context(),
///     &[Value::from("db"), Value::Int(3)]
/// );
///
/// let io = std::io::Error::other("disk full");
/// let annotated = annotate!(&io);
/// assert_eq!(annotated.code(), "disk full");
/// ```
#[macro_export]
macro_rules! annotate {
    ($error:expr $(,)?) => {
        $crate::__private::annotate(
            $crate::IntoTrailError::into_trail_error($error),
            [],
        )
    };
    ($error:expr, $($context:expr),+ $(,)?) => {
        $crate::__private::annotate(
            $crate::IntoTrailError::into_trail_error($error),
            [$($crate::Value::from($context)),+],
        )
    };
}

/// Returns early with a new [`TrailError`](crate::TrailError).
///
/// Takes the same arguments as [`trail!`] and expands to
/// `return Err(trail!(...).into())`.
///
/// # Examples
///
/// ```
/// use errtrail::{TrailError, bail};
///
/// fn withdraw(balance: u64, amount: u64) -> Result<u64, TrailError> {
///     if amount > balance {
///         bail!("insufficient funds", balance, amount);
///     }
///     Ok(balance - amount)
/// }
///
/// assert_eq!(withdraw(10, 20).unwrap_err().code(), "insufficient funds");
/// ```
#[macro_export]
macro_rules! bail {
    ($($args:tt)*) => {
        return $crate::__private::Err($crate::trail!($($args)*).into())
    };
}
