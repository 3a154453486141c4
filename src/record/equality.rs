use core::error::Error;

use super::{TrailError, codec::resolved_code};

/// Compares two possibly absent errors.
///
/// The comparison stops at the first rule that applies:
///
/// 1. The same instance (or two handles of the same [`TrailError`]) is equal.
/// 2. If only one side is absent, they differ. Two absent errors are equal.
/// 3. If either side's [`source`](Error::source) chain contains the other
///    side, or a [`TrailError`] with the other side's code, they are equal.
/// 4. Otherwise both sides are resolved as by [`TrailError::from_dyn`] and
///    their codes are compared.
///
/// Trails are not compared: errors with the same code are equal however they
/// got there.
///
/// ```
/// use errtrail::TrailError;
///
/// let created = TrailError::new("timeout");
/// let annotated = TrailError::new("timeout").annotate_with(["retrying"]);
/// let foreign = std::io::Error::other("timeout");
///
/// assert!(errtrail::equal(Some(&created), Some(&annotated)));
/// assert!(errtrail::equal(Some(&created), Some(&foreign)));
/// assert!(!errtrail::equal(Some(&created), None));
/// ```
pub fn equal(
    left: Option<&(dyn Error + 'static)>,
    right: Option<&(dyn Error + 'static)>,
) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => equal_errors(left, right),
        _ => false,
    }
}

impl TrailError {
    /// Compares `self` with any error. See [`equal`] for the rules.
    ///
    /// ```
    /// use errtrail::TrailError;
    ///
    /// let error = TrailError::new("X");
    /// assert!(error.equal(&TrailError::new("X")));
    /// assert!(!error.equal(&TrailError::new("Y")));
    /// ```
    pub fn equal(&self, other: &(dyn Error + 'static)) -> bool {
        equal_errors(self, other)
    }
}

fn equal_errors(left: &(dyn Error + 'static), right: &(dyn Error + 'static)) -> bool {
    if same_instance(left, right) {
        return true;
    }
    if chain_contains(left, right) || chain_contains(right, left) {
        return true;
    }
    resolved_code(left) == resolved_code(right)
}

fn same_instance(left: &(dyn Error + 'static), right: &(dyn Error + 'static)) -> bool {
    if core::ptr::addr_eq(left, right) {
        return true;
    }
    match (
        left.downcast_ref::<TrailError>(),
        right.downcast_ref::<TrailError>(),
    ) {
        (Some(left), Some(right)) => left.is_same_instance(right),
        _ => false,
    }
}

fn chain_contains(error: &(dyn Error + 'static), target: &(dyn Error + 'static)) -> bool {
    let target_record = target.downcast_ref::<TrailError>();
    core::iter::successors(error.source(), |&link| link.source()).any(|link| {
        if same_instance(link, target) {
            return true;
        }
        match (link.downcast_ref::<TrailError>(), target_record) {
            (Some(link), Some(target)) => link.code() == target.code(),
            _ => false,
        }
    })
}
