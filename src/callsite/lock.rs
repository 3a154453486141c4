#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

use triomphe::Arc;

use super::CallSiteProvider;

type Slot = Option<Arc<dyn CallSiteProvider>>;

/// Global slot holding the installed [`CallSiteProvider`].
#[repr(transparent)]
pub(crate) struct ProviderLock(impl_::RwLock<Slot>);

#[repr(transparent)]
pub(crate) struct ProviderReadGuard(impl_::RwLockReadGuard<'static, Slot>);

#[repr(transparent)]
pub(crate) struct ProviderWriteGuard(impl_::RwLockWriteGuard<'static, Slot>);

impl ProviderLock {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::RwLock::new(None))
    }

    #[inline]
    pub(crate) fn read(&'static self) -> ProviderReadGuard {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // A provider that panicked mid-write leaves a usable slot behind.
        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(impl_::PoisonError::into_inner);

        ProviderReadGuard(guard)
    }

    #[inline]
    pub(crate) fn write(&'static self) -> ProviderWriteGuard {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().unwrap_or_else(impl_::PoisonError::into_inner);

        ProviderWriteGuard(guard)
    }
}

impl ProviderReadGuard {
    #[inline]
    pub(crate) fn get(&self) -> Option<&Arc<dyn CallSiteProvider>> {
        self.0.as_ref()
    }
}

impl ProviderWriteGuard {
    #[inline]
    pub(crate) fn get(&mut self) -> &mut Slot {
        &mut self.0
    }
}
