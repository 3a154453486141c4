//! The append-only sequence of entries behind every [`TrailError`].
//!
//! A [`Trail`] is a persistent list: appending links a new node in front of
//! the existing ones and returns a new handle, while the nodes already in place
//! are never written to again. Records annotated from the same original share
//! its prefix, and any number of threads can extend the same trail at once
//! without coordination.
//!
//! [`TrailError`]: crate::TrailError

use core::{fmt, iter::FusedIterator};

use smallvec::SmallVec;
use triomphe::Arc;

use crate::entry::Entry;

struct Link {
    entry: Entry,
    prev: Option<Arc<Link>>,
}

impl Drop for Link {
    fn drop(&mut self) {
        // Unlink iteratively so that long trails don't recurse on drop.
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Arc::try_unwrap(link) {
                Ok(mut link) => prev = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// An ordered, append-only, never-empty sequence of [`Entry`] values.
///
/// Index 0 is the entry recorded when the error was created; later indices
/// follow in the order the annotations happened.
///
/// [`first`](Trail::first), [`last`](Trail::last) and [`len`](Trail::len)
/// are constant time. Iterating a trail of up to [`INLINE_ENTRIES`] entries
/// does not allocate.
#[derive(Clone)]
pub struct Trail {
    head: Arc<Link>,
    root: Arc<Link>,
    len: usize,
}

/// Number of entries a [`Trail`] iterator holds without allocating.
pub const INLINE_ENTRIES: usize = 16;

#[allow(
    clippy::len_without_is_empty,
    reason = "a trail always holds at least one entry"
)]
impl Trail {
    pub(crate) fn new(entry: Entry) -> Self {
        let head = Arc::new(Link { entry, prev: None });
        Self {
            root: head.clone(),
            head,
            len: 1,
        }
    }

    /// Builds a trail from entries in creation order. Returns `None` if there
    /// are none.
    pub(crate) fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Option<Self> {
        let mut entries = entries.into_iter();
        let mut trail = Self::new(entries.next()?);
        for entry in entries {
            trail = trail.pushed(entry);
        }
        Some(trail)
    }

    /// Returns a new trail with `entry` appended, leaving `self` untouched.
    #[must_use]
    pub(crate) fn pushed(&self, entry: Entry) -> Self {
        Self {
            head: Arc::new(Link {
                entry,
                prev: Some(self.head.clone()),
            }),
            root: self.root.clone(),
            len: self.len + 1,
        }
    }

    /// The number of entries. Always at least 1.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The entry recorded when the error was created.
    pub fn first(&self) -> &Entry {
        &self.root.entry
    }

    /// The most recently recorded entry.
    pub fn last(&self) -> &Entry {
        &self.head.entry
    }

    /// The entry at `index`, counting from the creation entry.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        if index >= self.len {
            return None;
        }
        let steps_back = self.len - 1 - index;
        let mut link = &*self.head;
        for _ in 0..steps_back {
            link = link.prev.as_deref()?;
        }
        Some(&link.entry)
    }

    /// Iterates over the entries in creation order.
    pub fn iter(&self) -> Iter<'_> {
        let mut entries: SmallVec<[&Entry; INLINE_ENTRIES]> = SmallVec::with_capacity(self.len);
        let mut link = Some(&*self.head);
        while let Some(current) = link {
            entries.push(&current.entry);
            link = current.prev.as_deref();
        }
        entries.reverse();
        Iter {
            entries: entries.into_iter(),
        }
    }

    /// Returns `true` if `self` is `other` extended by zero or more entries,
    /// sharing `other`'s storage.
    pub fn extends(&self, other: &Trail) -> bool {
        let Some(steps_back) = self.len.checked_sub(other.len) else {
            return false;
        };
        let mut link = &self.head;
        for _ in 0..steps_back {
            match &link.prev {
                Some(prev) => link = prev,
                None => return false,
            }
        }
        Arc::ptr_eq(link, &other.head)
    }
}

impl PartialEq for Trail {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        // Walk both lists from the newest entry; a shared link means the
        // remaining prefix is shared too.
        let mut left = Some(&self.head);
        let mut right = Some(&other.head);
        while let (Some(l), Some(r)) = (left, right) {
            if Arc::ptr_eq(l, r) {
                return true;
            }
            if l.entry != r.entry {
                return false;
            }
            left = l.prev.as_ref();
            right = r.prev.as_ref();
        }
        true
    }
}

impl fmt::Debug for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Trail {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`Trail`] in creation order.
#[must_use]
pub struct Iter<'a> {
    entries: smallvec::IntoIter<[&'a Entry; INLINE_ENTRIES]>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use alloc::{format, vec, vec::Vec};

    use super::*;
    use crate::{Value, callsite::CallSite};

    fn entry(n: i64) -> Entry {
        Entry::new(CallSite::new(format!("site-{n}")), vec![Value::Int(n)])
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let base = Trail::new(entry(0));
        let left = base.pushed(entry(1));
        let right = base.pushed(entry(2));

        assert_eq!(base.len(), 1);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert_eq!(left.last(), &entry(1));
        assert_eq!(right.last(), &entry(2));
        assert!(left.extends(&base));
        assert!(right.extends(&base));
        assert!(!left.extends(&right));
    }

    #[test]
    fn test_indexing_and_iteration() {
        let trail = Trail::from_entries((0..4).map(entry)).unwrap();
        assert_eq!(trail.first(), &entry(0));
        assert_eq!(trail.get(2), Some(&entry(2)));
        assert_eq!(trail.get(4), None);
        assert_eq!(trail.iter().len(), 4);
        let sites: Vec<&str> = trail.iter().rev().map(|e| e.site().as_str()).collect();
        assert_eq!(sites, ["site-3", "site-2", "site-1", "site-0"]);
    }

    #[test]
    fn test_first_is_shared_root() {
        let base = Trail::new(entry(0));
        let extended = (1..50).fold(base.clone(), |trail, n| trail.pushed(entry(n)));
        assert!(core::ptr::eq(extended.first(), base.first()));
        assert_eq!(extended.first(), &entry(0));
        assert_eq!(extended.last(), &entry(49));
    }

    #[test]
    fn test_iteration_across_inline_capacity() {
        let edge = INLINE_ENTRIES as i64;
        for len in [edge - 1, edge, edge + 1, 3 * edge] {
            let trail = Trail::from_entries((0..len).map(entry)).unwrap();
            assert_eq!(trail.iter().len(), trail.len());
            assert!(trail.iter().zip(0..).all(|(e, n)| e == &entry(n)));
            assert_eq!(trail.iter().next_back(), Some(trail.last()));
        }
    }

    #[test]
    fn test_equality_of_shared_and_decoded_trails() {
        let base = Trail::from_entries((0..3).map(entry)).unwrap();
        let shared = base.pushed(entry(3));
        let rebuilt = Trail::from_entries((0..4).map(entry)).unwrap();
        assert_eq!(shared, rebuilt);
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, base.pushed(entry(4)));
        assert_ne!(shared, base);
    }

    #[test]
    fn test_from_no_entries() {
        assert!(Trail::from_entries(core::iter::empty()).is_none());
    }

    #[test]
    fn test_long_trail_drops() {
        let mut trail = Trail::new(entry(0));
        for n in 1..100_000 {
            trail = trail.pushed(entry(n));
        }
        assert_eq!(trail.len(), 100_000);
        drop(trail);
    }

    #[test]
    fn test_trail_send_sync() {
        static_assertions::assert_impl_all!(Trail: Send, Sync, Clone);
        static_assertions::assert_not_impl_any!(Trail: Copy);
    }
}
