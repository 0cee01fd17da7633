use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::kind::KindEntry;

const ERR_ITEM_TAKEN: &str =
    "the item is only taken out by into_inner() or drop(), both of which consume the guard";

/// An acquired item that is released back to its kind when the guard is dropped.
///
/// Returned by [`Recycler::acquire_recycled()`][crate::Recycler::acquire_recycled] and
/// [`Registry::acquire_recycled()`][crate::Registry::acquire_recycled]. Dropping the guard has the
/// same effect as passing the item to `release()`: the destructor runs and the cleared item is
/// queued for reuse or dropped if the idle queue is full.
///
/// Use [`into_inner()`][Self::into_inner] to take the item out without releasing it.
///
/// # Example
///
/// ```rust
/// use recycler::Registry;
///
/// let registry = Registry::new();
/// registry.register(
///     2,
///     String::new,
///     |s: &mut String, text: &'static str| s.push_str(text),
///     String::clear,
/// );
///
/// {
///     let mut s = registry.acquire_recycled::<String, _>("abc");
///     s.push('d');
///     assert_eq!(*s, "abcd");
/// }
///
/// assert_eq!(registry.idle_len::<String>().unwrap(), 1);
/// ```
pub struct Recycled<T: Send + 'static> {
    item: Option<T>,
    kind: Arc<KindEntry<T>>,
}

impl<T: Send + 'static> Recycled<T> {
    pub(crate) fn new(item: T, kind: Arc<KindEntry<T>>) -> Self {
        Self {
            item: Some(item),
            kind,
        }
    }

    /// Detaches the item from the guard without releasing it.
    ///
    /// The caller becomes responsible for releasing the item, or may simply drop it.
    #[must_use]
    pub fn into_inner(mut self) -> T {
        self.item.take().expect(ERR_ITEM_TAKEN)
    }
}

impl<T: Send + 'static> Deref for Recycled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect(ERR_ITEM_TAKEN)
    }
}

impl<T: Send + 'static> DerefMut for Recycled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect(ERR_ITEM_TAKEN)
    }
}

impl<T: Send + 'static> Drop for Recycled<T> {
    fn drop(&mut self) {
        // Already detached if into_inner() was called.
        if let Some(item) = self.item.take() {
            self.kind.recycle(item);
        }
    }
}

impl<T: Send + fmt::Debug + 'static> fmt::Debug for Recycled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("item", &self.item)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use static_assertions::assert_impl_all;

    use crate::Registry;

    use super::*;

    assert_impl_all!(Recycled<Vec<u8>>: Send, Sync, Debug);

    fn registry_with_counted_clears(clears: &Arc<AtomicUsize>) -> Registry {
        let registry = Registry::new();
        let clears = Arc::clone(clears);

        registry.register(
            2,
            Vec::new,
            |v: &mut Vec<u8>, value: u8| v.push(value),
            move |v: &mut Vec<u8>| {
                clears.fetch_add(1, Ordering::Relaxed);
                v.clear();
            },
        );

        registry
    }

    #[test]
    fn drop_releases_item() {
        let clears = Arc::new(AtomicUsize::new(0));
        let registry = registry_with_counted_clears(&clears);

        let guard = registry.acquire_recycled::<Vec<u8>, u8>(1);
        assert_eq!(*guard, [1]);
        assert_eq!(clears.load(Ordering::Relaxed), 0);

        drop(guard);

        assert_eq!(clears.load(Ordering::Relaxed), 1);
        assert_eq!(registry.idle_len::<Vec<u8>>().unwrap(), 1);
    }

    #[test]
    fn into_inner_detaches_item() {
        let clears = Arc::new(AtomicUsize::new(0));
        let registry = registry_with_counted_clears(&clears);

        let guard = registry.acquire_recycled::<Vec<u8>, u8>(4);
        let item = guard.into_inner();

        assert_eq!(item, [4]);
        assert_eq!(clears.load(Ordering::Relaxed), 0);
        assert_eq!(registry.idle_len::<Vec<u8>>().unwrap(), 0);
    }

    #[test]
    fn deref_mut_modifies_item() {
        let clears = Arc::new(AtomicUsize::new(0));
        let registry = registry_with_counted_clears(&clears);

        let mut guard = registry.acquire_recycled::<Vec<u8>, u8>(1);
        guard.push(2);

        assert_eq!(*guard, [1, 2]);
    }

    #[test]
    fn debug_output_shows_item() {
        let clears = Arc::new(AtomicUsize::new(0));
        let registry = registry_with_counted_clears(&clears);

        let guard = registry.acquire_recycled::<Vec<u8>, u8>(3);

        assert!(format!("{guard:?}").contains("[3]"));
    }
}
