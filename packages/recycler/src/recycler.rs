use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::kind::{Initializer, KindEntry};
use crate::{Recycled, Result};

/// A typed handle to one registered kind.
///
/// Obtained from [`Registry::recycler()`][crate::Registry::recycler]. Operations on the handle
/// behave exactly like the corresponding [`Registry`][crate::Registry] operations but skip the
/// lookup of the kind, which makes the handle the preferred way to recycle items on hot paths.
///
/// Clones of the handle share the same idle queue and hooks.
///
/// # Thread safety
///
/// The handle is thread-safe. Any number of threads may acquire and release items concurrently.
/// Neither operation ever waits for another thread.
///
/// # Example
///
/// ```rust
/// use recycler::Registry;
///
/// let registry = Registry::new();
///
/// registry.register(
///     8,
///     String::new,
///     |s: &mut String, greeting: &'static str| s.push_str(greeting),
///     String::clear,
/// );
///
/// let strings = registry.recycler::<String, &'static str>().unwrap();
///
/// let s = strings.acquire("hello");
/// assert_eq!(s, "hello");
///
/// strings.release(s);
/// assert_eq!(strings.idle_len(), 1);
/// ```
pub struct Recycler<T, P> {
    kind: Arc<KindEntry<T>>,
    initializer: Arc<Initializer<T, P>>,

    _params: PhantomData<fn(P)>,
}

impl<T: Send + 'static, P: 'static> Recycler<T, P> {
    pub(crate) fn new(kind: Arc<KindEntry<T>>) -> Result<Self> {
        let initializer = kind.initializer::<P>()?;

        Ok(Self {
            kind,
            initializer,
            _params: PhantomData,
        })
    }

    /// Returns an initialized item, reusing an idle one if available.
    ///
    /// If no idle item can be taken right away, a new one is created. Either way the initializer
    /// is applied with `params` before the item is returned.
    #[must_use]
    pub fn acquire(&self, params: P) -> T {
        let mut item = self.kind.take();
        self.initializer.apply(&mut item, params);
        item
    }

    /// Returns an initialized item wrapped in a guard that releases it when dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycler::Registry;
    ///
    /// let registry = Registry::new();
    /// registry.register(1, Vec::new, |v: &mut Vec<u32>, (): ()| v.push(7), Vec::clear);
    ///
    /// let vectors = registry.recycler::<Vec<u32>, ()>().unwrap();
    ///
    /// {
    ///     let v = vectors.acquire_recycled(());
    ///     assert_eq!(*v, [7]);
    /// }
    ///
    /// assert_eq!(vectors.idle_len(), 1);
    /// ```
    #[must_use]
    pub fn acquire_recycled(&self, params: P) -> Recycled<T> {
        Recycled::new(self.acquire(params), Arc::clone(&self.kind))
    }

    /// Clears the item with the destructor and keeps it for reuse if the idle queue has room.
    ///
    /// If the idle queue is full, the cleared item is dropped.
    pub fn release(&self, item: T) {
        self.kind.recycle(item);
    }

    /// Maximum number of idle items the kind retains.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.kind.capacity()
    }

    /// Number of idle items waiting for reuse.
    ///
    /// Under concurrent use this is only a snapshot.
    #[must_use]
    pub fn idle_len(&self) -> usize {
        self.kind.idle_len()
    }

    /// Name of the item type that identifies the kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

impl<T, P> Clone for Recycler<T, P> {
    fn clone(&self) -> Self {
        Self {
            kind: Arc::clone(&self.kind),
            initializer: Arc::clone(&self.initializer),
            _params: PhantomData,
        }
    }
}

impl<T: Send + 'static, P> fmt::Debug for Recycler<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
