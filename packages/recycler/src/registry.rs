use std::any::{Any, TypeId, type_name};
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use foldhash::{HashMap, HashMapExt};
use parking_lot::RwLock;
use tracing::debug;

use crate::kind::{Initializer, KindEntry};
use crate::{Error, Recycled, Recycler, Result};

const ERR_ENTRY_TYPE: &str = "kind entries are keyed by the TypeId of their item type";

/// Kind entries, each an `Arc<KindEntry<T>>` keyed by `TypeId::of::<T>()`.
type KindMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// A registry of recyclable kinds, each with its lifecycle hooks and a bounded idle queue.
///
/// A kind is identified by the type of its items. Each kind is registered once with
/// three hooks:
///
/// * a **creator** that makes a brand-new item,
/// * an **initializer** that prepares an item for use, taking caller-supplied parameters of a
///   type chosen at registration,
/// * a **destructor** that clears an item (releases references, empties buffers) before it is
///   allowed to sit idle.
///
/// [`acquire()`][Self::acquire] takes an idle item or creates one and always applies the
/// initializer. [`release()`][Self::release] always applies the destructor and then keeps the item
/// if the idle queue has room, dropping it otherwise.
///
/// This type is a cheaply cloneable handle. Clones share the same kinds.
///
/// # Thread safety
///
/// The registry is thread-safe. Items are acquired and released without ever waiting for other
/// threads: if the idle queue is empty or momentarily contended, a new item is created, and if it
/// is full, the released item is dropped. The capacity of a kind is therefore an upper bound on
/// idle items, not a guarantee that the queue is used to its full extent under contention.
///
/// # Example
///
/// ```rust
/// use recycler::Registry;
///
/// let registry = Registry::new();
///
/// // Keep up to 16 idle buffers. The initializer fills a buffer to the requested length.
/// let registered = registry.register(
///     16,
///     Vec::new,
///     |buffer: &mut Vec<u8>, len: usize| buffer.resize(len, 0),
///     Vec::clear,
/// );
/// assert!(registered);
///
/// let buffer = registry.acquire::<Vec<u8>, usize>(1024);
/// assert_eq!(buffer.len(), 1024);
///
/// // The buffer is cleared and kept for the next caller.
/// registry.release(buffer);
/// assert_eq!(registry.idle_len::<Vec<u8>>().unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct Registry {
    kinds: Arc<RwLock<KindMap>>,
}

impl Registry {
    /// Creates a registry with no kinds registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers the kind of items of type `T`.
    ///
    /// Up to `capacity` cleared items are kept idle for reuse. A capacity of zero is allowed and
    /// means every acquired item is newly created and every released item is dropped after its
    /// destructor runs.
    ///
    /// Returns `false` and changes nothing if `T` is already registered, in which case the
    /// original hooks and capacity remain in effect. When several threads register the same
    /// kind at once, exactly one of them gets `true`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycler::Registry;
    ///
    /// let registry = Registry::new();
    ///
    /// assert!(registry.register(4, String::new, |_: &mut String, (): ()| {}, String::clear));
    /// assert!(!registry.register(99, String::new, |_: &mut String, (): ()| {}, String::clear));
    /// ```
    pub fn register<T, P, C, I, D>(
        &self,
        capacity: usize,
        creator: C,
        initializer: I,
        destructor: D,
    ) -> bool
    where
        T: Send + 'static,
        P: 'static,
        C: Fn() -> T + Send + Sync + 'static,
        I: Fn(&mut T, P) + Send + Sync + 'static,
        D: Fn(&mut T) + Send + Sync + 'static,
    {
        self.try_register(capacity, creator, initializer, destructor)
            .is_ok()
    }

    /// Registers the kind of items of type `T`, reporting a duplicate registration as an error.
    ///
    /// Identical to [`register()`][Self::register] apart from how the outcome is reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if `T` is already registered.
    pub fn try_register<T, P, C, I, D>(
        &self,
        capacity: usize,
        creator: C,
        initializer: I,
        destructor: D,
    ) -> Result<()>
    where
        T: Send + 'static,
        P: 'static,
        C: Fn() -> T + Send + Sync + 'static,
        I: Fn(&mut T, P) + Send + Sync + 'static,
        D: Fn(&mut T) + Send + Sync + 'static,
    {
        let kind = type_name::<T>();

        let mut kinds = self.kinds.write();

        match kinds.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => {
                debug!(kind, "ignoring duplicate registration");
                Err(Error::DuplicateRegistration { kind })
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(KindEntry::new(
                    capacity,
                    Box::new(creator),
                    Initializer::<T, P>::new(initializer),
                    Box::new(destructor),
                )));

                debug!(kind, capacity, "registered kind");
                Ok(())
            }
        }
    }

    /// Whether items of type `T` have been registered as a kind.
    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.kinds.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.read().len()
    }

    /// Whether no kinds have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.read().is_empty()
    }

    /// Returns a typed handle to the kind of `T`, initialized with parameters of type `P`.
    ///
    /// The handle skips the kind lookup on every operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if `T` is not registered and [`Error::ParamsMismatch`] if it
    /// was registered with an initializer that takes parameters of a type other than `P`.
    pub fn recycler<T: Send + 'static, P: 'static>(&self) -> Result<Recycler<T, P>> {
        Recycler::new(self.entry::<T>()?)
    }

    /// Returns an initialized item of type `T`, reusing an idle one if available.
    ///
    /// If no idle item can be taken right away, a new one is created. Either way the kind's
    /// initializer is applied with `params` before the item is returned.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or was registered with a different parameter type. Both
    /// are defects in the calling code. Use [`try_acquire()`][Self::try_acquire] to receive the
    /// error instead.
    #[must_use]
    pub fn acquire<T: Send + 'static, P: 'static>(&self, params: P) -> T {
        self.try_acquire(params)
            .unwrap_or_else(|error| panic!("cannot acquire item: {error}"))
    }

    /// Returns an initialized item of type `T`, reporting misuse of the kind as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if `T` is not registered and [`Error::ParamsMismatch`] if it
    /// was registered with an initializer that takes parameters of a type other than `P`.
    pub fn try_acquire<T: Send + 'static, P: 'static>(&self, params: P) -> Result<T> {
        Ok(self.recycler::<T, P>()?.acquire(params))
    }

    /// Returns an initialized item of type `T` in a guard that releases it when dropped.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`acquire()`][Self::acquire].
    #[must_use]
    pub fn acquire_recycled<T: Send + 'static, P: 'static>(&self, params: P) -> Recycled<T> {
        self.recycler::<T, P>()
            .map(|recycler| recycler.acquire_recycled(params))
            .unwrap_or_else(|error| panic!("cannot acquire item: {error}"))
    }

    /// Clears the item with its kind's destructor and keeps it for reuse if there is room.
    ///
    /// The kind is determined by the type of the item. If the idle queue is full, the cleared
    /// item is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered, which is a defect in the calling code. Use
    /// [`try_release()`][Self::try_release] to receive the error instead.
    pub fn release<T: Send + 'static>(&self, item: T) {
        self.try_release(item)
            .unwrap_or_else(|error| panic!("cannot release item: {error}"));
    }

    /// Clears the item and keeps it for reuse, reporting an unregistered kind as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if `T` is not registered. The item is then dropped without
    /// any hook being applied to it.
    pub fn try_release<T: Send + 'static>(&self, item: T) -> Result<()> {
        self.entry::<T>()?.recycle(item);
        Ok(())
    }

    /// Number of idle items of type `T` waiting for reuse.
    ///
    /// Under concurrent use this is only a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if `T` is not registered.
    pub fn idle_len<T: Send + 'static>(&self) -> Result<usize> {
        Ok(self.entry::<T>()?.idle_len())
    }

    fn entry<T: Send + 'static>(&self) -> Result<Arc<KindEntry<T>>> {
        // The read lock is held only while cloning the entry. No hook runs under the lock.
        let erased = self
            .kinds
            .read()
            .get(&TypeId::of::<T>())
            .map(Arc::clone)
            .ok_or(Error::UnknownKind {
                kind: type_name::<T>(),
            })?;

        Ok(erased.downcast::<KindEntry<T>>().expect(ERR_ENTRY_TYPE))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("kinds", &self.len())
            .finish_non_exhaustive()
    }
}
