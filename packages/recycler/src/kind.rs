//! Per-kind state: the lifecycle hooks and the bounded idle queue of one registered kind.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::trace;

use crate::{Error, Result};

pub(crate) type Creator<T> = Box<dyn Fn() -> T + Send + Sync>;
pub(crate) type Destructor<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// The initializer hook of a kind whose initialization parameters are of type `P`.
///
/// Stored type-erased in [`KindEntry`] because releasing an item never needs to know `P`.
pub(crate) struct Initializer<T, P>(Box<dyn Fn(&mut T, P) + Send + Sync>);

impl<T, P> Initializer<T, P> {
    pub(crate) fn new<I>(initializer: I) -> Self
    where
        I: Fn(&mut T, P) + Send + Sync + 'static,
    {
        Self(Box::new(initializer))
    }

    pub(crate) fn apply(&self, item: &mut T, params: P) {
        (self.0)(item, params);
    }
}

/// Everything the registry knows about one kind.
///
/// The idle queue is a bounded channel that is only ever accessed with `try_send()` and
/// `try_recv()`. A zero-capacity channel is a rendezvous channel and, since nobody ever blocks on
/// it, behaves as a queue that is both always empty and always full.
pub(crate) struct KindEntry<T> {
    capacity: usize,

    idle_sender: Sender<T>,
    idle_receiver: Receiver<T>,

    creator: Creator<T>,
    destructor: Destructor<T>,

    /// An `Initializer<T, P>` for the `P` given at registration.
    initializer: Arc<dyn Any + Send + Sync>,
    params_name: &'static str,
}

impl<T: Send + 'static> KindEntry<T> {
    pub(crate) fn new<P: 'static>(
        capacity: usize,
        creator: Creator<T>,
        initializer: Initializer<T, P>,
        destructor: Destructor<T>,
    ) -> Self {
        let (idle_sender, idle_receiver) = channel::bounded(capacity);

        Self {
            capacity,
            idle_sender,
            idle_receiver,
            creator,
            destructor,
            initializer: Arc::new(initializer),
            params_name: type_name::<P>(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        type_name::<T>()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently sitting idle. Only a snapshot under concurrent use.
    pub(crate) fn idle_len(&self) -> usize {
        self.idle_receiver.len()
    }

    /// Returns the initializer if it was registered for parameters of type `P`.
    pub(crate) fn initializer<P: 'static>(&self) -> Result<Arc<Initializer<T, P>>> {
        Arc::clone(&self.initializer)
            .downcast::<Initializer<T, P>>()
            .map_err(|_erased| Error::ParamsMismatch {
                kind: self.name(),
                registered: self.params_name,
                requested: type_name::<P>(),
            })
    }

    /// Takes an idle item or creates a new one. The result is not yet initialized.
    pub(crate) fn take(&self) -> T {
        // An empty queue and a queue that is momentarily contended look the same here and both
        // fall through to construction. We never wait for an item to show up.
        if let Ok(item) = self.idle_receiver.try_recv() {
            trace!(kind = self.name(), "reusing idle item");
            return item;
        }

        trace!(kind = self.name(), "creating new item");
        (self.creator)()
    }

    /// Clears the item and keeps it for reuse if there is room in the idle queue.
    pub(crate) fn recycle(&self, mut item: T) {
        (self.destructor)(&mut item);

        match self.idle_sender.try_send(item) {
            Ok(()) => {
                trace!(kind = self.name(), "queued cleared item");
            }
            Err(error) => {
                // The destructor has already run, so the item is safe to drop as-is.
                drop(error.into_inner());
                trace!(kind = self.name(), capacity = self.capacity, "dropped cleared item");
            }
        }
    }
}

impl<T: Send + 'static> fmt::Debug for KindEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity)
            .field("idle_len", &self.idle_len())
            .field("params", &self.params_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_entry(capacity: usize, created: &Arc<AtomicUsize>) -> KindEntry<Vec<u8>> {
        let created = Arc::clone(created);

        KindEntry::new(
            capacity,
            Box::new(move || {
                created.fetch_add(1, Ordering::Relaxed);
                Vec::new()
            }),
            Initializer::new(|item: &mut Vec<u8>, len: usize| item.resize(len, 0xAA)),
            Box::new(Vec::clear),
        )
    }

    #[test]
    fn take_creates_when_idle_queue_is_empty() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(2, &created);

        let item = entry.take();

        assert!(item.is_empty());
        assert_eq!(created.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn recycle_clears_and_queues() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(2, &created);

        entry.recycle(vec![1, 2, 3]);
        assert_eq!(entry.idle_len(), 1);

        let item = entry.take();
        assert!(item.is_empty());
        assert!(item.capacity() >= 3);
        assert_eq!(entry.idle_len(), 0);
        assert_eq!(created.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn recycle_drops_beyond_capacity() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(1, &created);

        entry.recycle(vec![1]);
        entry.recycle(vec![2]);
        entry.recycle(vec![3]);

        assert_eq!(entry.idle_len(), 1);
        assert_eq!(entry.capacity(), 1);
    }

    #[test]
    fn zero_capacity_never_retains() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(0, &created);

        entry.recycle(vec![1]);
        assert_eq!(entry.idle_len(), 0);

        drop(entry.take());
        drop(entry.take());
        assert_eq!(created.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn initializer_with_registered_params_type() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(1, &created);

        let initializer = entry.initializer::<usize>().unwrap();

        let mut item = entry.take();
        initializer.apply(&mut item, 4);
        assert_eq!(item, vec![0xAA; 4]);
    }

    #[test]
    fn initializer_with_other_params_type_is_mismatch() {
        let created = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(1, &created);

        let error = entry.initializer::<u32>().err().unwrap();

        assert!(matches!(
            error,
            Error::ParamsMismatch {
                registered: "usize",
                requested: "u32",
                ..
            }
        ));
    }
}
