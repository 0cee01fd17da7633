#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`Registry`], a thread-safe registry of bounded free lists that recycle
//! objects through lifecycle hooks.
//!
//! Some objects are expensive enough to construct that reusing them pays off, but carry enough
//! state that simply handing out a used one would leak data from its previous user or keep
//! reference cycles alive. The registry pairs each kind of object with three hooks:
//!
//! * a **creator** that constructs a brand-new object,
//! * an **initializer** that prepares an object for use, with parameters supplied by the caller,
//! * a **destructor** that clears an object before it may sit idle.
//!
//! Every acquired object has just been initialized, whether it is new or reused. Every released
//! object has been cleared before it can enter the idle queue.
//!
//! # Features
//!
//! - **Typed kinds**: A kind is identified by the type of its objects, so acquiring and releasing
//!   are type-checked at compile time.
//! - **Bounded idle queues**: Each kind retains at most the number of idle objects chosen at
//!   registration. Excess released objects are cleared and dropped.
//! - **Never blocks**: An empty or contended idle queue means a new object is created, a full one
//!   means the released object is dropped. No operation waits for another thread.
//! - **Typed handles**: [`Recycler`] accesses one kind without a lookup on every call.
//! - **Scoped release**: [`Recycled`] releases its object when dropped.
//!
//! # Example
//!
//! ```rust
//! use recycler::Registry;
//!
//! struct Connection {
//!     peer: String,
//!     buffer: Vec<u8>,
//! }
//!
//! let registry = Registry::new();
//!
//! registry.register(
//!     4,
//!     || Connection {
//!         peer: String::new(),
//!         buffer: Vec::with_capacity(4096),
//!     },
//!     |connection: &mut Connection, peer: &'static str| connection.peer.push_str(peer),
//!     |connection: &mut Connection| {
//!         connection.peer.clear();
//!         connection.buffer.clear();
//!     },
//! );
//!
//! let mut connection = registry.acquire::<Connection, _>("10.0.0.1");
//! connection.buffer.extend_from_slice(b"secret");
//! registry.release(connection);
//!
//! // The reused connection carries nothing from its previous user.
//! let connection = registry.acquire::<Connection, _>("10.0.0.2");
//! assert_eq!(connection.peer, "10.0.0.2");
//! assert!(connection.buffer.is_empty());
//! ```
//!
//! # Misuse
//!
//! Acquiring or releasing an object of a type that was never registered, or acquiring with a
//! parameter type other than the one the initializer takes, is a defect in the calling code. The
//! plain operations panic in that case. The `try_` variants return an [`Error`] instead.
//!
//! # Logging
//!
//! Registration is logged at `debug` level and every acquire and release at `trace` level via
//! the `tracing` crate. No subscriber is installed by this package.

mod error;
mod kind;
mod recycled;
mod recycler;
mod registry;

pub use error::*;
pub use recycled::*;
pub use recycler::*;
pub use registry::*;
