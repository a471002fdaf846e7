//! Ownership pointers whose lifetimes follow reference-count arithmetic.
//!
//! The heart of the crate is `SharedPtr`/`WeakPtr`: handles that share a
//! control block separating the number of owners keeping a pointee alive
//! (strong count) from the number of observers that may ask whether it still
//! is (weak count). The pointee is destroyed the moment the strong count
//! reaches zero; the block lingers until the weak count does too, so weak
//! handles can always report expiration safely.
//!
//! Control blocks come in two kinds: `make_shared` embeds the pointee in the
//! block (one heap allocation), while `SharedPtr::from_box`/`from_raw` adopt
//! a pointee allocated elsewhere and destroy it through a `Deleter`.
//!
//! ```
//! use ownptr::make_shared;
//!
//! let s1 = make_shared(42);
//! let s2 = s1.clone();
//! assert_eq!(s1.use_count(), 2);
//!
//! let w = s2.downgrade();
//! assert!(!w.expired());
//! assert_eq!(w.use_count(), 2);
//!
//! drop(s1);
//! drop(s2);
//! assert!(w.expired());
//! assert!(w.lock().is_null());
//! ```
//!
//! Alongside it the crate provides `IntrusivePtr`, for objects that count
//! their own references, and `UniquePtr`, for exclusive ownership with a
//! pluggable deleter.
//!
//! Caveat: counting is plain, not atomic. None of the shared handles are
//! `Send` or `Sync`, and a cycle of strong handles leaks.

#[macro_use]
pub(crate) mod debug;

pub mod compressed_pair;
pub(crate) mod control_block;
pub mod counter;
pub mod deleter;
pub mod enable_shared;
pub mod error;
pub mod intrusive;
pub mod shared;
pub mod stats;
pub mod unique;
pub mod weak;


pub use compressed_pair::CompressedPair;
pub use counter::{Counter, SimpleCounter};
pub use deleter::{DefaultDelete, Deleter};
pub use enable_shared::{make_shared_from_this, EnableSharedFromThis, SharedFromThis};
pub use error::{Error, Result};
pub use intrusive::{make_intrusive, IntrusivePtr, RefCounted};
pub use shared::{make_shared, SharedPtr};
#[cfg(feature = "global")]
pub use stats::global_stats;
pub use stats::{thread_local_stats, Stats};
pub use unique::UniquePtr;
pub use weak::WeakPtr;
