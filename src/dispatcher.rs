//! One-to-many frame fan-out
//!
//! [`FrameDispatcher`] feeds every frame to a dynamic set of downstream
//! writers. Writers can be added and removed from any thread while frames are
//! being dispatched.
//!
//! # Snapshot design
//!
//! ```text
//!   add()/remove()                  dispatch()
//!        │                              │
//!        ▼                              ▼
//!   delegates (locked) ──dirty──► snapshot: Arc<Vec<..>>
//!                                       │
//!                         ┌─────────────┼─────────────┐
//!                         ▼             ▼             ▼
//!                     writer A      writer B      writer C
//! ```
//!
//! Mutations only touch the locked write set and raise a dirty flag. The next
//! dispatch rebuilds the immutable snapshot and then feeds writers without
//! holding any lock, so a writer may add or remove delegates from inside
//! `input_frame` without deadlocking. Such changes take effect on the next
//! dispatch.
//!
//! The snapshot itself sits behind a `parking_lot` mutex. On the steady-state
//! path dispatch holds it only long enough to clone the `Arc`, and never while
//! calling a writer, so contention is limited to concurrent dispatchers
//! bumping one reference count.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::frame::{to_cacheable, FramePtr, FrameWriter, FrameWriterFn, SharedFrame};

/// Handle of a registered delegate
///
/// Combines the writer's address with the generation it was registered under.
/// Addresses are reused once a removed writer is dropped, so a stale id never
/// matches a writer that was added later at the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelegateId {
    addr: usize,
    generation: u64,
}

fn writer_addr(writer: &Arc<dyn FrameWriter>) -> usize {
    Arc::as_ptr(writer) as *const () as usize
}

struct Delegate {
    generation: u64,
    writer: Arc<dyn FrameWriter>,
}

type Snapshot = Arc<Vec<Arc<dyn FrameWriter>>>;

/// Fan-out of frames to a set of [`FrameWriter`]s
#[derive(Default)]
pub struct FrameDispatcher {
    /// Write set, keyed by writer address
    delegates: Mutex<BTreeMap<usize, Delegate>>,
    /// Source of delegate generations
    generation: AtomicU64,
    /// Set under the write lock whenever `delegates` changes
    dirty: AtomicBool,
    /// Read set used by dispatch
    snapshot: Mutex<Snapshot>,
}

impl FrameDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a downstream writer
    ///
    /// Adding the same writer twice keeps a single entry.
    pub fn add(&self, writer: Arc<dyn FrameWriter>) -> DelegateId {
        let addr = writer_addr(&writer);
        let mut delegates = self.delegates.lock();

        // A registered entry keeps its writer alive, so a matching address is
        // the same writer
        if let Some(existing) = delegates.get(&addr) {
            return DelegateId {
                addr,
                generation: existing.generation,
            };
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        delegates.insert(addr, Delegate { generation, writer });
        self.dirty.store(true, Ordering::Release);

        let id = DelegateId { addr, generation };

        tracing::debug!(delegate = ?id, delegates = delegates.len(), "Delegate added");
        id
    }

    /// Add a closure as downstream writer
    pub fn add_fn<F>(&self, f: F) -> DelegateId
    where
        F: Fn(&FramePtr<'_>) -> bool + Send + Sync + 'static,
    {
        self.add(Arc::new(FrameWriterFn::new(f)))
    }

    /// Remove a writer; returns whether it was registered
    ///
    /// An id from an earlier registration removes nothing, even if a new
    /// writer now lives at the same address.
    pub fn remove(&self, id: DelegateId) -> bool {
        let mut delegates = self.delegates.lock();
        match delegates.get(&id.addr) {
            Some(entry) if entry.generation == id.generation => {}
            _ => return false,
        }
        delegates.remove(&id.addr);
        self.dirty.store(true, Ordering::Release);

        tracing::debug!(delegate = ?id, delegates = delegates.len(), "Delegate removed");
        true
    }

    /// Number of registered writers
    pub fn len(&self) -> usize {
        self.delegates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.lock().is_empty()
    }

    /// Feed `frame` to every writer
    ///
    /// Returns true if at least one writer accepted the frame. Every writer
    /// sees the frame regardless of what earlier writers returned.
    pub fn dispatch(&self, frame: &FramePtr<'_>) -> bool {
        let snapshot = self.current_snapshot();

        let mut accepted = false;
        for writer in snapshot.iter() {
            accepted |= writer.input_frame(frame);
        }
        accepted
    }

    fn current_snapshot(&self) -> Snapshot {
        if self.dirty.load(Ordering::Acquire) {
            let delegates = self.delegates.lock();
            let rebuilt: Snapshot =
                Arc::new(delegates.values().map(|d| Arc::clone(&d.writer)).collect());
            *self.snapshot.lock() = Arc::clone(&rebuilt);
            self.dirty.store(false, Ordering::Release);

            tracing::trace!(delegates = rebuilt.len(), "Dispatch snapshot rebuilt");
            return rebuilt;
        }
        // Held for the clone only
        Arc::clone(&self.snapshot.lock())
    }
}

impl FrameWriter for FrameDispatcher {
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool {
        self.dispatch(frame)
    }
}

impl std::fmt::Debug for FrameDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDispatcher")
            .field("delegates", &self.len())
            .finish()
    }
}

/// Bridge into async consumers
///
/// Frames are promoted to [`SharedFrame`] before sending, since receivers
/// outlive the call. Returns false when there are no receivers.
impl FrameWriter for broadcast::Sender<SharedFrame> {
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool {
        self.send(to_cacheable(frame)).is_ok()
    }
}
