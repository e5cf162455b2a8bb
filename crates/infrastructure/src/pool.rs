//! Small bounded object pool, used by the query-log writer for its
//! `{byteBuffer}` pair (spec §4.4) and the general shape spec §4.5
//! describes for `FilteringContext`/`Request`/`Response` pools.
//!
//! The middleware itself (`ferrous-dns-application`) does not pool DNS
//! message envelopes: Rust's ownership model already gives every
//! `hickory_proto::op::Message` a single owner and a deterministic
//! `Drop`, so the "null out pooled pointers on `put`" discipline spec
//! §4.5 calls for has no failure mode to guard against here — there is
//! no separate lifetime to entangle. The one pool this workspace keeps
//! is the byte-buffer pool below, because it is a genuine allocation
//! win on the query-log hot path, not a correctness requirement. See
//! DESIGN.md for the full writeup of this decision.

use std::sync::Mutex;

/// Bounded pool of reusable `String` buffers.
///
/// `acquire` never blocks: if the pool is empty it allocates a fresh
/// buffer. `release` returns a cleared buffer to the pool, dropping it
/// instead if the pool is already at capacity.
pub struct StringBufferPool {
    buffers: Mutex<Vec<String>>,
    capacity: usize,
}

impl StringBufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn acquire(&self) -> String {
        self.buffers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_default()
    }

    pub fn release(&self, mut buffer: String) {
        buffer.clear();
        let mut guard = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        if guard.len() < self.capacity {
            guard.push(buffer);
        }
    }
}
