//! Capacity-bounded slot pool with priority-ordered requests
//!
//! A [`ResourcePool`] has a fixed number of slots. Requests wait in a pending set
//! ordered by `(priority, request id)`; the owning department decides when a
//! pending request is granted (see `Department::dispatch`), since some requests
//! need slots in two pools at once.
//!
//! The effective capacity is lowered by granting virtual schedule holds that
//! occupy a slot without a patient behind them, and raised again by cancelling
//! those holds. Granted patients are never evicted.

use crate::types::{HoldKind, IdSequence, RequestId};
use std::collections::BTreeMap;
use tracing::trace;

/// Ordering key of a pending request; lower priority values are served first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestKey {
    /// Pool priority of the request
    pub priority: i32,
    /// Request identifier, breaks ties in arrival order
    pub id: RequestId,
}

impl RequestKey {
    /// Key for a request of the given hold kind
    pub fn new(kind: HoldKind, id: RequestId) -> Self {
        Self { priority: kind.priority(), id }
    }
}

/// Slot pool with pending and granted requests
#[derive(Debug, Clone)]
pub struct ResourcePool {
    label: String,
    capacity: usize,
    granted: BTreeMap<RequestId, HoldKind>,
    pending: BTreeMap<RequestKey, HoldKind>,
    // Grant order of schedule holds, newest last
    schedule_holds: Vec<RequestId>,
}

impl ResourcePool {
    /// Create an empty pool with `capacity` slots
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            capacity,
            granted: BTreeMap::new(),
            pending: BTreeMap::new(),
            schedule_holds: Vec::new(),
        }
    }

    /// Fixed maximum number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently granted, real and virtual
    pub fn currently_granted(&self) -> usize {
        self.granted.len()
    }

    /// Slots not granted to anyone
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.granted.len())
    }

    /// Whether one more slot can be granted
    pub fn has_free_slot(&self) -> bool {
        self.granted.len() < self.capacity
    }

    /// Granted slots held by the given kind
    pub fn granted_of(&self, kind: HoldKind) -> usize {
        self.granted.values().filter(|&&k| k == kind).count()
    }

    /// Pending requests of the given kind
    pub fn pending_of(&self, kind: HoldKind) -> usize {
        self.pending.values().filter(|&&k| k == kind).count()
    }

    /// Whether the request currently holds a slot
    pub fn is_granted(&self, id: RequestId) -> bool {
        self.granted.contains_key(&id)
    }

    /// Pending requests in service order
    pub fn pending(&self) -> impl Iterator<Item = (RequestKey, HoldKind)> + '_ {
        self.pending.iter().map(|(key, kind)| (*key, *kind))
    }

    /// Queue a request
    pub fn enqueue(&mut self, id: RequestId, kind: HoldKind) -> RequestKey {
        let key = RequestKey::new(kind, id);
        self.pending.insert(key, kind);
        key
    }

    /// Withdraw a pending request; returns false if it was not pending
    pub fn cancel(&mut self, key: RequestKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Move a pending request into the granted set
    ///
    /// Returns false if the request is not pending or the pool is full.
    pub fn grant(&mut self, key: RequestKey) -> bool {
        if !self.has_free_slot() {
            return false;
        }
        let Some(kind) = self.pending.remove(&key) else {
            return false;
        };
        self.granted.insert(key.id, kind);
        if kind == HoldKind::ScheduleHold {
            self.schedule_holds.push(key.id);
        }
        debug_assert!(
            self.granted.len() <= self.capacity,
            "{}: granted {} exceeds capacity {}",
            self.label,
            self.granted.len(),
            self.capacity
        );
        true
    }

    /// Free the slot held by a granted request
    pub fn release(&mut self, id: RequestId) -> Option<HoldKind> {
        let kind = self.granted.remove(&id)?;
        if kind == HoldKind::ScheduleHold {
            self.schedule_holds.retain(|&hold| hold != id);
        }
        Some(kind)
    }

    /// Resize the slots left to non-schedule occupants to `target`
    ///
    /// Shrinking queues additional schedule holds, which the next dispatch grants
    /// ahead of patients. Growing withdraws pending holds first (newest first) and
    /// then releases granted ones. `target` is clamped to the pool capacity.
    pub fn set_effective_capacity(&mut self, target: usize, ids: &mut IdSequence) {
        let target = target.min(self.capacity);
        let wanted = self.capacity - target;
        let pending_holds: Vec<RequestKey> = self
            .pending
            .iter()
            .filter(|(_, &kind)| kind == HoldKind::ScheduleHold)
            .map(|(key, _)| *key)
            .collect();
        let current = self.schedule_holds.len() + pending_holds.len();

        if wanted > current {
            for _ in current..wanted {
                self.enqueue(ids.request(), HoldKind::ScheduleHold);
            }
        } else {
            let mut surplus = current - wanted;
            for key in pending_holds.iter().rev() {
                if surplus == 0 {
                    break;
                }
                if self.cancel(*key) {
                    surplus -= 1;
                }
            }
            while surplus > 0 {
                let Some(id) = self.schedule_holds.pop() else {
                    break;
                };
                self.granted.remove(&id);
                surplus -= 1;
            }
        }

        trace!(
            pool = %self.label,
            target,
            holds = self.schedule_holds.len(),
            pending = self.pending.len(),
            "Resized effective capacity"
        );
    }
}
