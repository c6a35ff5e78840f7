use huddle_core::ConnectionId;
use std::collections::{HashSet, VecDeque};

/// Remotes whose session was torn down, so late envelopes from them are
/// dropped. Holds at most `capacity` ids; the oldest is forgotten first.
#[derive(Debug)]
pub(crate) struct Tombstones {
    ids: HashSet<ConnectionId>,
    order: VecDeque<ConnectionId>,
    capacity: usize,
}

impl Tombstones {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn insert(&mut self, remote: ConnectionId) {
        if self.capacity == 0 || !self.ids.insert(remote) {
            return;
        }
        self.order.push_back(remote);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
    }

    pub(crate) fn remove(&mut self, remote: &ConnectionId) {
        if self.ids.remove(remote) {
            self.order.retain(|id| id != remote);
        }
    }

    pub(crate) fn contains(&self, remote: &ConnectionId) -> bool {
        self.ids.contains(remote)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
