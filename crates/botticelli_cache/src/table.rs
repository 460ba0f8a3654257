//! Concurrent command → responses table with an authoritative entry count.

use crate::{Capacity, CommandId, ResponseId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

const PREALLOCATE_MAX: usize = 1024;

/// Response ids recorded for one command. Duplicate ids collapse.
pub type ResponseSet = BTreeSet<ResponseId>;

/// How new responses combine with an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upsert {
    /// Add the new responses to the existing set
    Merge,
    /// Replace the existing set
    Replace,
}

impl Upsert {
    fn apply(self, existing: &mut ResponseSet, responses: ResponseSet) {
        match self {
            Self::Merge => existing.extend(responses),
            Self::Replace => *existing = responses,
        }
    }
}

/// Sharded storage behind [`CommandCache`](crate::CommandCache).
///
/// `count` is adjusted while the shard holding the key is write-locked, so
/// it never disagrees with the map once a call returns. New keys under a
/// bounded capacity are admitted one at a time through `admission`, which
/// makes evict-then-insert a single step for other admissions.
#[derive(Debug)]
pub(crate) struct CacheTable {
    entries: DashMap<CommandId, ResponseSet>,
    count: AtomicUsize,
    capacity: Capacity,
    admission: Mutex<()>,
}

impl CacheTable {
    pub(crate) fn new(capacity: Capacity) -> Self {
        let entries = match capacity.limit() {
            Some(limit) => DashMap::with_capacity(limit.min(PREALLOCATE_MAX)),
            None => DashMap::new(),
        };
        Self {
            entries,
            count: AtomicUsize::new(0),
            capacity,
            admission: Mutex::new(()),
        }
    }

    pub(crate) fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Store `responses` for `command`, returning the commands evicted to make room.
    pub(crate) fn upsert(
        &self,
        command: CommandId,
        responses: ResponseSet,
        mode: Upsert,
    ) -> Vec<CommandId> {
        if let Some(mut existing) = self.entries.get_mut(&command) {
            mode.apply(existing.value_mut(), responses);
            return Vec::new();
        }

        let Some(limit) = self.capacity.limit() else {
            self.insert_or_apply(command, responses, mode);
            return Vec::new();
        };

        let _admission = self.admission.lock();
        let evicted = if self.entries.contains_key(&command) {
            Vec::new()
        } else {
            self.make_room(limit)
        };
        self.insert_or_apply(command, responses, mode);
        evicted
    }

    fn insert_or_apply(&self, command: CommandId, responses: ResponseSet, mode: Upsert) {
        match self.entries.entry(command) {
            Entry::Occupied(mut occupied) => mode.apply(occupied.get_mut(), responses),
            Entry::Vacant(vacant) => {
                // The vacant entry still holds the shard lock.
                self.count.fetch_add(1, Ordering::AcqRel);
                vacant.insert(responses);
            }
        }
    }

    /// Evict oldest-first until fewer than `limit` entries remain.
    ///
    /// Keys are snapshotted first; entries removed concurrently by someone
    /// else are skipped rather than counted.
    fn make_room(&self, limit: usize) -> Vec<CommandId> {
        if self.count() < limit {
            return Vec::new();
        }

        let mut oldest = self.keys();
        oldest.sort_unstable();

        let mut evicted = Vec::new();
        for command in oldest {
            if self.count() < limit {
                break;
            }
            if self.remove(&command).is_some() {
                evicted.push(command);
            }
        }
        evicted
    }

    pub(crate) fn get(&self, command: &CommandId) -> Option<ResponseSet> {
        self.entries.get(command).map(|entry| entry.value().clone())
    }

    pub(crate) fn contains_key(&self, command: &CommandId) -> bool {
        self.entries.contains_key(command)
    }

    pub(crate) fn contains(&self, command: &CommandId, response: &ResponseId) -> bool {
        self.entries
            .get(command)
            .is_some_and(|entry| entry.value().contains(response))
    }

    /// Remove an entry. Only one of several racing callers gets `Some`.
    pub(crate) fn remove(&self, command: &CommandId) -> Option<ResponseSet> {
        self.entries
            .remove_if(command, |_, _| {
                self.count.fetch_sub(1, Ordering::AcqRel);
                true
            })
            .map(|(_, responses)| responses)
    }

    /// Remove every entry, returning how many were removed.
    pub(crate) fn clear(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, _| {
            self.count.fetch_sub(1, Ordering::AcqRel);
            removed += 1;
            false
        });
        removed
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) fn keys(&self) -> Vec<CommandId> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    pub(crate) fn values(&self) -> Vec<ResponseSet> {
        self.entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub(crate) fn entries(&self) -> Vec<(CommandId, ResponseSet)> {
        self.entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
