//! In-memory tables with transactional write access.

use crate::entity::SyncEntity;
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;

/// A table of synchronized rows indexed by natural key.
///
/// Server ids are assigned from a per-table auto-increment counter; a row
/// arriving with a client-known id keeps it, and the counter is advanced
/// past it so later assignments never collide.
#[derive(Debug)]
pub struct Table<T: SyncEntity> {
    rows: HashMap<T::Key, T>,
    next_id: i64,
}

impl<T: SyncEntity> Table<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            next_id: 1,
        }
    }

    /// Looks up a row by natural key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.rows.get(key)
    }

    /// Returns true if a row with this key exists.
    pub fn contains(&self, key: &T::Key) -> bool {
        self.rows.contains_key(key)
    }

    /// Inserts a new row, assigning a server id if none is set.
    ///
    /// Fails with [`CoreError::DuplicateKey`] if the natural key is taken.
    pub fn insert(&mut self, mut row: T) -> CoreResult<T::Key> {
        match row.id() {
            Some(id) => self.next_id = self.next_id.max(id + 1),
            None => {
                row.set_id(self.next_id);
                self.next_id += 1;
            }
        }

        let key = row
            .key()
            .ok_or_else(|| CoreError::Storage(format!("{} row has no key", T::ENTITY)))?;

        if self.rows.contains_key(&key) {
            return Err(CoreError::duplicate(T::ENTITY, row.key_label()));
        }
        self.rows.insert(key.clone(), row);
        Ok(key)
    }

    /// Replaces an existing row under `key`.
    pub fn replace(&mut self, key: &T::Key, row: T) -> CoreResult<()> {
        if !self.rows.contains_key(key) {
            return Err(CoreError::not_found(T::ENTITY, row.key_label()));
        }
        self.rows.insert(key.clone(), row);
        Ok(())
    }

    /// Removes and returns the row under `key`.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.rows.remove(key)
    }

    /// Snapshot of all rows, in no particular order.
    pub fn scan(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: SyncEntity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A write transaction over a single table.
///
/// All mutations are applied in place under the table's write lock and
/// journaled; [`rollback`](TableTxn::rollback) restores the table to its
/// state at transaction start. The store commits automatically when the
/// transaction closure returns `Ok` and rolls back on `Err`, so the
/// check-then-act sequences of the reconciler and the corbeille manager
/// cannot interleave with other writers or be left half-applied.
pub struct TableTxn<'a, T: SyncEntity> {
    table: &'a mut Table<T>,
    journal: Vec<(T::Key, Option<T>)>,
    saved_next_id: i64,
}

impl<'a, T: SyncEntity> TableTxn<'a, T> {
    /// Opens a transaction over `table`.
    pub fn new(table: &'a mut Table<T>) -> Self {
        let saved_next_id = table.next_id;
        Self {
            table,
            journal: Vec::new(),
            saved_next_id,
        }
    }

    /// Looks up a row by natural key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.table.get(key)
    }

    /// Inserts a new row, journaling the prior absence.
    pub fn insert(&mut self, row: T) -> CoreResult<T::Key> {
        // Journal before mutating: insert only succeeds on a vacant key.
        let probe = row.key();
        let key = self.table.insert(row)?;
        debug_assert!(probe.is_none() || probe.as_ref() == Some(&key));
        self.journal.push((key.clone(), None));
        Ok(key)
    }

    /// Replaces an existing row, journaling the prior value.
    pub fn replace(&mut self, key: &T::Key, row: T) -> CoreResult<()> {
        let prior = self.table.get(key).cloned();
        self.table.replace(key, row)?;
        self.journal.push((key.clone(), prior));
        Ok(())
    }

    /// Removes a row, journaling the prior value.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let removed = self.table.remove(key);
        if let Some(prior) = &removed {
            self.journal.push((key.clone(), Some(prior.clone())));
        }
        removed
    }

    /// Snapshot of all rows, including uncommitted writes.
    pub fn scan(&self) -> Vec<T> {
        self.table.scan()
    }

    /// Discards the journal, keeping all writes.
    pub fn commit(self) {}

    /// Undoes every journaled write, newest first.
    pub fn rollback(self) {
        let table = self.table;
        for (key, prior) in self.journal.into_iter().rev() {
            match prior {
                Some(row) => {
                    table.rows.insert(key, row);
                }
                None => {
                    table.rows.remove(&key);
                }
            }
        }
        table.next_id = self.saved_next_id;
    }
}
