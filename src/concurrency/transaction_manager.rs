use crate::{
    concurrency::{Transaction, TransactionId, TransactionState},
    storage::{Storage, TupleId},
    Result,
};

use log::debug;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Per-tuple shared and exclusive locks.
///
/// The two maps never hold an entry for the same tuple id at once: taking an
/// exclusive lock removes the (own) shared entry, and a foreign shared entry
/// denies the exclusive request outright.
#[derive(Default)]
struct LockTable {
    exclusive: HashMap<TupleId, TransactionId>,
    shared: HashMap<TupleId, Vec<TransactionId>>,
}

#[derive(Default)]
struct TransactionManagerState {
    lock_table: LockTable,
    latest_transaction_id: TransactionId,
}

/// Owns the process-wide lock table and drives the transaction lifecycle.
///
/// Lock acquisition never blocks: a conflicting request is denied
/// immediately and the caller surfaces `LockConflict`. All lock-table access
/// happens under a single mutex; disk I/O happens outside of it.
pub struct TransactionManager {
    storage: Arc<Storage>,
    state: Mutex<TransactionManagerState>,
}

impl TransactionManager {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            state: Mutex::new(Default::default()),
        }
    }

    pub fn begin(&self) -> Transaction {
        let mut guard = self.state.lock().unwrap();
        guard.latest_transaction_id += 1;

        Transaction::new(guard.latest_transaction_id)
    }

    /// Take a shared lock; denied while any transaction holds the tuple
    /// exclusively. Duplicate entries are tolerated, release scans them all.
    pub fn lock_shared(&self, txn: &Transaction, tuple_id: TupleId) -> bool {
        let mut guard = self.state.lock().unwrap();
        let lock_table = &mut guard.lock_table;

        if lock_table.exclusive.contains_key(&tuple_id) {
            return false;
        }

        lock_table
            .shared
            .entry(tuple_id)
            .or_insert_with(Vec::new)
            .push(txn.id());
        true
    }

    /// Take an exclusive lock. Reentrant for the current holder; a shared
    /// lock held only by this transaction is upgraded in place. Any foreign
    /// holder denies the request.
    pub fn lock_exclusive(&self, txn: &Transaction, tuple_id: TupleId) -> bool {
        let mut guard = self.state.lock().unwrap();
        let lock_table = &mut guard.lock_table;

        if let Some(holder) = lock_table.exclusive.get(&tuple_id) {
            return *holder == txn.id();
        }

        if let Some(holders) = lock_table.shared.get(&tuple_id) {
            if holders.iter().any(|id| *id != txn.id()) {
                return false;
            }
        }

        // upgrade: any remaining shared entry belongs to this transaction
        lock_table.shared.remove(&tuple_id);
        lock_table.exclusive.insert(tuple_id, txn.id());
        true
    }

    pub fn is_lock_shared(&self, txn: &Transaction, tuple_id: TupleId) -> bool {
        let guard = self.state.lock().unwrap();
        guard
            .lock_table
            .shared
            .get(&tuple_id)
            .map_or(false, |holders| holders.contains(&txn.id()))
    }

    pub fn is_lock_exclusive(&self, txn: &Transaction, tuple_id: TupleId) -> bool {
        let guard = self.state.lock().unwrap();
        guard.lock_table.exclusive.get(&tuple_id) == Some(&txn.id())
    }

    /// Release this transaction's shared lock on one tuple.
    pub fn unlock_shared_by_tuple_id(&self, txn: &Transaction, tuple_id: TupleId) {
        let mut guard = self.state.lock().unwrap();
        let shared = &mut guard.lock_table.shared;

        let now_empty = match shared.get_mut(&tuple_id) {
            Some(holders) => {
                holders.retain(|id| *id != txn.id());
                holders.is_empty()
            }
            None => false,
        };
        if now_empty {
            shared.remove(&tuple_id);
        }
    }

    /// Release every shared lock held by this transaction.
    pub fn unlock_shared_all(&self, txn: &Transaction) {
        let mut guard = self.state.lock().unwrap();
        let shared = &mut guard.lock_table.shared;

        for holders in shared.values_mut() {
            holders.retain(|id| *id != txn.id());
        }
        shared.retain(|_, holders| !holders.is_empty());
    }

    /// Release every exclusive lock held by this transaction.
    pub fn unlock_exclusive_all(&self, txn: &Transaction) {
        let mut guard = self.state.lock().unwrap();
        guard
            .lock_table
            .exclusive
            .retain(|_, holder| *holder != txn.id());
    }

    /// Commit: tombstone every superseded tuple (the `old_tuple_id` side of
    /// the journal, written by deletes and updates), then release all locks.
    ///
    /// The state is flipped first so the compensation deletes do not journal
    /// again; deleting an already-tombstoned tuple is a no-op, and the
    /// exclusive locks taken during the statement are reentrant here.
    pub fn commit(&self, mut txn: Transaction) -> Result<()> {
        txn.set_state(TransactionState::Committed);

        for record in txn.take_write_records() {
            if let Some(old_tuple_id) = record.old_tuple_id {
                self.storage
                    .delete_tuple(&record.table_name, old_tuple_id, &mut txn, self)?;
            }
        }

        self.release_all(&txn);
        debug!("transaction {} committed", txn.id());
        Ok(())
    }

    /// Abort: tombstone every tuple this transaction wrote (the
    /// `new_tuple_id` side of the journal), then release all locks.
    pub fn abort(&self, mut txn: Transaction) -> Result<()> {
        txn.set_state(TransactionState::Aborted);

        for record in txn.take_write_records() {
            if let Some(new_tuple_id) = record.new_tuple_id {
                self.storage
                    .delete_tuple(&record.table_name, new_tuple_id, &mut txn, self)?;
            }
        }

        self.release_all(&txn);
        debug!("transaction {} aborted", txn.id());
        Ok(())
    }

    fn release_all(&self, txn: &Transaction) {
        self.unlock_shared_all(txn);
        self.unlock_exclusive_all(txn);
    }
}
