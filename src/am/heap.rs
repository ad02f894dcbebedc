use crate::{
    concurrency::{Transaction, TransactionManager},
    storage::{consts::TUPLES_PER_PAGE, Page, Storage, Tuple, TupleId},
    Error, PageId, Result, SlotId,
};

use log::debug;

/// Forward scanner over a heap table under a transaction's view.
///
/// Rows become visible once the transaction holds (or can take) a shared
/// lock on them; rows locked exclusively by another transaction are
/// skipped. An empty slot or a missing page ends the scan.
pub struct TupleIterator<'a> {
    storage: &'a Storage,
    table_name: String,
    page: Option<Page>,
    page_id: PageId,
    slot: usize,
    started: bool,
    finished: bool,
}

impl<'a> TupleIterator<'a> {
    fn new(storage: &'a Storage, table_name: &str) -> Self {
        Self {
            storage,
            table_name: table_name.to_string(),
            page: None,
            page_id: 1,
            slot: 0,
            started: false,
            finished: false,
        }
    }

    /// Load a page into the cursor; `false` when the page does not exist.
    fn fetch(&mut self, page_id: PageId) -> Result<bool> {
        match self.storage.read_page(&self.table_name, page_id) {
            Ok(page) => {
                self.page = Some(page);
                self.page_id = page_id;
                Ok(true)
            }
            Err(Error::PageNotFound(_, _)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn next(
        &mut self,
        txn: &Transaction,
        txn_manager: &TransactionManager,
    ) -> Result<Option<Tuple>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if !self.started {
                if !self.fetch(1)? {
                    self.finished = true;
                    return Ok(None);
                }
                self.started = true;
            } else if self.slot + 1 < TUPLES_PER_PAGE {
                self.slot += 1;
            } else {
                let next_page_id = self.page_id + 1;
                if !self.fetch(next_page_id)? {
                    self.finished = true;
                    return Ok(None);
                }
                self.slot = 0;
            }

            let tuple = match self
                .page
                .as_ref()
                .and_then(|page| page.tuples[self.slot].as_ref())
            {
                // the heap has no holes past live data: an empty slot ends the scan
                None => {
                    self.finished = true;
                    return Ok(None);
                }
                Some(tuple) => tuple.clone(),
            };

            if tuple.is_deleted {
                continue;
            }

            let tuple_id = self.tuple_id();
            if txn_manager.is_lock_shared(txn, tuple_id)
                || txn_manager.is_lock_exclusive(txn, tuple_id)
            {
                return Ok(Some(tuple));
            }
            if txn_manager.lock_shared(txn, tuple_id) {
                return Ok(Some(tuple));
            }
            // exclusively locked by another transaction, not visible here
        }
    }

    /// The position of the tuple returned by the last `next` call.
    pub fn tuple_id(&self) -> TupleId {
        TupleId::new(self.page_id, self.slot as SlotId)
    }

    /// The last page the scan touched; the insert path uses it to find the
    /// end of the heap.
    pub fn last_page(&self) -> Option<&Page> {
        self.page.as_ref()
    }
}

impl Storage {
    pub fn tuple_iterator(&self, table_name: &str) -> TupleIterator<'_> {
        TupleIterator::new(self, table_name)
    }

    /// Append a tuple to the heap and return the page it landed on.
    ///
    /// The scan used to find the end of the heap releases its shared locks
    /// as each row passes; this is read-only positioning, not part of the
    /// transaction's read set.
    pub fn insert_tuple(
        &self,
        table_name: &str,
        tuple: Tuple,
        txn: &mut Transaction,
        txn_manager: &TransactionManager,
    ) -> Result<Page> {
        let mut it = self.tuple_iterator(table_name);
        while it.next(txn, txn_manager)?.is_some() {
            txn_manager.unlock_shared_by_tuple_id(txn, it.tuple_id());
        }

        let (mut page, slot) = match it.last_page() {
            None => (Page::new(table_name, 1), 0),
            Some(last) => match last.first_empty_slot() {
                Some(slot) => (last.clone(), slot),
                None => (Page::new(table_name, last.id + 1), 0),
            },
        };

        let tuple_id = TupleId::new(page.id, slot as SlotId);
        if !txn_manager.lock_exclusive(txn, tuple_id) {
            return Err(Error::LockConflict(tuple_id));
        }

        page.tuples[slot] = Some(tuple);
        if txn.is_active() {
            txn.add_write_record(table_name, None, Some(tuple_id));
        }
        self.write_page(&page)?;

        debug!("inserted tuple {} into table {}", tuple_id, table_name);
        Ok(page)
    }

    /// Tombstone a tuple in place: the data is cleared and the slot stays
    /// occupied so scans do not mistake the deletion for the end of the
    /// heap. Deleting an already-tombstoned tuple succeeds; an empty slot
    /// is a no-op.
    pub fn delete_tuple(
        &self,
        table_name: &str,
        tuple_id: TupleId,
        txn: &mut Transaction,
        txn_manager: &TransactionManager,
    ) -> Result<()> {
        let mut page = self.read_page(table_name, tuple_id.page_id)?;

        if !txn_manager.lock_exclusive(txn, tuple_id) {
            return Err(Error::LockConflict(tuple_id));
        }

        match page.tuples.get_mut(tuple_id.slot_id as usize) {
            Some(Some(tuple)) => {
                tuple.data.clear();
                tuple.is_deleted = true;
            }
            _ => return Ok(()),
        }

        if txn.is_active() {
            txn.add_write_record(table_name, Some(tuple_id), None);
        }
        self.write_page(&page)?;

        debug!("deleted tuple {} from table {}", tuple_id, table_name);
        Ok(())
    }
}
