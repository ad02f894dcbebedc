use crate::{concurrency::TransactionId, storage::TupleId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

/// One journaled mutation: deletes and updates set `old_tuple_id`, inserts
/// and updates set `new_tuple_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteRecord {
    pub table_name: String,
    pub old_tuple_id: Option<TupleId>,
    pub new_tuple_id: Option<TupleId>,
}

/// A transaction: an id, a lifecycle state and the journal of mutations it
/// performed while active.
///
/// The lock set itself lives in the `TransactionManager`'s lock table; the
/// transaction value is owned by the caller and consumed by commit/abort.
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    write_records: Vec<WriteRecord>,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            write_records: Vec::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub(crate) fn set_state(&mut self, state: TransactionState) {
        self.state = state;
    }

    pub fn add_write_record(
        &mut self,
        table_name: &str,
        old_tuple_id: Option<TupleId>,
        new_tuple_id: Option<TupleId>,
    ) {
        self.write_records.push(WriteRecord {
            table_name: table_name.to_string(),
            old_tuple_id,
            new_tuple_id,
        });
    }

    pub fn write_records(&self) -> &[WriteRecord] {
        &self.write_records
    }

    pub(crate) fn take_write_records(&mut self) -> Vec<WriteRecord> {
        std::mem::replace(&mut self.write_records, Vec::new())
    }
}
