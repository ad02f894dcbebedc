mod transaction;
mod transaction_manager;

pub use self::{
    transaction::{Transaction, TransactionState, WriteRecord},
    transaction_manager::TransactionManager,
};

pub type TransactionId = u32;
