mod create_table;
mod delete;
mod index_scan;
mod insert;
mod seq_scan;
mod update;

pub use self::{
    create_table::CreateTableExecutor, delete::DeleteExecutor, index_scan::IndexScanExecutor,
    insert::InsertExecutor, seq_scan::SeqScanExecutor, update::UpdateExecutor,
};

use crate::{
    catalog::Catalog,
    concurrency::{Transaction, TransactionManager},
    plan::Plan,
    storage::{Storage, Tuple},
    Error, Result,
};

/// What a statement returns to the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub message: String,
}

/// Dispatches a plan to the executor implementing it.
pub struct Executor<'a> {
    catalog: &'a mut Catalog,
    storage: &'a Storage,
    txn_manager: &'a TransactionManager,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a mut Catalog,
        storage: &'a Storage,
        txn_manager: &'a TransactionManager,
    ) -> Self {
        Self {
            catalog,
            storage,
            txn_manager,
        }
    }

    pub fn execute(&mut self, plan: Plan, txn: &mut Transaction) -> Result<ResultSet> {
        match plan {
            Plan::SeqScan(plan) => {
                SeqScanExecutor::new(self.storage, self.txn_manager).execute(plan, txn)
            }
            Plan::IndexScan(plan) => {
                IndexScanExecutor::new(self.catalog, self.storage).execute(plan)
            }
            Plan::Insert(plan) => {
                InsertExecutor::new(self.catalog, self.storage, self.txn_manager).execute(plan, txn)
            }
            Plan::Update(plan) => {
                UpdateExecutor::new(self.catalog, self.storage, self.txn_manager).execute(plan, txn)
            }
            Plan::Delete(plan) => {
                DeleteExecutor::new(self.catalog, self.storage, self.txn_manager).execute(plan, txn)
            }
            Plan::CreateTable(plan) => CreateTableExecutor::new(self.catalog).execute(plan),
        }
    }
}

/// Project a tuple onto the given column orders.
fn project(tuple: &Tuple, column_orders: &[usize]) -> Result<Vec<String>> {
    column_orders
        .iter()
        .map(|&order| {
            tuple
                .data
                .get(order)
                .map(|value| value.value.clone())
                .ok_or_else(|| Error::ColumnNotFound(format!("column order {}", order)))
        })
        .collect()
}
