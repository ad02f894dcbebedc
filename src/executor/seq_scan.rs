use crate::{
    concurrency::{Transaction, TransactionManager},
    executor::{project, ResultSet},
    expression::eval_where,
    plan::SeqScanPlan,
    storage::Storage,
    Result,
};

use std::collections::HashMap;

/// Full scan of a table under the transaction's view, with projection and
/// an optional WHERE filter over the projected columns.
pub struct SeqScanExecutor<'a> {
    storage: &'a Storage,
    txn_manager: &'a TransactionManager,
}

impl<'a> SeqScanExecutor<'a> {
    pub fn new(storage: &'a Storage, txn_manager: &'a TransactionManager) -> Self {
        Self {
            storage,
            txn_manager,
        }
    }

    pub fn execute(&self, plan: SeqScanPlan, txn: &Transaction) -> Result<ResultSet> {
        let mut it = self.storage.tuple_iterator(&plan.table_name);

        // WHERE columns resolve against the projected row
        let column_orders: HashMap<String, usize> = plan
            .column_names
            .iter()
            .enumerate()
            .map(|(order, name)| (name.clone(), order))
            .collect();

        let mut rows = Vec::new();
        while let Some(tuple) = it.next(txn, self.txn_manager)? {
            if tuple.data.is_empty() {
                continue;
            }

            let row = project(&tuple, &plan.column_orders)?;
            match &plan.where_expression {
                Some(expression) => {
                    if eval_where(expression, &row, &column_orders)? {
                        rows.push(row);
                    }
                }
                None => rows.push(row),
            }
        }

        Ok(ResultSet {
            header: plan.column_names,
            rows,
            message: String::new(),
        })
    }
}
