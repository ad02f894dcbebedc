use crate::{
    am::btree::StringItem,
    catalog::Catalog,
    concurrency::{Transaction, TransactionManager},
    executor::ResultSet,
    expression::eval_where,
    plan::DeletePlan,
    storage::Storage,
    Error, Result,
};

use std::collections::HashMap;

/// Delete every row matching the WHERE clause: tombstone the tuple and
/// remove its primary key from the index.
pub struct DeleteExecutor<'a> {
    catalog: &'a Catalog,
    storage: &'a Storage,
    txn_manager: &'a TransactionManager,
}

impl<'a> DeleteExecutor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        storage: &'a Storage,
        txn_manager: &'a TransactionManager,
    ) -> Self {
        Self {
            catalog,
            storage,
            txn_manager,
        }
    }

    pub fn execute(&self, plan: DeletePlan, txn: &mut Transaction) -> Result<ResultSet> {
        let where_expression = match &plan.where_expression {
            Some(expression) => expression,
            None => {
                return Err(Error::Unsupported(
                    "DELETE without a WHERE clause".to_string(),
                ));
            }
        };

        let schema = self.catalog.get(&plan.table_name)?;
        let pk_order = schema.pk_column_order()?;

        // WHERE columns resolve against the full row
        let column_orders: HashMap<String, usize> = schema
            .columns
            .iter()
            .enumerate()
            .map(|(order, column)| (column.name.clone(), order))
            .collect();

        let mut it = self.storage.tuple_iterator(&plan.table_name);
        while let Some(tuple) = it.next(txn, self.txn_manager)? {
            if tuple.data.is_empty() {
                continue;
            }

            let row: Vec<String> = tuple.data.iter().map(|value| value.value.clone()).collect();
            if !eval_where(where_expression, &row, &column_orders)? {
                continue;
            }

            self.storage
                .delete_tuple(&plan.table_name, it.tuple_id(), txn, self.txn_manager)?;

            let pk_value = row.get(pk_order).ok_or_else(|| {
                Error::ColumnNotFound(format!("column order {} out of range", pk_order))
            })?;
            let mut btree = self.storage.read_index(&plan.table_name, &schema.pk)?;
            btree.delete(&StringItem::search_key(pk_value))?;
            self.storage.write_index(&btree)?;
        }

        Ok(ResultSet {
            message: "deleted!".to_string(),
            ..Default::default()
        })
    }
}
