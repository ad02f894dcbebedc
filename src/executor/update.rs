use crate::{
    am::btree::StringItem,
    catalog::Catalog,
    concurrency::{Transaction, TransactionManager},
    executor::ResultSet,
    expression::eval_where,
    plan::UpdatePlan,
    storage::Storage,
    Error, Result,
};

use log::debug;

use std::collections::HashMap;

/// Update rows matching the WHERE clause as delete-plus-insert: the old
/// tuple is tombstoned, the mutated tuple is appended, and the index entry
/// is rebound to the new page.
///
/// Keys updated by this statement are remembered so the freshly inserted
/// tuple is not updated again when the scan reaches it.
pub struct UpdateExecutor<'a> {
    catalog: &'a Catalog,
    storage: &'a Storage,
    txn_manager: &'a TransactionManager,
}

impl<'a> UpdateExecutor<'a> {
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

    pub fn execute(&self, plan: UpdatePlan, txn: &mut Transaction) -> Result<ResultSet> {
        let where_expression = match &plan.where_expression {
            Some(expression) => expression,
            None => {
                return Err(Error::Unsupported(
                    "UPDATE without a WHERE clause".to_string(),
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

        let mut updated_keys: Vec<String> = Vec::new();

        let mut it = self.storage.tuple_iterator(&plan.table_name);
        while let Some(mut tuple) = it.next(txn, self.txn_manager)? {
            if tuple.data.is_empty() {
                continue;
            }
            let pk_value = match tuple.data.get(pk_order) {
                Some(value) => value.value.clone(),
                None => continue,
            };
            if updated_keys.contains(&pk_value) {
                continue;
            }

            let row: Vec<String> = tuple.data.iter().map(|value| value.value.clone()).collect();
            if !eval_where(where_expression, &row, &column_orders)? {
                self.txn_manager.unlock_shared_by_tuple_id(txn, it.tuple_id());
                continue;
            }

            for (&order, value) in plan.column_orders.iter().zip(plan.column_values.iter()) {
                let cell = tuple.data.get_mut(order).ok_or_else(|| {
                    Error::ColumnNotFound(format!("column order {} out of range", order))
                })?;
                cell.value = value.clone();
            }

            let tuple_id = it.tuple_id();
            // drop the scan's shared lock so the delete can take the row
            // exclusively
            self.txn_manager.unlock_shared_by_tuple_id(txn, tuple_id);
            self.storage
                .delete_tuple(&plan.table_name, tuple_id, txn, self.txn_manager)?;
            debug!("update removed tuple {}", tuple_id);

            let page =
                self.storage
                    .insert_tuple(&plan.table_name, tuple.clone(), txn, self.txn_manager)?;
            debug!("update rewrote tuple onto page {}", page.id);

            let new_key = match tuple.data.get(pk_order) {
                Some(value) => value.value.clone(),
                None => pk_value,
            };
            let mut btree = self.storage.read_index(&plan.table_name, &schema.pk)?;
            if btree
                .search_and_update_page_id(&StringItem::search_key(&new_key), page.id)
                .is_none()
            {
                return Err(Error::IndexEntryMissing(new_key));
            }
            self.storage.write_index(&btree)?;

            updated_keys.push(new_key);
        }

        Ok(ResultSet {
            message: "updated!".to_string(),
            ..Default::default()
        })
    }
}
