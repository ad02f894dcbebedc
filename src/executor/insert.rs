use crate::{
    am::btree::StringItem,
    catalog::Catalog,
    concurrency::{Transaction, TransactionManager},
    executor::ResultSet,
    plan::InsertPlan,
    storage::{Storage, Tuple, TupleValue},
    Error, Result,
};

const NULL_PLACEHOLDER: &str = "NULL";

/// Insert one row: reject duplicate primary keys through the index, append
/// the tuple to the heap, then record the key in the index.
pub struct InsertExecutor<'a> {
    catalog: &'a Catalog,
    storage: &'a Storage,
    txn_manager: &'a TransactionManager,
}

impl<'a> InsertExecutor<'a> {
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

    pub fn execute(&self, plan: InsertPlan, txn: &mut Transaction) -> Result<ResultSet> {
        let schema = self.catalog.get(&plan.into)?;

        let mut btree = self.storage.read_index(&plan.into, &schema.pk)?;
        if btree
            .search(&StringItem::search_key(&plan.pk_value))
            .is_some()
        {
            return Err(Error::DuplicateKey(plan.pk_value));
        }

        // unnamed columns get the NULL placeholder
        let mut values = vec![TupleValue::new(NULL_PLACEHOLDER); plan.column_num];
        for (&order, value) in plan.column_orders.iter().zip(plan.values.iter()) {
            let slot = values.get_mut(order).ok_or_else(|| {
                Error::ColumnNotFound(format!("column order {} out of range", order))
            })?;
            slot.value = value.clone();
        }

        let page = self
            .storage
            .insert_tuple(&plan.into, Tuple::new(values), txn, self.txn_manager)?;

        match btree.insert(StringItem::new(&plan.pk_value, page.id)) {
            Err(Error::KeyExists(key)) => return Err(Error::DuplicateKey(key)),
            other => other?,
        }
        btree.print_tree();

        self.storage.write_index(&btree)?;

        Ok(ResultSet {
            message: "successfully inserted!".to_string(),
            ..Default::default()
        })
    }
}
