use crate::{
    catalog::Catalog,
    concurrency::{Transaction, TransactionManager},
    executor::{Executor, ResultSet},
    plan::Plan,
    storage::Storage,
    DBConfig, Result,
};

use std::{
    fs::DirBuilder,
    sync::{Arc, Mutex},
};

/// The database facade: wires the storage layer, the transaction manager
/// and the catalog, and executes plans produced by an external planner.
pub struct DB {
    storage: Arc<Storage>,
    txn_manager: TransactionManager,
    catalog: Mutex<Catalog>,
}

impl DB {
    pub fn open(config: DBConfig) -> Result<Self> {
        if !config.base_path.is_dir() {
            DirBuilder::new().recursive(true).create(&config.base_path)?;
        }

        let storage = Arc::new(Storage::new(&config.base_path));
        let catalog = Catalog::load(storage.clone())?;
        let txn_manager = TransactionManager::new(storage.clone());

        Ok(Self {
            storage,
            txn_manager,
            catalog: Mutex::new(catalog),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn transaction_manager(&self) -> &TransactionManager {
        &self.txn_manager
    }

    pub fn start_transaction(&self) -> Transaction {
        self.txn_manager.begin()
    }

    pub fn commit_transaction(&self, txn: Transaction) -> Result<()> {
        self.txn_manager.commit(txn)
    }

    pub fn abort_transaction(&self, txn: Transaction) -> Result<()> {
        self.txn_manager.abort(txn)
    }

    /// Execute one plan under the given transaction. The catalog is locked
    /// for the duration of the statement.
    pub fn execute(&self, plan: Plan, txn: &mut Transaction) -> Result<ResultSet> {
        let mut catalog = self.catalog.lock().unwrap();
        Executor::new(&mut catalog, &self.storage, &self.txn_manager).execute(plan, txn)
    }
}

#[cfg(test)]
mod tests {
    use crate::{concurrency::TransactionState, storage::TupleId, test_util::get_temp_db};

    #[test]
    fn can_open_a_database_twice() {
        let (db, db_dir) = get_temp_db();
        let txn = db.start_transaction();
        assert_eq!(txn.state(), TransactionState::Active);
        db.commit_transaction(txn).unwrap();
        drop(db);

        let config = crate::DBConfig::new().base_path(db_dir.path());
        let db = crate::DB::open(config).unwrap();
        let txn = db.start_transaction();
        db.abort_transaction(txn).unwrap();
    }

    #[test]
    fn locks_held_by_one_transaction_block_another() {
        let (db, _db_dir) = get_temp_db();
        let txn_manager = db.transaction_manager();

        let t1 = db.start_transaction();
        let t2 = db.start_transaction();
        let tuple_id = TupleId::new(1, 0);

        assert!(txn_manager.lock_exclusive(&t1, tuple_id));
        assert!(!txn_manager.lock_exclusive(&t2, tuple_id));
        assert!(!txn_manager.lock_shared(&t2, tuple_id));

        db.commit_transaction(t1).unwrap();
        assert!(txn_manager.lock_exclusive(&t2, tuple_id));
        db.commit_transaction(t2).unwrap();
    }
}
