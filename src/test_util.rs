#![cfg(test)]

use crate::{concurrency::TransactionManager, storage::Storage, DBConfig, DB};

use std::sync::Arc;

pub fn get_temp_engine() -> (Arc<Storage>, TransactionManager, tempfile::TempDir) {
    let db_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(db_dir.path()));
    let txn_manager = TransactionManager::new(storage.clone());

    (storage, txn_manager, db_dir)
}

pub fn get_temp_db() -> (DB, tempfile::TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();

    let db_dir = tempfile::tempdir().unwrap();
    let config = DBConfig::new().base_path(db_dir.path());
    let db = DB::open(config).unwrap();

    (db, db_dir)
}
