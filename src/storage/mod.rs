pub mod consts;

mod disk_manager;
mod page;

use crate::{
    am::btree::{BTree, StringItem},
    PageId, Result, SlotId,
};

use serde::{de::DeserializeOwned, Serialize};

use std::{fmt, path::Path};

use self::consts::PAGE_SIZE;

pub use self::{
    disk_manager::DiskManager,
    page::{Page, Tuple, TupleValue},
};

pub type PageBuffer = [u8; PAGE_SIZE];

/// Location of a tuple in the heap: page id plus slot index.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TupleId {
    pub page_id: PageId,
    pub slot_id: SlotId,
}

impl TupleId {
    pub fn new(page_id: PageId, slot_id: SlotId) -> Self {
        Self { page_id, slot_id }
    }
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot_id)
    }
}

/// The storage layer: owns the disk manager and exposes page, index and
/// catalog persistence. Heap-level operations (scan, insert, delete) live
/// in `am::heap`.
pub struct Storage {
    disk_manager: DiskManager,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            disk_manager: DiskManager::new(base_path),
        }
    }

    pub fn read_page(&self, table_name: &str, page_id: PageId) -> Result<Page> {
        self.disk_manager.read_page(table_name, page_id)
    }

    pub fn write_page(&self, page: &Page) -> Result<()> {
        self.disk_manager.write_page(page)
    }

    /// Read the primary-key index of a table. An index that has not been
    /// persisted yet (no insert has happened) reads as an empty tree.
    pub fn read_index(&self, table_name: &str, index_name: &str) -> Result<BTree<StringItem>> {
        match self.disk_manager.read_index(table_name, index_name)? {
            Some(btree) => Ok(btree),
            None => Ok(BTree::new(table_name, index_name)),
        }
    }

    pub fn write_index(&self, btree: &BTree<StringItem>) -> Result<()> {
        self.disk_manager.write_index(btree)
    }

    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.disk_manager.read_json(name)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.disk_manager.write_json(name, value)
    }
}
