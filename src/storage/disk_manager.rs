use serde::{de::DeserializeOwned, Serialize};

use crate::{
    am::btree::{BTree, StringItem},
    storage::Page,
    Error, PageId, Result,
};

use std::{
    fs::{self, DirBuilder},
    io,
    path::{Path, PathBuf},
};

/// Maps tables, indexes and catalog files to paths under a base directory
/// and performs whole-file reads and writes.
///
/// Layout: `<base>/<table>/<table>_<pageId>` for pages,
/// `<base>/<table>/<indexName>.json` for indexes, `<base>/<name>` for
/// generic JSON files.
pub struct DiskManager {
    base_path: PathBuf,
}

impl DiskManager {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn table_path(&self, table_name: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(table_name);
        path
    }

    fn page_file_path(&self, table_name: &str, page_id: PageId) -> PathBuf {
        let mut path = self.table_path(table_name);
        path.push(format!("{}_{}", table_name, page_id));
        path
    }

    fn index_file_path(&self, table_name: &str, index_name: &str) -> PathBuf {
        let mut path = self.table_path(table_name);
        path.push(format!("{}.json", index_name));
        path
    }

    fn general_file_path(&self, name: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(name);
        path
    }

    fn ensure_table_path(&self, table_name: &str) -> Result<()> {
        let table_path = self.table_path(table_name);
        if !table_path.is_dir() {
            DirBuilder::new().recursive(true).create(table_path)?;
        }
        Ok(())
    }

    pub fn read_page(&self, table_name: &str, page_id: PageId) -> Result<Page> {
        let path = self.page_file_path(table_name, page_id);
        let buffer = match fs::read(&path) {
            Ok(buffer) => buffer,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::PageNotFound(table_name.to_string(), page_id));
            }
            Err(e) => return Err(e.into()),
        };

        Page::decode(table_name, page_id, &buffer)
    }

    pub fn write_page(&self, page: &Page) -> Result<()> {
        let buffer = page.encode()?;
        self.ensure_table_path(&page.table_name)?;
        fs::write(self.page_file_path(&page.table_name, page.id), &buffer[..])?;
        Ok(())
    }

    /// Read an index file; `Ok(None)` when the index has not been created yet.
    pub fn read_index(
        &self,
        table_name: &str,
        index_name: &str,
    ) -> Result<Option<BTree<StringItem>>> {
        let path = self.index_file_path(table_name, index_name);
        let buffer = match fs::read(&path) {
            Ok(buffer) => buffer,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&buffer)?))
    }

    pub fn write_index(&self, btree: &BTree<StringItem>) -> Result<()> {
        self.ensure_table_path(btree.table_name())?;
        let buffer = serde_json::to_vec(btree)?;
        fs::write(
            self.index_file_path(btree.table_name(), btree.index_name()),
            &buffer,
        )?;
        Ok(())
    }

    /// Read a JSON file under the base directory; `Ok(None)` when absent.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let buffer = match fs::read(self.general_file_path(name)) {
            Ok(buffer) => buffer,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&buffer)?))
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let buffer = serde_json::to_vec(value)?;
        fs::write(self.general_file_path(name), &buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Tuple;

    fn get_temp_disk_manager() -> (DiskManager, tempfile::TempDir) {
        let db_dir = tempfile::tempdir().unwrap();
        let dm = DiskManager::new(db_dir.path());
        (dm, db_dir)
    }

    #[test]
    fn can_write_and_read_page() {
        let (dm, db_dir) = get_temp_disk_manager();

        let mut page = Page::new("users", 1);
        page.tuples[0] = Some(Tuple::from_values(&["u1", "alice"]));
        dm.write_page(&page).unwrap();

        let mut page_path = db_dir.path().to_path_buf();
        page_path.push("users");
        page_path.push("users_1");
        assert!(page_path.is_file());

        assert_eq!(dm.read_page("users", 1).unwrap(), page);
    }

    #[test]
    fn missing_page_is_not_found() {
        let (dm, _db_dir) = get_temp_disk_manager();

        match dm.read_page("users", 1) {
            Err(Error::PageNotFound(table, 1)) => assert_eq!(table, "users"),
            other => panic!("expected PageNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn can_write_and_read_index() {
        let (dm, _db_dir) = get_temp_disk_manager();

        assert!(dm.read_index("users", "id").unwrap().is_none());

        let mut btree = BTree::new("users", "id");
        btree.insert(StringItem::new("u1", 1)).unwrap();
        dm.write_index(&btree).unwrap();

        let read = dm.read_index("users", "id").unwrap().unwrap();
        assert_eq!(read.search(&StringItem::search_key("u1")).unwrap().page_id, 1);
    }

    #[test]
    fn can_write_and_read_json() {
        let (dm, _db_dir) = get_temp_disk_manager();

        assert_eq!(dm.read_json::<Vec<String>>("missing.json").unwrap(), None);

        let names = vec!["users".to_string(), "orders".to_string()];
        dm.write_json("names.json", &names).unwrap();
        assert_eq!(dm.read_json::<Vec<String>>("names.json").unwrap(), Some(names));
    }
}
