use serde::{Deserialize, Serialize};

use crate::{storage::Storage, Error, Result};

use std::sync::Arc;

const CATALOG_FILE: &str = "table_schema.json";

/// Column types; only strings are supported. Persisted as an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ColumnType {
    Unknown,
    String,
}

impl From<u8> for ColumnType {
    fn from(v: u8) -> Self {
        match v {
            1 => ColumnType::String,
            _ => ColumnType::Unknown,
        }
    }
}

impl From<ColumnType> for u8 {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Unknown => 0,
            ColumnType::String => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub pk: String,
}

impl TableSchema {
    pub fn column_order(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Position of the primary-key column within the schema.
    pub fn pk_column_order(&self) -> Result<usize> {
        self.column_order(&self.pk)
            .ok_or_else(|| Error::PrimaryKeyNotFound(self.pk.clone()))
    }
}

/// The persisted list of table schemas, loaded from and saved to
/// `table_schema.json` under the base path.
pub struct Catalog {
    table_schemas: Vec<TableSchema>,
    storage: Arc<Storage>,
}

impl Catalog {
    /// Load the catalog; a database without one starts empty.
    pub fn load(storage: Arc<Storage>) -> Result<Self> {
        let table_schemas = storage.read_json(CATALOG_FILE)?.unwrap_or_default();
        Ok(Self {
            table_schemas,
            storage,
        })
    }

    pub fn get(&self, name: &str) -> Result<&TableSchema> {
        self.table_schemas
            .iter()
            .find(|schema| schema.name == name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn add(&mut self, schema: TableSchema) -> Result<()> {
        if self.table_schemas.iter().any(|s| s.name == schema.name) {
            return Err(Error::TableAlreadyExists(schema.name));
        }
        self.table_schemas.push(schema);
        self.save()
    }

    pub fn table_schemas(&self) -> &[TableSchema] {
        &self.table_schemas
    }

    fn save(&self) -> Result<()> {
        self.storage.write_json(CATALOG_FILE, &self.table_schemas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::get_temp_engine;

    fn users_schema() -> TableSchema {
        TableSchema {
            name: "users".to_string(),
            columns: vec![
                ColumnSchema {
                    name: "id".to_string(),
                    ty: ColumnType::String,
                },
                ColumnSchema {
                    name: "name".to_string(),
                    ty: ColumnType::String,
                },
            ],
            pk: "id".to_string(),
        }
    }

    #[test]
    fn starts_empty_and_persists_additions() {
        let (storage, _txn_manager, _db_dir) = get_temp_engine();

        let mut catalog = Catalog::load(storage.clone()).unwrap();
        assert!(catalog.table_schemas().is_empty());

        catalog.add(users_schema()).unwrap();
        assert_eq!(catalog.get("users").unwrap().pk, "id");

        // a reload sees the persisted schema
        let reloaded = Catalog::load(storage).unwrap();
        assert_eq!(reloaded.get("users").unwrap(), &users_schema());
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let (storage, _txn_manager, _db_dir) = get_temp_engine();

        let mut catalog = Catalog::load(storage).unwrap();
        catalog.add(users_schema()).unwrap();

        match catalog.add(users_schema()) {
            Err(Error::TableAlreadyExists(name)) => assert_eq!(name, "users"),
            other => panic!("expected TableAlreadyExists, got {:?}", other),
        }
    }

    #[test]
    fn unknown_table_is_not_found() {
        let (storage, _txn_manager, _db_dir) = get_temp_engine();

        let catalog = Catalog::load(storage).unwrap();
        match catalog.get("missing") {
            Err(Error::TableNotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("expected TableNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn column_type_persists_as_an_integer() {
        let schema = users_schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][0]["type"], 1);

        let read: TableSchema = serde_json::from_value(json).unwrap();
        assert_eq!(read.columns[0].ty, ColumnType::String);
    }

    #[test]
    fn pk_column_order_resolves_through_the_schema() {
        let schema = users_schema();
        assert_eq!(schema.pk_column_order().unwrap(), 0);
        assert_eq!(schema.column_order("name"), Some(1));
        assert_eq!(schema.column_order("missing"), None);

        let mut broken = users_schema();
        broken.pk = "missing".to_string();
        assert!(broken.pk_column_order().is_err());
    }
}
