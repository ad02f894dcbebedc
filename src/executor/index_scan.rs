use crate::{
    am::btree::{Item, StringItem},
    catalog::Catalog,
    executor::{project, ResultSet},
    plan::IndexScanPlan,
    storage::Storage,
    Result,
};

/// Point lookup through the primary-key index: search the B-tree, read the
/// page it names, return the matching tuple.
pub struct IndexScanExecutor<'a> {
    catalog: &'a Catalog,
    storage: &'a Storage,
}

impl<'a> IndexScanExecutor<'a> {
    pub fn new(catalog: &'a Catalog, storage: &'a Storage) -> Self {
        Self { catalog, storage }
    }

    pub fn execute(&self, plan: IndexScanPlan) -> Result<ResultSet> {
        let schema = self.catalog.get(&plan.table_name)?;
        let pk_order = schema.pk_column_order()?;

        let btree = self
            .storage
            .read_index(&plan.table_name, &plan.index_name)?;

        let item = match btree.search(&StringItem::search_key(&plan.search_key)) {
            Some(item) => item,
            None => {
                return Ok(ResultSet {
                    message: "rows was not found".to_string(),
                    ..Default::default()
                });
            }
        };

        let page = self.storage.read_page(&plan.table_name, item.page_id())?;

        let mut rows = Vec::new();
        for tuple in page.tuples.iter().flatten() {
            if tuple.is_deleted || tuple.data.is_empty() {
                continue;
            }
            match tuple.data.get(pk_order) {
                Some(value) if value.value == plan.search_key => {}
                _ => continue,
            }

            rows.push(project(tuple, &plan.column_orders)?);
            break;
        }

        Ok(ResultSet {
            header: plan.column_names,
            rows,
            message: String::new(),
        })
    }
}
