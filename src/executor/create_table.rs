use crate::{catalog::Catalog, executor::ResultSet, plan::CreateTablePlan, Result};

/// Register a new table schema in the catalog.
pub struct CreateTableExecutor<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> CreateTableExecutor<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        Self { catalog }
    }

    pub fn execute(&mut self, plan: CreateTablePlan) -> Result<ResultSet> {
        self.catalog.add(plan.table_schema)?;

        Ok(ResultSet {
            message: "successfully created table!".to_string(),
            ..Default::default()
        })
    }
}
