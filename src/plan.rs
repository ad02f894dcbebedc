use crate::{catalog::TableSchema, expression::Expression};

/// The plans the executor accepts, as produced by an external planner.
#[derive(Clone, Debug)]
pub enum Plan {
    SeqScan(SeqScanPlan),
    IndexScan(IndexScanPlan),
    Insert(InsertPlan),
    Update(UpdatePlan),
    Delete(DeletePlan),
    CreateTable(CreateTablePlan),
}

#[derive(Clone, Debug)]
pub struct SeqScanPlan {
    pub table_name: String,
    pub column_names: Vec<String>,
    pub column_orders: Vec<usize>,
    pub where_expression: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct IndexScanPlan {
    pub table_name: String,
    pub column_names: Vec<String>,
    pub column_orders: Vec<usize>,
    pub search_key: String,
    pub index_name: String,
}

/// `values[i]` pairs with `column_orders[i]`; unnamed columns are filled
/// with the NULL placeholder by the executor.
#[derive(Clone, Debug)]
pub struct InsertPlan {
    pub into: String,
    pub column_names: Vec<String>,
    pub column_orders: Vec<usize>,
    pub values: Vec<String>,
    pub column_num: usize,
    pub pk_value: String,
}

#[derive(Clone, Debug)]
pub struct UpdatePlan {
    pub table_name: String,
    pub column_names: Vec<String>,
    pub column_orders: Vec<usize>,
    pub column_values: Vec<String>,
    pub where_expression: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct DeletePlan {
    pub table_name: String,
    pub where_expression: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct CreateTablePlan {
    pub table_schema: TableSchema,
}
