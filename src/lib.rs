pub mod am;
pub mod catalog;
pub mod concurrency;
pub mod executor;
pub mod expression;
pub mod plan;
pub mod storage;

mod config;
mod db;
mod result;

mod test_util;

pub use self::{
    config::DBConfig,
    db::DB,
    result::{Error, Result},
};

pub type PageId = u64;
pub type SlotId = u8;
