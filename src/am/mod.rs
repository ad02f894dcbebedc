pub mod btree;
pub mod heap;

pub use self::{
    btree::{BTree, Item, StringItem},
    heap::TupleIterator,
};
