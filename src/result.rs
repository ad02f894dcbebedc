use std::{
    error::Error as StdError,
    fmt::{self, Display},
    io,
};

use crate::{storage::TupleId, PageId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Codec(String),
    TableNotFound(String),
    ColumnNotFound(String),
    TableAlreadyExists(String),
    PrimaryKeyNotFound(String),
    DuplicateKey(String),
    KeyExists(String),
    LockConflict(TupleId),
    IndexEntryMissing(String),
    Unsupported(String),
    PageNotFound(String, PageId),
    TupleTooLarge(usize),
}

impl From<io::Error> for Error {
    fn from(ioe: io::Error) -> Self {
        Error::Io(ioe)
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;

        match *self {
            Io(ref e) => write!(f, "IO error: {}", e),
            Codec(ref e) => write!(f, "codec error: {}", e),
            TableNotFound(ref name) => write!(f, "table not found: {}", name),
            ColumnNotFound(ref name) => write!(f, "column not found: {}", name),
            TableAlreadyExists(ref name) => write!(f, "table already exists: {}", name),
            PrimaryKeyNotFound(ref name) => {
                write!(f, "primary key column not found: {}", name)
            }
            DuplicateKey(ref key) => write!(
                f,
                "duplicate key value violates unique constraint: {}",
                key
            ),
            KeyExists(ref key) => write!(f, "key already exists in index: {}", key),
            LockConflict(ref tuple_id) => write!(f, "lock conflict on tuple {}", tuple_id),
            IndexEntryMissing(ref key) => write!(f, "index entry not found: {}", key),
            Unsupported(ref what) => write!(f, "not supported: {}", what),
            PageNotFound(ref table, page_id) => {
                write!(f, "page {} of table '{}' not found", page_id, table)
            }
            TupleTooLarge(size) => write!(
                f,
                "tuple of {} bytes does not fit in a {}-byte slot",
                size,
                crate::storage::consts::TUPLE_SLOT_SIZE
            ),
        }
    }
}
