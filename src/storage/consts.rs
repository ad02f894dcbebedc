/// Size of an on-disk page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Number of tuple slots in a page.
pub const TUPLES_PER_PAGE: usize = 32;

/// Size of a single tuple slot in bytes, length prefix included.
pub const TUPLE_SLOT_SIZE: usize = 128;
