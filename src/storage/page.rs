use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::{
    storage::{
        consts::{PAGE_SIZE, TUPLES_PER_PAGE, TUPLE_SLOT_SIZE},
        PageBuffer,
    },
    Error, PageId, Result,
};

/// A single column value with its tombstone bit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TupleValue {
    pub value: String,
    pub is_deleted: bool,
}

impl TupleValue {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            is_deleted: false,
        }
    }
}

/// A row: an ordered vector of string values plus a tombstone flag.
///
/// Deleted tuples keep their slot (data cleared, `is_deleted` set) so that
/// scans never mistake a deletion for the end of the heap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub data: Vec<TupleValue>,
    pub is_deleted: bool,
}

impl Tuple {
    pub fn new(data: Vec<TupleValue>) -> Self {
        Self {
            data,
            is_deleted: false,
        }
    }

    pub fn from_values(values: &[&str]) -> Self {
        Self::new(values.iter().map(|v| TupleValue::new(v)).collect())
    }
}

/// A fixed-capacity heap page of `TUPLES_PER_PAGE` slots.
///
/// A slot is empty iff it holds `None`; occupied slots (tombstones included)
/// are contiguous from slot 0 in normal operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub table_name: String,
    pub id: PageId,
    pub tuples: [Option<Tuple>; TUPLES_PER_PAGE],
}

impl Page {
    pub fn new(table_name: &str, id: PageId) -> Self {
        Self {
            table_name: table_name.to_string(),
            id,
            tuples: Default::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.tuples.iter().all(|slot| slot.is_some())
    }

    pub fn first_empty_slot(&self) -> Option<usize> {
        self.tuples.iter().position(|slot| slot.is_none())
    }

    /// Serialize into a fixed `PAGE_SIZE` buffer.
    ///
    /// Each occupied slot is a little-endian u16 length prefix followed by
    /// the bincode encoding of the tuple; the rest of the slot stays zero.
    /// Empty slots are all-zero (a zero length prefix).
    pub fn encode(&self) -> Result<PageBuffer> {
        let mut buffer = [0u8; PAGE_SIZE];

        for (i, slot) in self.tuples.iter().enumerate() {
            let tuple = match slot {
                Some(tuple) => tuple,
                None => continue,
            };

            let bytes = bincode::serialize(tuple)?;
            if bytes.len() + 2 > TUPLE_SLOT_SIZE {
                return Err(Error::TupleTooLarge(bytes.len()));
            }

            let offset = i * TUPLE_SLOT_SIZE;
            LittleEndian::write_u16(&mut buffer[offset..offset + 2], bytes.len() as u16);
            buffer[offset + 2..offset + 2 + bytes.len()].copy_from_slice(&bytes);
        }

        Ok(buffer)
    }

    /// Reconstruct a page from a `PAGE_SIZE` buffer.
    pub fn decode(table_name: &str, id: PageId, buffer: &[u8]) -> Result<Page> {
        if buffer.len() != PAGE_SIZE {
            return Err(Error::Codec(format!(
                "page buffer is {} bytes, expected {}",
                buffer.len(),
                PAGE_SIZE
            )));
        }

        let mut page = Page::new(table_name, id);
        for i in 0..TUPLES_PER_PAGE {
            let offset = i * TUPLE_SLOT_SIZE;
            let len = LittleEndian::read_u16(&buffer[offset..offset + 2]) as usize;
            if len == 0 {
                continue;
            }
            if len + 2 > TUPLE_SLOT_SIZE {
                return Err(Error::Codec(format!(
                    "slot {} of page {} declares {} bytes",
                    i, id, len
                )));
            }

            let tuple = bincode::deserialize(&buffer[offset + 2..offset + 2 + len])?;
            page.tuples[i] = Some(tuple);
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_round_trip() {
        let page = Page::new("users", 1);
        let buffer = page.encode().unwrap();

        assert!(buffer.iter().all(|b| *b == 0));
        assert_eq!(Page::decode("users", 1, &buffer).unwrap(), page);
    }

    #[test]
    fn page_round_trip() {
        let mut page = Page::new("users", 1);
        page.tuples[0] = Some(Tuple::from_values(&["u1", "alice"]));
        page.tuples[1] = Some(Tuple::from_values(&["u2", "bob"]));
        page.tuples[2] = Some(Tuple {
            data: vec![],
            is_deleted: true,
        });

        let buffer = page.encode().unwrap();
        assert_eq!(buffer.len(), PAGE_SIZE);
        assert_eq!(Page::decode("users", 1, &buffer).unwrap(), page);
    }

    #[test]
    fn encode_is_deterministic() {
        let mut page = Page::new("users", 3);
        page.tuples[0] = Some(Tuple::from_values(&["k", "v"]));

        assert_eq!(&page.encode().unwrap()[..], &page.encode().unwrap()[..]);
    }

    #[test]
    fn full_page_round_trip() {
        let mut page = Page::new("users", 1);
        for i in 0..TUPLES_PER_PAGE {
            page.tuples[i] = Some(Tuple::from_values(&[&format!("u{}", i), "x"]));
        }

        assert!(page.is_full());
        assert_eq!(page.first_empty_slot(), None);

        let decoded = Page::decode("users", 1, &page.encode().unwrap()).unwrap();
        assert_eq!(decoded, page);
    }

    #[test]
    fn oversized_tuple_is_rejected() {
        let long_value = "x".repeat(TUPLE_SLOT_SIZE);
        let mut page = Page::new("users", 1);
        page.tuples[0] = Some(Tuple::from_values(&[long_value.as_str()]));

        match page.encode() {
            Err(Error::TupleTooLarge(_)) => {}
            other => panic!("expected TupleTooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(Page::decode("users", 1, &[0u8; 100]).is_err());
    }
}
