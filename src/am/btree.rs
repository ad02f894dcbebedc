use serde::{Deserialize, Serialize};

use log::debug;

use crate::{Error, PageId, Result};

/// Maximum number of items a node may hold; a third item triggers a split.
pub const MAX_ITEMS: usize = 2;

/// Capability set required of an index entry.
///
/// Only string keys are needed for the primary-key index, but the tree
/// itself does not care what it stores.
pub trait Item: Clone {
    fn less(&self, other: &Self) -> bool;
    fn equal(&self, other: &Self) -> bool;
    /// Tombstoned entries read as misses.
    fn is_skip(&self) -> bool;
    fn page_id(&self) -> PageId;
    fn set_page_id(&mut self, page_id: PageId);
    fn key(&self) -> &str;
}

/// Index entry of the primary-key index: string key mapped to the heap page
/// holding the tuple.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringItem {
    pub value: String,
    pub page_id: PageId,
    pub delete: bool,
}

impl StringItem {
    pub fn new(value: &str, page_id: PageId) -> Self {
        Self {
            value: value.to_string(),
            page_id,
            delete: false,
        }
    }

    /// Key-only probe for lookups; the page id is not part of the key.
    pub fn search_key(value: &str) -> Self {
        Self::new(value, 0)
    }
}

impl Item for StringItem {
    fn less(&self, other: &Self) -> bool {
        self.value < other.value
    }

    fn equal(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_skip(&self) -> bool {
        self.delete
    }

    fn page_id(&self) -> PageId {
        if self.delete {
            0
        } else {
            self.page_id
        }
    }

    fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    fn key(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node<T> {
    items: Vec<T>,
    children: Vec<Node<T>>,
}

impl<T: Item> Node<T> {
    fn leaf(item: T) -> Self {
        Self {
            items: vec![item],
            children: Vec::new(),
        }
    }

    /// Insert into the subtree. Returns the promoted median and the new
    /// right sibling when this node split.
    fn insert_rec(&mut self, item: T) -> Result<Option<(T, Node<T>)>> {
        if !self.children.is_empty() {
            for i in 0..self.items.len() {
                if item.equal(&self.items[i]) {
                    return Err(Error::KeyExists(item.key().to_string()));
                }
                if item.less(&self.items[i]) {
                    if let Some((median, right)) = self.children[i].insert_rec(item)? {
                        self.items.insert(i, median);
                        self.children.insert(i + 1, right);
                    }
                    if self.items.len() > MAX_ITEMS {
                        return Ok(Some(self.split()));
                    }
                    return Ok(None);
                }
            }

            // insert into the last child
            let last = self.children.len() - 1;
            if let Some((median, right)) = self.children[last].insert_rec(item)? {
                self.items.push(median);
                self.children.push(right);
            }
            if self.items.len() > MAX_ITEMS {
                return Ok(Some(self.split()));
            }
            return Ok(None);
        }

        // leaf node
        let mut index = self.items.len();
        for i in 0..self.items.len() {
            if item.equal(&self.items[i]) {
                return Err(Error::KeyExists(item.key().to_string()));
            }
            if item.less(&self.items[i]) {
                index = i;
                break;
            }
        }
        self.items.insert(index, item);

        if self.items.len() > MAX_ITEMS {
            return Ok(Some(self.split()));
        }
        Ok(None)
    }

    /// Split an overfull node: keep `items[..mid]`, promote `items[mid]`,
    /// hand `items[mid + 1..]` and the children past `mid` to a new sibling.
    fn split(&mut self) -> (T, Node<T>) {
        let mid = self.items.len() / 2;

        let right_items = self.items.split_off(mid + 1);
        let median = match self.items.pop() {
            Some(median) => median,
            None => unreachable!("split of a node without items"),
        };
        let right_children = if self.children.is_empty() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };

        (
            median,
            Node {
                items: right_items,
                children: right_children,
            },
        )
    }

    fn search(&self, key: &T) -> Option<&T> {
        for (i, item) in self.items.iter().enumerate() {
            if key.equal(item) {
                if item.is_skip() {
                    return None;
                }
                return Some(item);
            }
            if key.less(item) {
                if self.children.is_empty() {
                    return None;
                }
                return self.children[i].search(key);
            }
        }

        match self.children.last() {
            Some(last) => last.search(key),
            None => None,
        }
    }

    fn search_mut(&mut self, key: &T) -> Option<&mut T> {
        for i in 0..self.items.len() {
            if key.equal(&self.items[i]) {
                if self.items[i].is_skip() {
                    return None;
                }
                return Some(&mut self.items[i]);
            }
            if key.less(&self.items[i]) {
                if self.children.is_empty() {
                    return None;
                }
                return self.children[i].search_mut(key);
            }
        }

        if self.children.is_empty() {
            return None;
        }
        let last = self.children.len() - 1;
        self.children[last].search_mut(key)
    }

    /// In-order traversal into `out`.
    fn collect_into(&self, out: &mut Vec<T>) {
        if self.children.is_empty() {
            out.extend(self.items.iter().cloned());
            return;
        }

        for (i, child) in self.children.iter().enumerate() {
            child.collect_into(out);
            if i < self.items.len() {
                out.push(self.items[i].clone());
            }
        }
    }
}

/// The primary-key index: a B-tree keyed by string values, mapping each key
/// to the heap page containing the tuple.
///
/// Trees are read from disk, mutated in memory and written back wholesale;
/// they are never shared across operations, so exclusive mutation is
/// enforced by `&mut self`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BTree<T> {
    top: Option<Node<T>>,
    table_name: String,
    index_name: String,
}

impl<T: Item> BTree<T> {
    pub fn new(table_name: &str, index_name: &str) -> Self {
        Self {
            top: None,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Insert an item; duplicate keys fail with `KeyExists`.
    pub fn insert(&mut self, item: T) -> Result<()> {
        let mut root = match self.top.take() {
            None => {
                self.top = Some(Node::leaf(item));
                return Ok(());
            }
            Some(root) => root,
        };

        match root.insert_rec(item) {
            Ok(Some((median, right))) => {
                self.top = Some(Node {
                    items: vec![median],
                    children: vec![root, right],
                });
                Ok(())
            }
            Ok(None) => {
                self.top = Some(root);
                Ok(())
            }
            Err(e) => {
                self.top = Some(root);
                Err(e)
            }
        }
    }

    pub fn search(&self, key: &T) -> Option<&T> {
        self.top.as_ref().and_then(|root| root.search(key))
    }

    /// Find the item with the given key and rebind its page id.
    pub fn search_and_update_page_id(&mut self, key: &T, page_id: PageId) -> Option<&mut T> {
        let item = self.top.as_mut().and_then(|root| root.search_mut(key))?;
        item.set_page_id(page_id);
        Some(item)
    }

    /// Remove a key. The tree is rebuilt from the surviving items, which
    /// keeps it balanced; tombstoned items are dropped along the way.
    pub fn delete(&mut self, key: &T) -> Result<()> {
        let root = match self.top.take() {
            None => return Ok(()),
            Some(root) => root,
        };

        let mut items = Vec::new();
        root.collect_into(&mut items);

        for item in items {
            if item.equal(key) || item.is_skip() {
                continue;
            }
            self.insert(item)?;
        }
        Ok(())
    }
}

impl<T: Item + std::fmt::Debug> BTree<T> {
    /// Debug dump of the tree shape; not part of the contract.
    pub fn print_tree(&self) {
        debug!(
            "index {}.{}: {:?}",
            self.table_name, self.index_name, self.top
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(values: &[&str]) -> BTree<StringItem> {
        let mut btree = BTree::new("users", "id");
        for value in values {
            btree.insert(StringItem::new(value, 0)).unwrap();
        }
        btree
    }

    fn check_node_sizes(node: &Node<StringItem>) -> bool {
        if node.items.is_empty() || node.items.len() > MAX_ITEMS {
            return false;
        }
        if !node.children.is_empty() && node.children.len() != node.items.len() + 1 {
            return false;
        }
        node.children.iter().all(check_node_sizes)
    }

    fn collect_values(btree: &BTree<StringItem>) -> Vec<String> {
        let mut items = Vec::new();
        if let Some(root) = &btree.top {
            root.collect_into(&mut items);
        }
        items.into_iter().map(|item| item.value).collect()
    }

    fn assert_valid(btree: &BTree<StringItem>) {
        if let Some(root) = &btree.top {
            assert!(check_node_sizes(root));
        }
        // in-order traversal must be strictly ascending
        let values = collect_values(btree);
        let mut sorted = values.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(values, sorted);
    }

    #[test]
    fn can_insert_and_search() {
        let values = ["c", "a", "b", "d", "f", "e", "g"];
        let btree = tree_with(&values);

        for value in &values {
            let found = btree.search(&StringItem::search_key(value)).unwrap();
            assert_eq!(found.value, *value);
        }
        assert!(btree.search(&StringItem::search_key("z")).is_none());
    }

    #[test]
    fn builds_expected_node_structure() {
        let btree = tree_with(&["c", "a", "b", "d", "f", "e", "g"]);

        //      d
        //   b     f
        //  a c   e g
        let top = btree.top.as_ref().unwrap();
        assert_eq!(top.items[0].value, "d");
        assert_eq!(top.children.len(), 2);
        assert_eq!(top.children[0].items[0].value, "b");
        assert_eq!(top.children[1].items[0].value, "f");
        assert_eq!(top.children[0].children[0].items[0].value, "a");
        assert_eq!(top.children[0].children[1].items[0].value, "c");
        assert_eq!(top.children[1].children[0].items[0].value, "e");
        assert_eq!(top.children[1].children[1].items[0].value, "g");
        assert!(top.children[0].children[0].children.is_empty());
        assert!(top.children[1].children[1].children.is_empty());
    }

    #[test]
    fn stays_balanced_under_many_inserts() {
        let mut btree = BTree::new("users", "id");
        // scrambled but deterministic insertion order
        for i in 0..50u64 {
            let value = format!("k{:02}", (i * 7) % 50);
            btree.insert(StringItem::new(&value, i)).unwrap();
        }

        assert_valid(&btree);
        assert_eq!(collect_values(&btree).len(), 50);
        for i in 0..50 {
            let value = format!("k{:02}", i);
            assert!(btree.search(&StringItem::search_key(&value)).is_some());
        }
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut btree = tree_with(&["c", "a", "b", "d", "f", "e", "g"]);

        match btree.insert(StringItem::new("d", 9)) {
            Err(Error::KeyExists(key)) => assert_eq!(key, "d"),
            other => panic!("expected KeyExists, got {:?}", other),
        }
        match btree.insert(StringItem::new("a", 9)) {
            Err(Error::KeyExists(key)) => assert_eq!(key, "a"),
            other => panic!("expected KeyExists, got {:?}", other),
        }
        assert_valid(&btree);
    }

    #[test]
    fn delete_removes_only_the_key() {
        let mut btree = tree_with(&["c", "a", "b", "d", "f", "e", "g"]);

        btree.delete(&StringItem::search_key("d")).unwrap();

        assert!(btree.search(&StringItem::search_key("d")).is_none());
        for value in ["a", "b", "c", "e", "f", "g"].iter() {
            assert!(btree.search(&StringItem::search_key(value)).is_some());
        }
        assert_valid(&btree);
    }

    #[test]
    fn delete_last_key_empties_the_tree() {
        let mut btree = tree_with(&["a"]);

        btree.delete(&StringItem::search_key("a")).unwrap();
        assert!(btree.is_empty());
        assert!(btree.search(&StringItem::search_key("a")).is_none());
    }

    #[test]
    fn can_rebind_page_id() {
        let mut btree = tree_with(&["c", "a", "b"]);

        let item = btree
            .search_and_update_page_id(&StringItem::search_key("b"), 7)
            .unwrap();
        assert_eq!(item.page_id, 7);
        assert_eq!(
            btree.search(&StringItem::search_key("b")).unwrap().page_id,
            7
        );

        assert!(btree
            .search_and_update_page_id(&StringItem::search_key("z"), 7)
            .is_none());
    }

    #[test]
    fn tombstoned_item_is_a_miss() {
        let mut btree = tree_with(&["a", "b"]);
        if let Some(root) = btree.top.as_mut() {
            for item in root.items.iter_mut() {
                if item.value == "a" {
                    item.delete = true;
                }
            }
        }

        assert!(btree.search(&StringItem::search_key("a")).is_none());
        assert!(btree.search(&StringItem::search_key("b")).is_some());
    }

    #[test]
    fn json_round_trip_preserves_keys() {
        let btree = tree_with(&["c", "a", "b", "d", "f", "e", "g"]);

        let json = serde_json::to_string(&btree).unwrap();
        let read: BTree<StringItem> = serde_json::from_str(&json).unwrap();

        assert_eq!(collect_values(&read), collect_values(&btree));
        assert_eq!(read.table_name(), "users");
        assert_eq!(read.index_name(), "id");
    }

    #[test]
    fn json_uses_the_expected_field_names() {
        let mut btree = BTree::new("users", "id");
        btree.insert(StringItem::new("u1", 1)).unwrap();

        let json: serde_json::Value = serde_json::to_value(&btree).unwrap();
        assert!(json.get("Top").is_some());
        assert_eq!(json["TableName"], "users");
        assert_eq!(json["IndexName"], "id");
        assert_eq!(json["Top"]["Items"][0]["Value"], "u1");
        assert_eq!(json["Top"]["Items"][0]["PageId"], 1);
        assert_eq!(json["Top"]["Items"][0]["Delete"], false);
        assert!(json["Top"]["Children"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_tree_serializes_with_null_top() {
        let btree: BTree<StringItem> = BTree::new("users", "id");

        let json: serde_json::Value = serde_json::to_value(&btree).unwrap();
        assert!(json["Top"].is_null());

        let read: BTree<StringItem> = serde_json::from_value(json).unwrap();
        assert!(read.is_empty());
    }
}
