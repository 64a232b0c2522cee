use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

/// Anything the cache stores is keyed by its server-assigned id.
pub trait Identified {
    fn id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// IdList
// ---------------------------------------------------------------------------

/// Insertion-ordered collection keyed by id.
///
/// Every mutation goes through the id index, so an id can never appear
/// twice. Items are held behind `Arc` so cloning a list (to produce the next
/// state) only copies pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct IdList<T> {
    items: Vec<Arc<T>>,
    ids: HashSet<String>,
}

impl<T> Default for IdList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }
}

impl<T: Identified> IdList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from server results, keeping the first occurrence of each id.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut list = Self::default();
        for item in items {
            list.push_back(item);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<T>> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn find<P>(&self, predicate: P) -> Option<&Arc<T>>
    where
        P: Fn(&T) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id()).collect()
    }

    /// Append `item` unless its id is already present. Returns whether it was added.
    pub fn push_back(&mut self, item: T) -> bool {
        if self.ids.contains(item.id()) {
            return false;
        }
        self.ids.insert(item.id().to_string());
        self.items.push(Arc::new(item));
        true
    }

    /// Prepend `item` unless its id is already present. Returns whether it was added.
    pub fn push_front(&mut self, item: T) -> bool {
        if self.ids.contains(item.id()) {
            return false;
        }
        self.ids.insert(item.id().to_string());
        self.items.insert(0, Arc::new(item));
        true
    }

    /// Swap in a newer copy of an existing item, keeping its position.
    /// Returns `false` (and leaves the list alone) when the id is unknown.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(pos) => {
                self.items[pos] = Arc::new(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<T>> {
        if !self.ids.remove(id) {
            return None;
        }
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }
}

impl<T: Serialize> Serialize for IdList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter().map(|item| item.as_ref()))
    }
}

impl<'de, T> Deserialize<'de> for IdList<T>
where
    T: Identified + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from_vec(items))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        label: String,
    }

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, label: &str) -> Item {
        Item {
            id: id.into(),
            label: label.into(),
        }
    }

    #[test]
    fn from_vec_keeps_first_occurrence() {
        let list = IdList::from_vec(vec![item("a", "1"), item("b", "2"), item("a", "3")]);
        assert_eq!(list.ids(), vec!["a", "b"]);
        assert_eq!(list.get("a").unwrap().label, "1");
    }

    #[test]
    fn push_front_and_back_reject_known_ids() {
        let mut list = IdList::from_vec(vec![item("a", "1")]);
        assert!(list.push_front(item("b", "2")));
        assert!(list.push_back(item("c", "3")));
        assert!(!list.push_front(item("c", "x")));
        assert!(!list.push_back(item("a", "x")));
        assert_eq!(list.ids(), vec!["b", "a", "c"]);
        assert_eq!(list.get("a").unwrap().label, "1");
    }

    #[test]
    fn replace_keeps_position() {
        let mut list = IdList::from_vec(vec![item("a", "1"), item("b", "2")]);
        assert!(list.replace(item("a", "new")));
        assert!(!list.replace(item("z", "nope")));
        assert_eq!(list.ids(), vec!["a", "b"]);
        assert_eq!(list.get("a").unwrap().label, "new");
    }

    #[test]
    fn remove_updates_index() {
        let mut list = IdList::from_vec(vec![item("a", "1"), item("b", "2")]);
        assert!(list.remove("a").is_some());
        assert!(list.remove("a").is_none());
        assert!(!list.contains("a"));
        assert!(list.push_back(item("a", "again")));
        assert_eq!(list.ids(), vec!["b", "a"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let list = IdList::from_vec(vec![item("a", "1")]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json, serde_json::json!([{"id": "a", "label": "1"}]));

        let back: IdList<Item> =
            serde_json::from_str(r#"[{"id":"x","label":"1"},{"id":"x","label":"2"}]"#).unwrap();
        assert_eq!(back.len(), 1);
    }
}
