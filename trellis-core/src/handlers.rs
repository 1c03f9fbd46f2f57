//! Handler Table
//!
//! Maps the handler ids of one render to the callbacks they stand for.
//!
//! Ids are render-scoped: every serialization pass produces a brand-new
//! table, and the host swaps it in wholesale. An id from a superseded render
//! is simply absent from the current table, so a late event can never reach
//! a callback from a different tree.

use indexmap::IndexMap;

use crate::widget::Handler;

/// Handler ids of one render, in the order the serializer met them.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    generation: u64,
    entries: IndexMap<String, Handler>,
}

impl HandlerTable {
    /// An empty table for the given render generation.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: IndexMap::new(),
        }
    }

    /// The render generation the ids belong to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn insert(&mut self, id: String, handler: Handler) {
        self.entries.insert(id, handler);
    }

    pub fn get(&self, id: &str) -> Option<&Handler> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Handler)> {
        self.entries.iter().map(|(id, handler)| (id.as_str(), handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let mut table = HandlerTable::new(3);
        table.insert("on_click_3_0".into(), Handler::new(|| {}));

        assert_eq!(table.generation(), 3);
        assert!(table.contains("on_click_3_0"));
        assert!(table.get("on_click_2_0").is_none());
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["on_click_3_0"]);
    }

    #[test]
    fn default_table_is_empty() {
        let table = HandlerTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.iter().count(), 0);
    }
}
