//! Ordered, identifier-unique entity collection.
//!
//! # Invariants
//! - Insertion order of the source sequence is preserved.
//! - The first element carrying a given identifier wins; later duplicates
//!   are dropped during construction.

use crate::model::entity::Entity;
use log::warn;
use std::collections::HashSet;

/// Ordered sequence of entities keyed by their unique identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from an arbitrary sequence, dropping elements whose
    /// identifier was already seen.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let total = items.len();
        let items: Vec<T> = items
            .into_iter()
            .filter(|item| seen.insert(item.id().clone()))
            .collect();

        let dropped = total - items.len();
        if dropped > 0 {
            warn!(
                "event=collection_dedupe module=model status=ok resource={} dropped={}",
                T::RESOURCE,
                dropped
            );
        }

        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Returns the element with identifier `id`, if present.
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Returns identifiers in collection order.
    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }

    /// Returns a copy of this collection without the element(s) matching `id`.
    ///
    /// Returns `None` when nothing matched, so callers can skip publishing an
    /// unchanged value.
    pub fn without(&self, id: &T::Id) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl<T: Entity> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Entity> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::model::entity::Entity;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Entity for Item {
        type Id = u32;
        const RESOURCE: &'static str = "items";

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn item(id: u32, label: &'static str) -> Item {
        Item { id, label }
    }

    #[test]
    fn from_vec_keeps_order_and_first_duplicate() {
        let collection = Collection::from_vec(vec![
            item(2, "b"),
            item(1, "a"),
            item(2, "b-duplicate"),
        ]);

        assert_eq!(collection.ids(), vec![2, 1]);
        assert_eq!(collection.get(&2).map(|i| i.label), Some("b"));
    }

    #[test]
    fn without_removes_matching_element() {
        let collection = Collection::from_vec(vec![item(1, "a"), item(2, "b")]);

        let remaining = collection.without(&1).expect("id 1 should match");
        assert_eq!(remaining.ids(), vec![2]);
        assert_eq!(collection.len(), 2, "source collection stays untouched");
    }

    #[test]
    fn without_returns_none_for_unknown_id() {
        let collection = Collection::from_vec(vec![item(1, "a")]);
        assert!(collection.without(&9).is_none());
    }

    #[test]
    fn empty_collection_reports_empty() {
        let collection: Collection<Item> = Collection::new();
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
    }
}
