use std::{collections::HashMap, hash::Hash};

/// Assigns dense integer indices to keys, in first-seen order.
///
/// Indices start at `0` and never change once given out. They are
/// used as row and column positions in the [`IncidenceMatrix`].
///
/// ```
/// # use nettomo_core::Registry;
/// let mut registry = Registry::new();
/// assert_eq!(registry.get_or_create_id("a"), 0);
/// assert_eq!(registry.get_or_create_id("b"), 1);
/// assert_eq!(registry.get_or_create_id("a"), 0);
/// ```
///
/// [`IncidenceMatrix`]: crate::incidence::IncidenceMatrix
#[derive(Debug, Clone)]
pub struct Registry<K> {
    ids: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K> Registry<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// return the index of `key`, registering it with the next free
    /// index if it was never seen before.
    pub fn get_or_create_id(&mut self, key: K) -> usize {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }

        let id = self.keys.len();
        self.ids.insert(key.clone(), id);
        self.keys.push(key);
        id
    }

    /// lookup an already registered key.
    pub fn get(&self, key: &K) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// the key that was given the index `id`.
    pub fn key(&self, id: usize) -> Option<&K> {
        self.keys.get(id)
    }

    /// all the registered keys, ordered by their index.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K> Default for Registry<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
