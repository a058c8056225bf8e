//! In-memory mirrors of server-side collections.
//!
//! An [`EntityCache`] is refreshed wholesale with [`EntityCache::load`] and
//! patched only after the server has confirmed a mutation. It never applies
//! a change speculatively, so there is nothing to roll back when a request
//! fails: the cache simply is not touched.

use std::collections::HashSet;

use taskmanager_core::Identified;

/// A server-ordered list of entities, at most one per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCache<T> {
    entries: Vec<T>,
}

impl<T> Default for EntityCache<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Identified> EntityCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with the server's collection.
    ///
    /// Anything previously cached is discarded. If the payload repeats an id,
    /// the last occurrence wins and keeps the first occurrence's position.
    pub fn load(&mut self, items: Vec<T>) {
        let mut entries: Vec<T> = Vec::with_capacity(items.len());
        let mut seen = HashSet::with_capacity(items.len());

        for item in items {
            let id = item.id();
            if seen.insert(id) {
                entries.push(item);
            } else if let Some(slot) = entries.iter_mut().find(|e| e.id() == id) {
                *slot = item;
            }
        }

        self.entries = entries;
    }

    /// Add a server-confirmed entity.
    ///
    /// The entity is appended; if its id is already cached the existing
    /// entry is replaced in place instead.
    pub fn apply_create(&mut self, item: T) {
        match self.position(item.id()) {
            Some(index) => {
                if let Some(slot) = self.entries.get_mut(index) {
                    *slot = item;
                }
            }
            None => self.entries.push(item),
        }
    }

    /// Replace the cached entity with the same id.
    ///
    /// Returns `false` (and changes nothing) if no entry matches.
    pub fn apply_update(&mut self, item: T) -> bool {
        let id = item.id();
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove the entity with `id`, returning it if it was cached.
    pub fn apply_delete(&mut self, id: T::Id) -> Option<T> {
        self.position(id).map(|index| self.entries.remove(index))
    }

    /// Look up an entity by id.
    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Whether an entity with `id` is cached.
    #[must_use]
    pub fn contains(&self, id: T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Cached ids in server order.
    #[must_use]
    pub fn ids(&self) -> Vec<T::Id> {
        self.entries.iter().map(Identified::id).collect()
    }

    fn position(&self, id: T::Id) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }
}

impl<T> EntityCache<T> {
    /// Cached entities in server order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Iterate over cached entities in server order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a EntityCache<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use taskmanager_core::TaskId;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: TaskId,
        label: &'static str,
    }

    impl Identified for Row {
        type Id = TaskId;

        fn id(&self) -> TaskId {
            self.id
        }
    }

    fn row(id: i64, label: &'static str) -> Row {
        Row {
            id: TaskId::new(id),
            label,
        }
    }

    fn ids(cache: &EntityCache<Row>) -> Vec<i64> {
        cache.ids().into_iter().map(i64::from).collect()
    }

    #[test]
    fn test_load_replaces_everything() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(1, "a"), row(2, "b")]);
        cache.apply_create(row(9, "local"));

        cache.load(vec![row(3, "c")]);
        assert_eq!(ids(&cache), vec![3]);
    }

    #[test]
    fn test_load_collapses_duplicate_ids() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(1, "old"), row(2, "b"), row(1, "new")]);
        assert_eq!(ids(&cache), vec![1, 2]);
        assert_eq!(cache.get(TaskId::new(1)).map(|r| r.label), Some("new"));
    }

    #[test]
    fn test_create_appends() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(3, "c")]);
        cache.apply_create(row(8, "h"));
        assert_eq!(ids(&cache), vec![3, 8]);
    }

    #[test]
    fn test_create_with_known_id_replaces() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(3, "c"), row(4, "d")]);
        cache.apply_create(row(3, "c2"));
        assert_eq!(ids(&cache), vec![3, 4]);
        assert_eq!(cache.get(TaskId::new(3)).map(|r| r.label), Some("c2"));
    }

    #[test]
    fn test_update_matches_by_id_not_position() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(3, "c"), row(5, "e"), row(7, "g")]);
        assert!(cache.apply_update(row(7, "g2")));
        assert_eq!(cache.as_slice().get(2).map(|r| r.label), Some("g2"));
        assert_eq!(ids(&cache), vec![3, 5, 7]);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(3, "c")]);
        assert!(!cache.apply_update(row(4, "d")));
        assert_eq!(ids(&cache), vec![3]);
    }

    #[test]
    fn test_delete() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(3, "c"), row(5, "e"), row(7, "g")]);
        let removed = cache.apply_delete(TaskId::new(5));
        assert_eq!(removed.map(|r| r.label), Some("e"));
        assert_eq!(ids(&cache), vec![3, 7]);

        assert_eq!(cache.apply_delete(TaskId::new(5)), None);
        assert_eq!(ids(&cache), vec![3, 7]);
    }

    #[test]
    fn test_mixed_sequence_keeps_one_entry_per_id() {
        let mut cache = EntityCache::new();
        cache.load(vec![row(1, "a"), row(2, "b"), row(3, "c")]);
        cache.apply_create(row(4, "d"));
        cache.apply_delete(TaskId::new(2));
        cache.apply_update(row(4, "d2"));
        cache.apply_create(row(5, "e"));
        cache.apply_update(row(2, "ghost"));
        cache.apply_delete(TaskId::new(9));

        assert_eq!(ids(&cache), vec![1, 3, 4, 5]);
        assert_eq!(cache.get(TaskId::new(4)).map(|r| r.label), Some("d2"));
        assert!(!cache.contains(TaskId::new(2)));
        assert_eq!(cache.len(), 4);
    }

    /// One server-confirmed mutation over a small id and label space.
    #[derive(Debug, Clone, Copy)]
    enum Mutation {
        Create(i64, &'static str),
        Update(i64, &'static str),
        Delete(i64),
    }

    type Model = Vec<(i64, &'static str)>;

    fn every_mutation() -> Vec<Mutation> {
        let mut all = Vec::new();
        for id in 1..=4 {
            for label in ["x", "y"] {
                all.push(Mutation::Create(id, label));
                all.push(Mutation::Update(id, label));
            }
            all.push(Mutation::Delete(id));
        }
        all
    }

    /// Reference behavior: an ordered list with one entry per id.
    fn apply_to_model(model: &mut Model, mutation: Mutation) {
        match mutation {
            Mutation::Create(id, label) => match model.iter_mut().find(|(i, _)| *i == id) {
                Some(entry) => entry.1 = label,
                None => model.push((id, label)),
            },
            Mutation::Update(id, label) => {
                if let Some(entry) = model.iter_mut().find(|(i, _)| *i == id) {
                    entry.1 = label;
                }
            }
            Mutation::Delete(id) => model.retain(|(i, _)| *i != id),
        }
    }

    fn apply_to_cache(cache: &mut EntityCache<Row>, model: &Model, mutation: Mutation) {
        let cached = |id: i64| model.iter().find(|(i, _)| *i == id).copied();
        match mutation {
            Mutation::Create(id, label) => cache.apply_create(row(id, label)),
            Mutation::Update(id, label) => {
                let applied = cache.apply_update(row(id, label));
                assert_eq!(applied, cached(id).is_some(), "update {id}");
            }
            Mutation::Delete(id) => {
                let removed = cache.apply_delete(TaskId::new(id));
                assert_eq!(
                    removed.map(|r| (i64::from(r.id), r.label)),
                    cached(id),
                    "delete {id}"
                );
            }
        }
    }

    fn snapshot(cache: &EntityCache<Row>) -> Model {
        cache.iter().map(|r| (i64::from(r.id), r.label)).collect()
    }

    fn explore(
        cache: &EntityCache<Row>,
        model: &Model,
        mutations: &[Mutation],
        depth: usize,
        trail: &mut Vec<Mutation>,
    ) {
        if depth == 0 {
            return;
        }
        for &mutation in mutations {
            let mut next_cache = cache.clone();
            let mut next_model = model.clone();
            // Return values are compared with the model before the mutation
            apply_to_cache(&mut next_cache, &next_model, mutation);
            apply_to_model(&mut next_model, mutation);
            trail.push(mutation);
            assert_eq!(snapshot(&next_cache), next_model, "after {trail:?}");
            explore(&next_cache, &next_model, mutations, depth - 1, trail);
            trail.pop();
        }
    }

    #[test]
    fn test_every_short_sequence_matches_ordered_model() {
        let mutations = every_mutation();
        let starts: [Model; 2] = [vec![], vec![(2, "x"), (4, "y")]];

        for start in starts {
            let mut cache = EntityCache::new();
            cache.load(start.iter().map(|&(id, label)| row(id, label)).collect());
            assert_eq!(snapshot(&cache), start);
            explore(&cache, &start, &mutations, 4, &mut Vec::new());
        }
    }

    #[test]
    fn test_empty() {
        let cache: EntityCache<Row> = EntityCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.iter().count(), 0);
    }
}
