use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use crate::models::Memory;

/// Search hits scoring below this are noise and never enter the list.
pub const SEARCH_SIMILARITY_FLOOR: f64 = 0.10;

/// Category name that selects every memory.
pub const ALL_CATEGORIES: &str = "all";

/// Drops repeated ids (first occurrence wins) and hits under the floor.
/// Hits without a score are kept.
pub fn sanitize_search_results(results: Vec<Memory>) -> Vec<Memory> {
    let mut seen = HashSet::with_capacity(results.len());

    results
        .into_iter()
        .filter(|memory| {
            memory
                .similarity_score
                .is_none_or(|score| score >= SEARCH_SIMILARITY_FLOOR)
        })
        .filter(|memory| seen.insert(memory.id))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MemoryListState {
    memories: Vec<Memory>,
    expanded: HashSet<Uuid>,
}

impl MemoryListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Wholesale overwrite, used for recency fetches. Nothing is filtered.
    pub fn replace(&mut self, memories: Vec<Memory>) {
        self.memories = memories;
        self.prune_expanded();
    }

    pub fn replace_with_search_results(&mut self, results: Vec<Memory>) {
        self.replace(sanitize_search_results(results));
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Memory> {
        if category == ALL_CATEGORIES {
            return self.memories.iter().collect();
        }

        self.memories
            .iter()
            .filter(|memory| memory.has_category(category))
            .collect()
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.memories
            .iter()
            .flat_map(|memory| memory.categories.iter().cloned())
            .collect()
    }

    pub fn toggle_expanded(&mut self, id: Uuid) -> bool {
        if !self.memories.iter().any(|memory| memory.id == id) {
            return false;
        }
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        self.expanded.contains(&id)
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    fn prune_expanded(&mut self) {
        let present: HashSet<Uuid> = self.memories.iter().map(|memory| memory.id).collect();
        self.expanded.retain(|id| present.contains(id));
    }
}
