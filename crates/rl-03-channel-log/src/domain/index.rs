use shared_types::Hash;
use std::collections::HashMap;
use std::sync::RwLock;

/// Append-only map from hashed topic to the entry ids filed under it.
///
/// Ids keep insertion order per topic and are deduplicated; re-indexing
/// the same entry (for example during a re-sync) is a no-op.
#[derive(Default)]
pub struct TopicIndex {
    topics: RwLock<HashMap<Hash, Vec<Hash>>>,
}

impl TopicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, topic: Hash, id: Hash) {
        if let Ok(mut topics) = self.topics.write() {
            let ids = topics.entry(topic).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    /// Entry ids filed under a topic, in index order.
    pub fn ids_for(&self, topic: &Hash) -> Vec<Hash> {
        self.topics
            .read()
            .ok()
            .and_then(|topics| topics.get(topic).cloned())
            .unwrap_or_default()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().map(|topics| topics.len()).unwrap_or(0)
    }
}
