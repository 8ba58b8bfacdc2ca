use crate::{
    model::{model_id, ModelRecord},
    tags::CacheTag,
};
use std::collections::HashMap;

/// A model config paired with its derived id.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelEntity<T> {
    pub id: String,
    pub config: T,
}

/// Normalized lookup table for one model family: an ordered id list plus an
/// id → entity map, sorted ascending by model name. Rebuilt wholesale on
/// every successful fetch; writes never patch entries in place.
#[derive(Clone, Debug, Default)]
pub struct EntityTable<T> {
    ids: Vec<String>,
    entities: HashMap<String, ModelEntity<T>>,
}

impl<T: ModelRecord> EntityTable<T> {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            entities: HashMap::new(),
        }
    }

    /// Replaces the whole table with the given configs. Duplicate identity
    /// triples collapse to one entry, last occurrence wins.
    pub fn set_all(configs: Vec<T>) -> Self {
        let mut entities: HashMap<String, ModelEntity<T>> = HashMap::new();
        for config in configs {
            let id = model_id(config.base_model(), config.model_type(), config.name());
            entities.insert(id.clone(), ModelEntity { id, config });
        }

        let mut ids: Vec<String> = entities.keys().cloned().collect();
        ids.sort_by(|a, b| {
            let left = entities[a].config.name();
            let right = entities[b].config.name();
            left.cmp(right).then_with(|| a.cmp(b))
        });

        Self { ids, entities }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn get(&self, id: &str) -> Option<&ModelEntity<T>> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entities in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntity<T>> {
        self.ids.iter().map(|id| &self.entities[id])
    }

    /// Tags a fetch of this table provides to the cache layer: the family's
    /// list sentinel first, then one tag per entity id. An empty table
    /// provides only the sentinel.
    pub fn provided_tags(&self) -> Vec<CacheTag> {
        let mut tags = Vec::with_capacity(self.ids.len() + 1);
        tags.push(CacheTag::List(T::TAG_KIND));
        for id in &self.ids {
            tags.push(CacheTag::Entity(T::TAG_KIND, id.clone()));
        }
        tags
    }
}
