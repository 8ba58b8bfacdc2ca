use crate::{
    client::{encode_path_segment, ApiClient},
    entity::EntityTable,
    error::ApiError,
    model::{
        BaseModel, ControlNetModelConfig, LoraModelConfig, MainModelConfig, ModelListResponse,
        ModelRecord, TextualInversionModelConfig, VaeModelConfig,
    },
    tags::{CacheTag, TagKind},
};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use tokio::sync::broadcast;

const INVALIDATION_CHANNEL_CAPACITY: usize = 16;

/// Cached table for one family plus the tags its fetch provided. A stale
/// slot keeps serving nothing until the next list call re-fetches it.
#[derive(Debug)]
struct Slot<T> {
    table: EntityTable<T>,
    tags: Vec<CacheTag>,
    stale: bool,
}

#[derive(Debug, Default)]
struct CatalogState {
    main: Option<Slot<MainModelConfig>>,
    lora: Option<Slot<LoraModelConfig>>,
    controlnet: Option<Slot<ControlNetModelConfig>>,
    embedding: Option<Slot<TextualInversionModelConfig>>,
    vae: Option<Slot<VaeModelConfig>>,
}

/// Projects one family's slot out of the shared state.
trait CatalogFamily: ModelRecord + DeserializeOwned {
    fn slot(state: &CatalogState) -> &Option<Slot<Self>>;
    fn slot_mut(state: &mut CatalogState) -> &mut Option<Slot<Self>>;
}

macro_rules! catalog_family_impl {
    ($config:ty, $field:ident) => {
        impl CatalogFamily for $config {
            fn slot(state: &CatalogState) -> &Option<Slot<Self>> {
                &state.$field
            }

            fn slot_mut(state: &mut CatalogState) -> &mut Option<Slot<Self>> {
                &mut state.$field
            }
        }
    };
}

catalog_family_impl!(MainModelConfig, main);
catalog_family_impl!(LoraModelConfig, lora);
catalog_family_impl!(ControlNetModelConfig, controlnet);
catalog_family_impl!(TextualInversionModelConfig, embedding);
catalog_family_impl!(VaeModelConfig, vae);

/// Normalized, tag-invalidated view of the server's model lists. Each of
/// the five families is fetched independently and cached as an entity
/// table; writes to the Main family invalidate its list sentinel so the
/// next read re-fetches. Concurrent list calls for different families may
/// interleave freely; each writes only its own slot.
#[derive(Debug)]
pub struct ModelCatalog {
    client: ApiClient,
    state: RwLock<CatalogState>,
    invalidations: broadcast::Sender<TagKind>,
}

impl ModelCatalog {
    pub fn new(client: ApiClient) -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            client,
            state: RwLock::new(CatalogState::default()),
            invalidations,
        }
    }

    pub async fn main_models(&self) -> Result<EntityTable<MainModelConfig>, ApiError> {
        self.list_family().await
    }

    pub async fn lora_models(&self) -> Result<EntityTable<LoraModelConfig>, ApiError> {
        self.list_family().await
    }

    pub async fn controlnet_models(&self) -> Result<EntityTable<ControlNetModelConfig>, ApiError> {
        self.list_family().await
    }

    pub async fn textual_inversion_models(
        &self,
    ) -> Result<EntityTable<TextualInversionModelConfig>, ApiError> {
        self.list_family().await
    }

    pub async fn vae_models(&self) -> Result<EntityTable<VaeModelConfig>, ApiError> {
        self.list_family().await
    }

    /// Replaces the named main model's config. On success the Main list
    /// sentinel is invalidated, forcing active list subscribers to
    /// re-fetch.
    pub async fn update_main_model(
        &self,
        base_model: BaseModel,
        model_name: &str,
        body: &MainModelConfig,
    ) -> Result<MainModelConfig, ApiError> {
        let path = main_model_path(base_model, model_name);
        let updated = self.client.patch_json(&path, body).await?;
        info!("Updated main model {base_model}/{model_name}");
        self.invalidate(&CacheTag::List(TagKind::MainModel));
        Ok(updated)
    }

    /// Removes the named main model. Same invalidation contract as
    /// [`ModelCatalog::update_main_model`].
    pub async fn delete_main_model(
        &self,
        base_model: BaseModel,
        model_name: &str,
    ) -> Result<(), ApiError> {
        let path = main_model_path(base_model, model_name);
        self.client.delete(&path).await?;
        info!("Deleted main model {base_model}/{model_name}");
        self.invalidate(&CacheTag::List(TagKind::MainModel));
        Ok(())
    }

    /// Invalidation events, one `TagKind` per family whose cached table
    /// went stale. Subscribers are expected to call the family's list
    /// operation again, which re-fetches because the slot is stale.
    pub fn subscribe(&self) -> broadcast::Receiver<TagKind> {
        self.invalidations.subscribe()
    }

    /// Marks every cached table whose provided tags include `tag` as stale
    /// and notifies subscribers. Entity-scoped tags touch only tables that
    /// actually returned that id; list sentinels touch the whole family.
    pub fn invalidate(&self, tag: &CacheTag) {
        let mut touched = Vec::new();
        {
            let mut state = self.state.write().expect("catalog state poisoned");
            macro_rules! touch {
                ($field:ident, $kind:expr) => {
                    if let Some(slot) = state.$field.as_mut() {
                        if !slot.stale && slot.tags.contains(tag) {
                            slot.stale = true;
                            touched.push($kind);
                        }
                    }
                };
            }
            touch!(main, TagKind::MainModel);
            touch!(lora, TagKind::LoraModel);
            touch!(controlnet, TagKind::ControlNetModel);
            touch!(embedding, TagKind::TextualInversionModel);
            touch!(vae, TagKind::VaeModel);
        }

        for kind in touched {
            debug!("Invalidated cached {kind} table");
            let _ = self.invalidations.send(kind);
        }
    }

    /// Tags the most recent successful fetch of `kind` provided, if any.
    pub fn provided_tags(&self, kind: TagKind) -> Option<Vec<CacheTag>> {
        let state = self.state.read().expect("catalog state poisoned");
        let tags = match kind {
            TagKind::MainModel => state.main.as_ref().map(|slot| slot.tags.clone()),
            TagKind::LoraModel => state.lora.as_ref().map(|slot| slot.tags.clone()),
            TagKind::ControlNetModel => state.controlnet.as_ref().map(|slot| slot.tags.clone()),
            TagKind::TextualInversionModel => {
                state.embedding.as_ref().map(|slot| slot.tags.clone())
            }
            TagKind::VaeModel => state.vae.as_ref().map(|slot| slot.tags.clone()),
        };
        tags
    }

    async fn list_family<T: CatalogFamily>(&self) -> Result<EntityTable<T>, ApiError> {
        if let Some(table) = self.cached::<T>() {
            return Ok(table);
        }

        // A failed fetch leaves any previous slot untouched, stale or not.
        let response: ModelListResponse<T> = self
            .client
            .get_json("models/", &[("model_type", T::MODEL_TYPE.as_str())])
            .await?;

        let table = EntityTable::set_all(response.models);
        debug!(
            "Fetched {} {} models",
            table.len(),
            T::MODEL_TYPE.as_str()
        );
        let tags = table.provided_tags();

        let mut state = self.state.write().expect("catalog state poisoned");
        *T::slot_mut(&mut state) = Some(Slot {
            table: table.clone(),
            tags,
            stale: false,
        });
        Ok(table)
    }

    // The read lock is released before any await point; concurrent family
    // fetches never contend beyond these short critical sections.
    fn cached<T: CatalogFamily>(&self) -> Option<EntityTable<T>> {
        let state = self.state.read().expect("catalog state poisoned");
        T::slot(&state)
            .as_ref()
            .filter(|slot| !slot.stale)
            .map(|slot| slot.table.clone())
    }

    #[cfg(test)]
    fn install_table<T: CatalogFamily>(&self, table: EntityTable<T>) {
        let tags = table.provided_tags();
        let mut state = self.state.write().expect("catalog state poisoned");
        *T::slot_mut(&mut state) = Some(Slot {
            table,
            tags,
            stale: false,
        });
    }

    #[cfg(test)]
    fn is_stale<T: CatalogFamily>(&self) -> bool {
        let state = self.state.read().expect("catalog state poisoned");
        T::slot(&state)
            .as_ref()
            .map(|slot| slot.stale)
            .unwrap_or(false)
    }
}

fn main_model_path(base_model: BaseModel, model_name: &str) -> String {
    format!(
        "models/{}/main/{}",
        base_model,
        encode_path_segment(model_name)
    )
}
