pub mod catalog;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod form;
pub mod model;
pub mod preset;
pub mod presets_api;
pub mod tags;

pub use catalog::ModelCatalog;
pub use client::ApiClient;
pub use config::{ConfigStore, ConsoleSettings};
pub use entity::{EntityTable, ModelEntity};
pub use error::ApiError;
pub use form::{
    DefaultFieldResolver, Notification, NotificationStatus, PresetFieldDefaults, PresetForm,
    SaveOutcome,
};
pub use model::{
    model_id, BaseModel, ControlNetModelConfig, LoraModelConfig, MainModelConfig, ModelRecord,
    ModelType, TextualInversionModelConfig, VaeModelConfig,
};
pub use preset::{ImageFile, PresetFormData, StylePresetPayload, StylePresetRecord};
pub use presets_api::StylePresetStore;
pub use tags::{CacheTag, TagKind};
