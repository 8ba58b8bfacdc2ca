use crate::tags::TagKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base architecture a model was trained against, as the server reports it.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum BaseModel {
    #[serde(rename = "sd-1")]
    Sd1,
    #[serde(rename = "sd-2")]
    Sd2,
    #[serde(rename = "sdxl")]
    Sdxl,
    #[serde(rename = "sdxl-refiner")]
    SdxlRefiner,
}

impl BaseModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseModel::Sd1 => "sd-1",
            BaseModel::Sd2 => "sd-2",
            BaseModel::Sdxl => "sdxl",
            BaseModel::SdxlRefiner => "sdxl-refiner",
        }
    }
}

impl fmt::Display for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BaseModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sd-1" => Ok(BaseModel::Sd1),
            "sd-2" => Ok(BaseModel::Sd2),
            "sdxl" => Ok(BaseModel::Sdxl),
            "sdxl-refiner" => Ok(BaseModel::SdxlRefiner),
            other => Err(format!("unknown base model {other:?}")),
        }
    }
}

/// Discriminator the server uses both as the `model_type` query parameter
/// and as the `type` field on each returned config.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Main,
    Lora,
    Controlnet,
    Embedding,
    Vae,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Main => "main",
            ModelType::Lora => "lora",
            ModelType::Controlnet => "controlnet",
            ModelType::Embedding => "embedding",
            ModelType::Vae => "vae",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model family's record shape, viewed through the fields every family
/// shares. The `(base_model, model_type, name)` triple is the record's
/// identity; the server enforces its uniqueness per family.
pub trait ModelRecord: Clone {
    /// Query-parameter discriminator for this family's list endpoint.
    const MODEL_TYPE: ModelType;
    /// Cache tag namespace for this family.
    const TAG_KIND: TagKind;

    fn base_model(&self) -> BaseModel;
    fn model_type(&self) -> ModelType;
    fn name(&self) -> &str;
}

/// Derived client-side identity: a pure function of the identity triple.
/// Re-deriving after a re-fetch must yield the same id; the cache relies
/// on that for coherency.
pub fn model_id(base_model: BaseModel, model_type: ModelType, name: &str) -> String {
    format!("{base_model}/{model_type}/{name}")
}

macro_rules! model_record_impl {
    ($config:ty, $model_type:expr, $tag_kind:expr) => {
        impl ModelRecord for $config {
            const MODEL_TYPE: ModelType = $model_type;
            const TAG_KIND: TagKind = $tag_kind;

            fn base_model(&self) -> BaseModel {
                self.base_model
            }

            fn model_type(&self) -> ModelType {
                self.model_type
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MainModelConfig {
    pub name: String,
    pub base_model: BaseModel,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vae: Option<String>,
}

model_record_impl!(MainModelConfig, ModelType::Main, TagKind::MainModel);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LoraModelConfig {
    pub name: String,
    pub base_model: BaseModel,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format: Option<String>,
}

model_record_impl!(LoraModelConfig, ModelType::Lora, TagKind::LoraModel);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ControlNetModelConfig {
    pub name: String,
    pub base_model: BaseModel,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format: Option<String>,
}

model_record_impl!(
    ControlNetModelConfig,
    ModelType::Controlnet,
    TagKind::ControlNetModel
);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TextualInversionModelConfig {
    pub name: String,
    pub base_model: BaseModel,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format: Option<String>,
}

model_record_impl!(
    TextualInversionModelConfig,
    ModelType::Embedding,
    TagKind::TextualInversionModel
);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VaeModelConfig {
    pub name: String,
    pub base_model: BaseModel,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format: Option<String>,
}

model_record_impl!(VaeModelConfig, ModelType::Vae, TagKind::VaeModel);

/// Envelope the list endpoint wraps every family's results in.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelListResponse<T> {
    #[serde(default = "Vec::new")]
    pub models: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_config(base: BaseModel, name: &str) -> MainModelConfig {
        MainModelConfig {
            name: name.to_string(),
            base_model: base,
            model_type: ModelType::Main,
            path: None,
            description: None,
            model_format: None,
            variant: None,
            vae: None,
        }
    }

    #[test]
    fn model_id_is_deterministic() {
        let a = main_config(BaseModel::Sd1, "a-model");
        let b = main_config(BaseModel::Sd1, "a-model");
        assert_eq!(
            model_id(a.base_model(), a.model_type(), a.name()),
            model_id(b.base_model(), b.model_type(), b.name()),
        );
    }

    #[test]
    fn model_id_distinct_for_distinct_triples() {
        let ids = [
            model_id(BaseModel::Sd1, ModelType::Main, "a-model"),
            model_id(BaseModel::Sd2, ModelType::Main, "a-model"),
            model_id(BaseModel::Sd1, ModelType::Lora, "a-model"),
            model_id(BaseModel::Sd1, ModelType::Main, "b-model"),
        ];
        for (i, left) in ids.iter().enumerate() {
            for right in ids.iter().skip(i + 1) {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn model_id_joins_triple_with_slashes() {
        assert_eq!(
            model_id(BaseModel::Sd1, ModelType::Main, "a-model"),
            "sd-1/main/a-model"
        );
        assert_eq!(
            model_id(BaseModel::Sdxl, ModelType::Embedding, "easy-negative"),
            "sdxl/embedding/easy-negative"
        );
    }

    #[test]
    fn wire_enums_follow_server_spelling() {
        let base: BaseModel = serde_json::from_str("\"sd-1\"").unwrap();
        assert_eq!(base, BaseModel::Sd1);
        let ty: ModelType = serde_json::from_str("\"embedding\"").unwrap();
        assert_eq!(ty, ModelType::Embedding);
        assert_eq!(
            serde_json::to_string(&BaseModel::SdxlRefiner).unwrap(),
            "\"sdxl-refiner\""
        );
    }

    #[test]
    fn list_response_tolerates_missing_models_field() {
        let parsed: ModelListResponse<MainModelConfig> = serde_json::from_str("{}").unwrap();
        assert!(parsed.models.is_empty());
    }
}
