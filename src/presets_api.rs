use crate::{
    client::{encode_path_segment, ApiClient},
    error::ApiError,
    preset::{StylePresetPayload, StylePresetRecord},
};
use async_trait::async_trait;
use log::info;
use reqwest::{
    multipart::{Form, Part},
    Method,
};

/// The preset endpoints behind a seam, so the form controller can be
/// driven against a test double as easily as against the live server.
#[async_trait]
pub trait StylePresetStore: Send + Sync {
    async fn create_style_preset(
        &self,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError>;

    async fn update_style_preset(
        &self,
        id: &str,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError>;

    async fn list_style_presets(&self) -> Result<Vec<StylePresetRecord>, ApiError>;

    async fn delete_style_preset(&self, id: &str) -> Result<(), ApiError>;
}

fn payload_form(payload: StylePresetPayload) -> Form {
    let mut form = Form::new()
        .text("name", payload.name)
        .text("positive_prompt", payload.positive_prompt)
        .text("negative_prompt", payload.negative_prompt);
    if let Some(image) = payload.image {
        form = form.part("image", Part::bytes(image.bytes).file_name(image.file_name));
    }
    form
}

#[async_trait]
impl StylePresetStore for ApiClient {
    async fn create_style_preset(
        &self,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError> {
        let record: StylePresetRecord = self
            .send_multipart(Method::POST, "stylePresets", payload_form(payload))
            .await?;
        info!("Created style preset {} ({})", record.name, record.id);
        Ok(record)
    }

    async fn update_style_preset(
        &self,
        id: &str,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError> {
        let path = format!("stylePresets/{}", encode_path_segment(id));
        let record: StylePresetRecord = self
            .send_multipart(Method::PATCH, &path, payload_form(payload))
            .await?;
        info!("Updated style preset {} ({})", record.name, record.id);
        Ok(record)
    }

    async fn list_style_presets(&self) -> Result<Vec<StylePresetRecord>, ApiError> {
        self.get_json("stylePresets", &[]).await
    }

    async fn delete_style_preset(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("stylePresets/{}", encode_path_segment(id));
        self.delete(&path).await?;
        info!("Deleted style preset {id}");
        Ok(())
    }
}
