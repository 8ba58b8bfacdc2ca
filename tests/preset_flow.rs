use async_trait::async_trait;
use latent_console::{
    ApiError, DefaultFieldResolver, NotificationStatus, PresetForm, StylePresetPayload,
    StylePresetRecord, StylePresetStore,
};
use reqwest::StatusCode;
use std::sync::Mutex;

/// In-memory preset store: enough behavior to drive the form controller
/// through the public API, plus a switch to make every write fail.
#[derive(Default)]
struct MemoryStore {
    presets: Mutex<Vec<StylePresetRecord>>,
    fail_writes: bool,
}

#[async_trait]
impl StylePresetStore for MemoryStore {
    async fn create_style_preset(
        &self,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError> {
        if self.fail_writes {
            return Err(write_failure());
        }
        let mut presets = self.presets.lock().unwrap();
        let record = StylePresetRecord {
            id: format!("preset-{}", presets.len() + 1),
            name: payload.name,
            positive_prompt: payload.positive_prompt,
            negative_prompt: payload.negative_prompt,
            image_url: None,
        };
        presets.push(record.clone());
        Ok(record)
    }

    async fn update_style_preset(
        &self,
        id: &str,
        payload: StylePresetPayload,
    ) -> Result<StylePresetRecord, ApiError> {
        if self.fail_writes {
            return Err(write_failure());
        }
        let mut presets = self.presets.lock().unwrap();
        let record = presets
            .iter_mut()
            .find(|preset| preset.id == id)
            .ok_or_else(|| ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: format!("no preset {id}"),
            })?;
        record.name = payload.name;
        record.positive_prompt = payload.positive_prompt;
        record.negative_prompt = payload.negative_prompt;
        Ok(record.clone())
    }

    async fn list_style_presets(&self) -> Result<Vec<StylePresetRecord>, ApiError> {
        Ok(self.presets.lock().unwrap().clone())
    }

    async fn delete_style_preset(&self, id: &str) -> Result<(), ApiError> {
        let mut presets = self.presets.lock().unwrap();
        let before = presets.len();
        presets.retain(|preset| preset.id != id);
        if presets.len() == before {
            return Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: format!("no preset {id}"),
            });
        }
        Ok(())
    }
}

fn write_failure() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "writes disabled".to_string(),
    }
}

#[tokio::test]
async fn create_then_edit_round_trip() {
    let store = MemoryStore::default();

    let mut form = PresetForm::new(None, &DefaultFieldResolver);
    form.set_name("Vivid");
    form.set_positive_prompt("vivid colors");
    let outcome = form.save(&store).await;
    assert!(outcome.notification.is_none());
    let created = outcome.saved.unwrap();

    let listed = store.list_style_presets().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let mut edit = PresetForm::new(Some(created.clone()), &DefaultFieldResolver);
    assert_eq!(edit.fields().positive_prompt, "vivid colors");
    edit.set_negative_prompt("washed out");
    let outcome = edit.save(&store).await;
    assert!(outcome.close_modal && outcome.clear_editing);

    let listed = store.list_style_presets().await.unwrap();
    assert_eq!(listed[0].negative_prompt, "washed out");
}

#[tokio::test]
async fn failed_save_reports_error_but_still_requests_close() {
    let store = MemoryStore {
        fail_writes: true,
        ..MemoryStore::default()
    };

    let mut form = PresetForm::new(None, &DefaultFieldResolver);
    form.set_name("Doomed");
    let outcome = form.save(&store).await;

    let notification = outcome.notification.expect("error notification");
    assert_eq!(notification.status, NotificationStatus::Error);
    assert!(outcome.close_modal);
    assert!(outcome.clear_editing);
    assert!(store.list_style_presets().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_the_preset() {
    let store = MemoryStore::default();

    let mut form = PresetForm::new(None, &DefaultFieldResolver);
    form.set_name("Short lived");
    let created = form.save(&store).await.saved.unwrap();

    store.delete_style_preset(&created.id).await.unwrap();
    assert!(store.list_style_presets().await.unwrap().is_empty());

    let err = store.delete_style_preset(&created.id).await.unwrap_err();
    assert!(err.is_not_found());
}
