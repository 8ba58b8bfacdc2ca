use crate::{
    preset::{ImageFile, PresetFormData, StylePresetPayload, StylePresetRecord},
    presets_api::StylePresetStore,
};

/// Resolves initial field values for the form. The default resolver seeds
/// from the record being edited, or empty fields for a new preset; hosts
/// with their own notion of defaults can substitute their own.
pub trait PresetFieldDefaults {
    fn resolve(&self, updating: Option<&StylePresetRecord>) -> PresetFormData;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFieldResolver;

impl PresetFieldDefaults for DefaultFieldResolver {
    fn resolve(&self, updating: Option<&StylePresetRecord>) -> PresetFormData {
        match updating {
            Some(record) => PresetFormData::from_record(record),
            None => PresetFormData::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationStatus {
    Error,
    Success,
}

/// What the host should show the user: a status plus a short title, the
/// same two values a toast sink takes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub status: NotificationStatus,
    pub title: String,
}

/// Everything `save` asks of its caller. Closing the editing surface and
/// clearing the currently-editing preset are unconditional: they are
/// requested whether the network call succeeded or failed.
#[derive(Clone, Debug)]
pub struct SaveOutcome {
    pub close_modal: bool,
    pub clear_editing: bool,
    pub notification: Option<Notification>,
    pub saved: Option<StylePresetRecord>,
}

const SAVE_FAILED_TITLE: &str = "Failed to save style preset";

/// Form controller for creating or editing one style preset. Holds the
/// working field values; `save` maps them to the wire payload and issues
/// the create-or-update call depending on whether an existing preset was
/// supplied at construction.
#[derive(Clone, Debug)]
pub struct PresetForm {
    updating: Option<StylePresetRecord>,
    fields: PresetFormData,
}

impl PresetForm {
    pub fn new(
        updating: Option<StylePresetRecord>,
        defaults: &dyn PresetFieldDefaults,
    ) -> Self {
        let fields = defaults.resolve(updating.as_ref());
        Self { updating, fields }
    }

    pub fn updating(&self) -> Option<&StylePresetRecord> {
        self.updating.as_ref()
    }

    pub fn fields(&self) -> &PresetFormData {
        &self.fields
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.name = name.into();
    }

    pub fn set_positive_prompt(&mut self, prompt: impl Into<String>) {
        self.fields.positive_prompt = prompt.into();
    }

    pub fn set_negative_prompt(&mut self, prompt: impl Into<String>) {
        self.fields.negative_prompt = prompt.into();
    }

    pub fn set_image(&mut self, image: Option<ImageFile>) {
        self.fields.image = image;
    }

    /// Saves the current field values. A failed call yields exactly one
    /// error notification and nothing else; the field values are left
    /// as-is. The outcome always requests closing the editing surface and
    /// clearing the currently-editing preset, regardless of the result.
    pub async fn save(&self, store: &dyn StylePresetStore) -> SaveOutcome {
        let payload = StylePresetPayload::from(self.fields.clone());

        let result = match &self.updating {
            Some(record) => store.update_style_preset(&record.id, payload).await,
            None => store.create_style_preset(payload).await,
        };

        match result {
            Ok(record) => SaveOutcome {
                close_modal: true,
                clear_editing: true,
                notification: None,
                saved: Some(record),
            },
            Err(_) => SaveOutcome {
                close_modal: true,
                clear_editing: true,
                notification: Some(Notification {
                    status: NotificationStatus::Error,
                    title: SAVE_FAILED_TITLE.to_string(),
                }),
                saved: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(StylePresetPayload),
        Update(String, StylePresetPayload),
    }

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<Call>>,
        fail: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn failure(&self) -> ApiError {
            ApiError::Status {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "validation failed".to_string(),
            }
        }
    }

    #[async_trait]
    impl StylePresetStore for RecordingStore {
        async fn create_style_preset(
            &self,
            payload: StylePresetPayload,
        ) -> Result<StylePresetRecord, ApiError> {
            self.calls.lock().unwrap().push(Call::Create(payload.clone()));
            if self.fail {
                return Err(self.failure());
            }
            Ok(StylePresetRecord {
                id: "created-1".to_string(),
                name: payload.name,
                positive_prompt: payload.positive_prompt,
                negative_prompt: payload.negative_prompt,
                image_url: None,
            })
        }

        async fn update_style_preset(
            &self,
            id: &str,
            payload: StylePresetPayload,
        ) -> Result<StylePresetRecord, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(id.to_string(), payload.clone()));
            if self.fail {
                return Err(self.failure());
            }
            Ok(StylePresetRecord {
                id: id.to_string(),
                name: payload.name,
                positive_prompt: payload.positive_prompt,
                negative_prompt: payload.negative_prompt,
                image_url: None,
            })
        }

        async fn list_style_presets(&self) -> Result<Vec<StylePresetRecord>, ApiError> {
            Ok(Vec::new())
        }

        async fn delete_style_preset(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn existing_record() -> StylePresetRecord {
        StylePresetRecord {
            id: "p1".to_string(),
            name: "Moody".to_string(),
            positive_prompt: "low key lighting".to_string(),
            negative_prompt: "overexposed".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn new_form_starts_from_empty_defaults() {
        let form = PresetForm::new(None, &DefaultFieldResolver);
        assert_eq!(form.fields(), &PresetFormData::default());
        assert!(form.updating().is_none());
    }

    #[test]
    fn editing_form_seeds_fields_from_the_record() {
        let form = PresetForm::new(Some(existing_record()), &DefaultFieldResolver);
        assert_eq!(form.fields().name, "Moody");
        assert_eq!(form.fields().positive_prompt, "low key lighting");
        assert_eq!(form.updating().unwrap().id, "p1");
    }

    #[tokio::test]
    async fn save_without_existing_preset_creates() {
        let store = RecordingStore::default();
        let mut form = PresetForm::new(None, &DefaultFieldResolver);
        form.set_name("Vivid");
        form.set_positive_prompt("vivid colors");

        let outcome = form.save(&store).await;

        assert_eq!(
            store.calls(),
            vec![Call::Create(StylePresetPayload {
                name: "Vivid".to_string(),
                positive_prompt: "vivid colors".to_string(),
                negative_prompt: String::new(),
                image: None,
            })]
        );
        assert!(outcome.close_modal);
        assert!(outcome.clear_editing);
        assert!(outcome.notification.is_none());
        assert_eq!(outcome.saved.unwrap().name, "Vivid");
    }

    #[tokio::test]
    async fn save_with_existing_preset_updates_by_id() {
        let store = RecordingStore::default();
        let mut form = PresetForm::new(Some(existing_record()), &DefaultFieldResolver);
        form.set_name("Moodier");

        let outcome = form.save(&store).await;

        match &store.calls()[..] {
            [Call::Update(id, payload)] => {
                assert_eq!(id, "p1");
                assert_eq!(payload.name, "Moodier");
                assert_eq!(payload.positive_prompt, "low key lighting");
            }
            other => panic!("expected a single update call, got {other:?}"),
        }
        assert!(outcome.notification.is_none());
        assert!(outcome.close_modal);
    }

    #[tokio::test]
    async fn failed_save_notifies_once_and_still_closes() {
        let store = RecordingStore::failing();
        let mut form = PresetForm::new(Some(existing_record()), &DefaultFieldResolver);
        form.set_name("Moodier");

        let outcome = form.save(&store).await;

        let notification = outcome.notification.expect("error notification");
        assert_eq!(notification.status, NotificationStatus::Error);
        assert_eq!(notification.title, "Failed to save style preset");
        assert!(outcome.close_modal);
        assert!(outcome.clear_editing);
        assert!(outcome.saved.is_none());
        // Field values are untouched by a failed save.
        assert_eq!(form.fields().name, "Moodier");
    }

    #[tokio::test]
    async fn failed_create_also_closes() {
        let store = RecordingStore::failing();
        let form = PresetForm::new(None, &DefaultFieldResolver);

        let outcome = form.save(&store).await;

        assert!(outcome.close_modal);
        assert!(outcome.clear_editing);
        assert!(outcome.notification.is_some());
    }
}
