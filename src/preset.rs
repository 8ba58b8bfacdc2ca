use serde::{Deserialize, Serialize};

/// Server representation of a style preset. `image_url` points at the
/// stored preview image, when one was uploaded.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StylePresetRecord {
    pub id: String,
    pub name: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// An image selected for upload: raw bytes plus the file name the server
/// stores alongside them.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The form's working model. Field values live here between edits; the
/// wire payload is derived from this on save.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetFormData {
    pub name: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub image: Option<ImageFile>,
}

impl PresetFormData {
    /// Initial field values for editing an existing preset. The stored
    /// image is referenced by URL, not re-uploaded, so the image field
    /// starts empty either way.
    pub fn from_record(record: &StylePresetRecord) -> Self {
        Self {
            name: record.name.clone(),
            positive_prompt: record.positive_prompt.clone(),
            negative_prompt: record.negative_prompt.clone(),
            image: None,
        }
    }
}

/// Wire payload for preset create/update. Field-for-field image of the
/// form model under the API's names; the mapping is total so a new form
/// field cannot silently miss the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct StylePresetPayload {
    pub name: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub image: Option<ImageFile>,
}

impl From<PresetFormData> for StylePresetPayload {
    fn from(data: PresetFormData) -> Self {
        let PresetFormData {
            name,
            positive_prompt,
            negative_prompt,
            image,
        } = data;
        Self {
            name,
            positive_prompt,
            negative_prompt,
            image,
        }
    }
}
