use std::fmt;

/// Cache tag namespace, one per model family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    MainModel,
    LoraModel,
    ControlNetModel,
    TextualInversionModel,
    VaeModel,
}

impl TagKind {
    pub const ALL: [TagKind; 5] = [
        TagKind::MainModel,
        TagKind::LoraModel,
        TagKind::ControlNetModel,
        TagKind::TextualInversionModel,
        TagKind::VaeModel,
    ];
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagKind::MainModel => "MainModel",
            TagKind::LoraModel => "LoRAModel",
            TagKind::ControlNetModel => "ControlNetModel",
            TagKind::TextualInversionModel => "TextualInversionModel",
            TagKind::VaeModel => "VaeModel",
        };
        f.write_str(label)
    }
}

/// A cache-invalidation marker. `List` is the sentinel meaning "the whole
/// collection for this family"; `Entity` is scoped to one derived model id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    List(TagKind),
    Entity(TagKind, String),
}

impl CacheTag {
    pub fn kind(&self) -> TagKind {
        match self {
            CacheTag::List(kind) => *kind,
            CacheTag::Entity(kind, _) => *kind,
        }
    }
}
