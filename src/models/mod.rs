use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Roadmap template as returned by `GET /templates/`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Backend soft-disable flag. Older payloads omit it.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub order_index: i32,

    /// Parent section within the same template. `None` (or an id that is not in
    /// the fetched list) makes this a root.
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub template_id: Option<String>,
}

/// A section with its children resolved by `tree::build_section_tree`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SectionNode {
    pub section: Section,
    pub children: Vec<SectionNode>,
}

impl SectionNode {
    pub fn id(&self) -> &str {
        &self.section.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Editor payload. Opaque to this crate: it is stored, compared and handed back,
/// never inspected.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub(crate) struct Document(pub serde_json::Value);

impl Document {
    /// What a section without an entry shows.
    pub fn empty() -> Self {
        Self(serde_json::json!({ "blocks": [] }))
    }

    /// Treats `null`, `{}` and documents without blocks alike.
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map
                .get("blocks")
                .and_then(|b| b.as_array())
                .map(|b| b.is_empty())
                .unwrap_or(true),
            _ => false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Entry {
    pub id: String,
    #[serde(default)]
    pub content: Document,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Favorites listing row: an entry plus the title of the section it belongs to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Favorite {
    pub id: String,
    #[serde(default)]
    pub content: Document,
    #[serde(default = "default_true")]
    pub is_favorite: bool,
    #[serde(default)]
    pub section_title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SaveEntryRequest {
    pub content: Document,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct FavoriteRequest {
    pub is_favorite: bool,
}
