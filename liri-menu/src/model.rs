//! Catalog record shapes as returned by the content API
//!
//! Records are immutable snapshots: they are classified, formatted and
//! projected into presentation nodes but never modified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Language every renderable record must carry
pub const REQUIRED_LANGUAGE: &str = "en";

/// Text that is either a language map (`{"en": "...", "gr": "..."}`) or a plain string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, Option<String>>),
}

impl LocalizedText {
    /// Non-empty entry for `language`
    pub fn get(&self, language: &str) -> Option<&str> {
        match self {
            LocalizedText::Plain(text) => non_empty(text),
            LocalizedText::Localized(map) => map
                .get(language)
                .and_then(|v| v.as_deref())
                .and_then(non_empty),
        }
    }

    /// Preferred language, falling back to English
    pub fn resolve(&self, language: &str) -> Option<&str> {
        self.get(language).or_else(|| self.get(REQUIRED_LANGUAGE))
    }

    /// Whether the required English entry (or a plain string) is present
    pub fn has_required(&self) -> bool {
        self.get(REQUIRED_LANGUAGE).is_some()
    }
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// One `{size, price}` entry of a spirit's variant list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceVariant {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Referenced label record (only the name is projected)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// A catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub glass_price: Option<f64>,
    #[serde(default)]
    pub bottle_price: Option<f64>,
    #[serde(default)]
    pub variants: Option<Vec<PriceVariant>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub beer_type: Option<String>,
    /// Serving size in ml; numeric or free text
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub grape_varieties: Option<LocalizedText>,
    #[serde(default)]
    pub cocktail_tags: Option<Vec<Option<TagRef>>>,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub order_rank: Option<Value>,
    /// Projected fields without a dedicated slot (boolean flags used by filters)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuItemRecord {
    /// Display title, or `None` when the record fails title validation
    pub fn display_title(&self, language: &str) -> Option<&str> {
        let title = self.title.as_ref()?;
        if !title.has_required() {
            return None;
        }
        title.resolve(language)
    }

    pub fn display_description(&self, language: &str) -> Option<&str> {
        self.description.as_ref().and_then(|d| d.resolve(language))
    }

    pub fn display_grape_varieties(&self, language: &str) -> Option<&str> {
        self.grape_varieties.as_ref().and_then(|g| g.resolve(language))
    }

    /// Names of the referenced tags, skipping unresolved references
    pub fn tag_names(&self) -> Vec<&str> {
        self.cocktail_tags
            .iter()
            .flatten()
            .flatten()
            .filter_map(|tag| tag.name.as_deref())
            .filter_map(non_empty)
            .collect()
    }

    pub fn is_new(&self) -> bool {
        self.is_new.unwrap_or(false)
    }

    /// Serving size as text (`330`, `"50"`), if any
    pub fn size_label(&self) -> Option<String> {
        match self.size.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => non_empty(s).map(str::to_string),
            _ => None,
        }
    }

    /// Boolean flag by its wire name; absent or non-boolean reads as `false`
    pub fn flag(&self, field: &str) -> bool {
        if field == "isNew" {
            return self.is_new();
        }
        self.extra.get(field).and_then(Value::as_bool).unwrap_or(false)
    }
}
