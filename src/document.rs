//! Content-lake documents and localized field values.
//!
//! A document is opaque apart from its `_id` and `_type`; every other field is
//! kept as raw JSON so patches never drop data the crate does not model.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Id prefix the platform uses for unpublished draft copies.
pub const DRAFT_PREFIX: &str = "drafts.";

/// A single content record as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures.
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Draft shadows are pending revisions of a published document.
    pub fn is_draft(&self) -> bool {
        self.id.starts_with(DRAFT_PREFIX)
    }

    /// Whole document as JSON, system fields included.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("_id".to_string(), Value::String(self.id.clone()));
        map.insert("_type".to_string(), Value::String(self.doc_type.clone()));
        Value::Object(map)
    }
}

/// Languages the site publishes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Fr,
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Fr, Locale::En, Locale::Ru];

    pub const fn as_str(self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// French and English are mandatory on every localized field.
    pub const fn is_required(self) -> bool {
        matches!(self, Locale::Fr | Locale::En)
    }
}

/// A field value translated per locale. `ru` is optional on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedString {
    pub fr: String,
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru: Option<String>,
}

impl LocalizedString {
    /// Copy a single untranslated value into every requested locale.
    ///
    /// Required locales are always filled, so the result keeps `fr` and `en`
    /// even when `locales` omits them.
    pub fn duplicated(value: &str, locales: &[Locale]) -> Self {
        Self {
            fr: value.to_string(),
            en: value.to_string(),
            ru: locales
                .contains(&Locale::Ru)
                .then(|| value.to_string()),
        }
    }

    pub fn get(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::Fr => Some(&self.fr),
            Locale::En => Some(&self.en),
            Locale::Ru => self.ru.as_deref(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("fr".to_string(), Value::String(self.fr.clone()));
        map.insert("en".to_string(), Value::String(self.en.clone()));
        if let Some(ru) = &self.ru {
            map.insert("ru".to_string(), Value::String(ru.clone()));
        }
        Value::Object(map)
    }
}

/// Shape of a field as found in a fetched document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape<'a> {
    /// Plain string, written before the field was localized.
    Legacy(&'a str),
    /// Already a per-locale object.
    Localized(&'a Map<String, Value>),
    /// Missing or null.
    Absent,
    /// Anything else (number, bool, array).
    Unexpected(&'static str),
}

impl<'a> FieldShape<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldShape::Absent,
            Some(Value::String(text)) => FieldShape::Legacy(text),
            Some(Value::Object(map)) => FieldShape::Localized(map),
            Some(other) => FieldShape::Unexpected(json_kind(other)),
        }
    }
}

/// Human name of a JSON value's kind, used in messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
