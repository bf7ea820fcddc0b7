//! Content schemas for the studio: document shapes, field rules, previews.
//!
//! Everything here is data. [`catalog`] returns the four document types the
//! site publishes; [`validate`] checks fetched documents against them.
use crate::config;
use crate::document::Locale;
use crate::preview::PreviewSpec;
use serde::Serialize;
use serde_json::Value;

mod article;
mod export_statistics;
mod product;
mod team_member;
pub mod validate;

pub(crate) use export_statistics::REGIONS;
pub use validate::{validate, Violation};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSchema {
    pub name: &'static str,
    pub title: &'static str,
    /// Exactly one published document is expected.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub singleton: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub fields: Vec<Field>,
    pub preview: PreviewSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orderings: Vec<Ordering>,
}

impl DocumentSchema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_unless: Option<Condition>,
}

/// Field type plus its type-specific options.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    String {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        list: Vec<ListOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        layout: Option<&'static str>,
    },
    Text,
    Number,
    Boolean,
    Date,
    Datetime,
    Url,
    #[serde(rename_all = "camelCase")]
    Slug {
        source: &'static str,
        max_length: u32,
    },
    Image {
        hotspot: bool,
    },
    Reference {
        to: Vec<&'static str>,
    },
    Object {
        fields: Vec<Field>,
    },
    Array {
        of: Vec<ArrayMember>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        list: Vec<ListOption>,
    },
    Block,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Datetime => "datetime",
            FieldKind::Url => "url",
            FieldKind::Slug { .. } => "slug",
            FieldKind::Image { .. } => "image",
            FieldKind::Reference { .. } => "reference",
            FieldKind::Object { .. } => "object",
            FieldKind::Array { .. } => "array",
            FieldKind::Block => "block",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayMember {
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewSpec>,
}

impl ArrayMember {
    pub fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            preview: None,
        }
    }

    pub fn object(fields: Vec<Field>, preview: PreviewSpec) -> Self {
        Self {
            kind: FieldKind::Object { fields },
            preview: Some(preview),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOption {
    pub title: &'static str,
    pub value: &'static str,
}

/// Validation rules, checked by [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum Rule {
    Required,
    /// Lower bound: numeric value, or character count for strings.
    Min(f64),
    /// Upper bound: numeric value, or character count for strings.
    Max(f64),
    /// Exact character count.
    Length(usize),
    Regex(&'static str),
    Uri { schemes: Vec<&'static str> },
}

/// The field is shown only while a sibling field has a given value.
#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    pub sibling: &'static str,
    pub equals: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ordering {
    pub title: &'static str,
    pub name: &'static str,
    pub by: Vec<OrderBy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Ordering {
    pub fn by(title: &'static str, name: &'static str, field: &'static str, direction: Direction) -> Self {
        Self {
            title,
            name,
            by: vec![OrderBy { field, direction }],
        }
    }
}

impl Field {
    pub fn new(name: &'static str, title: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            title,
            description: None,
            kind,
            validation: Vec::new(),
            initial_value: None,
            read_only: false,
            hidden_unless: None,
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.validation.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn min(self, bound: f64) -> Self {
        self.rule(Rule::Min(bound))
    }

    pub fn max(self, bound: f64) -> Self {
        self.rule(Rule::Max(bound))
    }

    pub fn initial(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden_unless(mut self, sibling: &'static str, equals: &'static str) -> Self {
        self.hidden_unless = Some(Condition { sibling, equals });
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation.contains(&Rule::Required)
    }
}

pub(crate) fn string(name: &'static str, title: &'static str) -> Field {
    Field::new(
        name,
        title,
        FieldKind::String {
            list: Vec::new(),
            layout: None,
        },
    )
}

pub(crate) fn string_list(
    name: &'static str,
    title: &'static str,
    options: &[(&'static str, &'static str)],
) -> Field {
    Field::new(
        name,
        title,
        FieldKind::String {
            list: list_options(options),
            layout: None,
        },
    )
}

pub(crate) fn list_options(options: &[(&'static str, &'static str)]) -> Vec<ListOption> {
    options
        .iter()
        .map(|&(title, value)| ListOption { title, value })
        .collect()
}

pub(crate) fn text(name: &'static str, title: &'static str) -> Field {
    Field::new(name, title, FieldKind::Text)
}

pub(crate) fn number(name: &'static str, title: &'static str) -> Field {
    Field::new(name, title, FieldKind::Number)
}

pub(crate) fn boolean(name: &'static str, title: &'static str) -> Field {
    Field::new(name, title, FieldKind::Boolean)
}

pub(crate) fn url(name: &'static str, title: &'static str) -> Field {
    Field::new(name, title, FieldKind::Url)
}

pub(crate) fn image(name: &'static str, title: &'static str) -> Field {
    Field::new(name, title, FieldKind::Image { hotspot: true })
}

pub(crate) fn slug(name: &'static str, source: &'static str) -> Field {
    Field::new(
        name,
        "Slug",
        FieldKind::Slug {
            source,
            max_length: 96,
        },
    )
    .required()
}

pub(crate) fn object(name: &'static str, title: &'static str, fields: Vec<Field>) -> Field {
    Field::new(name, title, FieldKind::Object { fields })
}

pub(crate) fn array(name: &'static str, title: &'static str, of: Vec<ArrayMember>) -> Field {
    Field::new(
        name,
        title,
        FieldKind::Array {
            of,
            list: Vec::new(),
        },
    )
}

/// Array of plain strings picked from a fixed list.
pub(crate) fn tag_list(
    name: &'static str,
    title: &'static str,
    options: &[(&'static str, &'static str)],
) -> Field {
    Field::new(
        name,
        title,
        FieldKind::Array {
            of: vec![ArrayMember::of(string_kind())],
            list: list_options(options),
        },
    )
}

pub(crate) fn string_kind() -> FieldKind {
    FieldKind::String {
        list: Vec::new(),
        layout: None,
    }
}

pub(crate) fn locale_title(locale: Locale) -> &'static str {
    match locale {
        Locale::Fr => "Français",
        Locale::En => "English",
        Locale::Ru => "Русский",
    }
}

/// `{fr, en, ru}` object; `make` builds each per-locale field.
pub(crate) fn localized(
    name: &'static str,
    title: &'static str,
    make: fn(&'static str, &'static str) -> Field,
) -> Field {
    let fields = Locale::ALL
        .iter()
        .map(|&locale| make(locale.as_str(), locale_title(locale)))
        .collect();
    object(name, title, fields)
}

/// Localized string with French and English required.
pub(crate) fn localized_required(name: &'static str, title: &'static str) -> Field {
    let fields = Locale::ALL
        .iter()
        .map(|&locale| {
            let field = string(locale.as_str(), locale_title(locale));
            if locale.is_required() {
                field.required()
            } else {
                field
            }
        })
        .collect();
    object(name, title, fields)
}

pub(crate) fn seo() -> Field {
    object(
        "seo",
        "SEO",
        vec![
            localized("metaTitle", "Meta Title", string),
            localized("metaDescription", "Meta Description", text),
        ],
    )
}

pub(crate) fn display_order() -> Field {
    number("order", "Ordre d'affichage").initial(Value::from(0))
}

/// The whole studio workspace: identity, plugins and document types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    pub name: &'static str,
    pub title: &'static str,
    pub project_id: &'static str,
    pub dataset: &'static str,
    pub plugins: Vec<&'static str>,
    pub types: Vec<DocumentSchema>,
}

pub fn studio() -> Studio {
    Studio {
        name: config::STUDIO_NAME,
        title: config::STUDIO_TITLE,
        project_id: config::DEFAULT_PROJECT_ID,
        dataset: config::DEFAULT_DATASET,
        plugins: config::STUDIO_PLUGINS.to_vec(),
        types: catalog(),
    }
}

/// Every document type the studio registers.
pub fn catalog() -> Vec<DocumentSchema> {
    vec![
        article::schema(),
        product::schema(),
        team_member::schema(),
        export_statistics::schema(),
    ]
}

/// Look up one document type by name.
pub fn find(name: &str) -> Option<DocumentSchema> {
    catalog().into_iter().find(|schema| schema.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_registers_four_unique_types() {
        let names: Vec<_> = catalog().iter().map(|schema| schema.name).collect();
        assert_eq!(names, vec!["article", "product", "teamMember", "exportStatistics"]);
        let unique: BTreeSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn field_names_are_unique_per_type() {
        for schema in catalog() {
            let mut seen = BTreeSet::new();
            for field in &schema.fields {
                assert!(seen.insert(field.name), "{}.{} declared twice", schema.name, field.name);
            }
        }
    }

    #[test]
    fn team_member_name_is_localized_and_required() {
        let schema = find("teamMember").unwrap();
        let name = schema.field("name").unwrap();
        assert!(name.is_required());
        let FieldKind::Object { fields } = &name.kind else {
            panic!("name should be an object");
        };
        let required: Vec<_> = fields
            .iter()
            .map(|field| (field.name, field.is_required()))
            .collect();
        assert_eq!(required, vec![("fr", true), ("en", true), ("ru", false)]);
    }

    #[test]
    fn serializes_like_studio_definitions() {
        let schema = find("article").unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["name"], "article");
        let slug = &json["fields"][1];
        assert_eq!(slug["type"], "slug");
        assert_eq!(slug["source"], "title.fr");
        assert_eq!(slug["maxLength"], 96);
        assert_eq!(slug["validation"][0]["rule"], "required");
        assert_eq!(json["orderings"][0]["by"][0]["direction"], "desc");
    }

    #[test]
    fn studio_wraps_the_catalog() {
        let json = serde_json::to_value(studio()).unwrap();
        assert_eq!(json["name"], "default");
        assert_eq!(json["title"], "scpb");
        assert_eq!(json["projectId"], "0b1e7ens");
        assert_eq!(json["dataset"], "production");
        assert_eq!(json["plugins"], serde_json::json!(["structureTool", "visionTool"]));
        assert_eq!(json["types"].as_array().unwrap().len(), catalog().len());
    }

    #[test]
    fn unknown_type_is_none() {
        assert!(find("page").is_none());
    }
}
