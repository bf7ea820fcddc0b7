//! Check documents against their schema's field kinds and rules.
use super::{ArrayMember, DocumentSchema, Field, FieldKind, Rule};
use crate::document::{json_kind, Document};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex, PoisonError};

/// `Rule::Regex` patterns compiled on first use.
static PATTERNS: LazyLock<Mutex<HashMap<&'static str, Option<Regex>>>> =
    LazyLock::new(Default::default);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path, with `[i]` for array items.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation in `document`, in field declaration order.
pub fn validate(schema: &DocumentSchema, document: &Document) -> Vec<Violation> {
    let mut out = Vec::new();
    validate_fields(&schema.fields, &document.fields, "", &mut out);
    out
}

fn validate_fields(fields: &[Field], parent: &Map<String, Value>, prefix: &str, out: &mut Vec<Violation>) {
    for field in fields {
        if is_hidden(field, parent) {
            continue;
        }
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        validate_field(field, parent.get(field.name), &path, out);
    }
}

fn is_hidden(field: &Field, parent: &Map<String, Value>) -> bool {
    field.hidden_unless.as_ref().is_some_and(|condition| {
        parent.get(condition.sibling).and_then(Value::as_str) != Some(condition.equals)
    })
}

fn validate_field(field: &Field, value: Option<&Value>, path: &str, out: &mut Vec<Violation>) {
    let mut push = |message: String| {
        out.push(Violation {
            path: path.to_string(),
            message,
        })
    };

    let value = match value {
        None | Some(Value::Null) => {
            if field.is_required() {
                push("required".to_string());
            }
            return;
        }
        Some(value) => value,
    };

    if let Err(message) = check_kind(&field.kind, value) {
        push(message);
        return;
    }

    for rule in &field.validation {
        if let Err(message) = check_rule(rule, value) {
            push(message);
        }
    }

    validate_children(&field.kind, value, path, out);
}

fn validate_children(kind: &FieldKind, value: &Value, path: &str, out: &mut Vec<Violation>) {
    match (kind, value) {
        (FieldKind::Object { fields }, Value::Object(map)) => {
            validate_fields(fields, map, path, out);
        }
        (FieldKind::Array { of, .. }, Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                let Some(member) = member_for(of, item) else {
                    out.push(Violation {
                        path: item_path,
                        message: format!(
                            "item type is not one of {}",
                            of.iter()
                                .map(|m| m.kind.type_name())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    });
                    continue;
                };
                if let Err(message) = check_kind(&member.kind, item) {
                    out.push(Violation {
                        path: item_path,
                        message,
                    });
                    continue;
                }
                validate_children(&member.kind, item, &item_path, out);
            }
        }
        _ => {}
    }
}

/// Pick the array member an item belongs to: the only one, or the one
/// named by the item's `_type`.
fn member_for<'a>(of: &'a [ArrayMember], item: &Value) -> Option<&'a ArrayMember> {
    if let [only] = of {
        return Some(only);
    }
    let item_type = item.get("_type").and_then(Value::as_str)?;
    of.iter().find(|member| member.kind.type_name() == item_type)
}

fn check_kind(kind: &FieldKind, value: &Value) -> Result<(), String> {
    let expected = match kind {
        FieldKind::String { .. }
        | FieldKind::Text
        | FieldKind::Url
        | FieldKind::Date
        | FieldKind::Datetime => "string",
        FieldKind::Number => "number",
        FieldKind::Boolean => "boolean",
        FieldKind::Array { .. } => "array",
        FieldKind::Slug { .. }
        | FieldKind::Image { .. }
        | FieldKind::Reference { .. }
        | FieldKind::Object { .. }
        | FieldKind::Block => "object",
    };
    let found = json_kind(value);
    if found != expected {
        return Err(format!("expected {expected}, found {found}"));
    }

    match kind {
        FieldKind::Date => {
            let text = value.as_str().unwrap_or_default();
            if !is_iso_date(text) {
                return Err(format!("expected date as YYYY-MM-DD, found {text:?}"));
            }
        }
        FieldKind::Reference { .. } => {
            if value.get("_ref").and_then(Value::as_str).is_none() {
                return Err("reference has no _ref".to_string());
            }
        }
        FieldKind::Slug { .. } => {
            if !value.get("current").is_some_and(Value::is_string) {
                return Err("slug has no current value".to_string());
            }
        }
        _ => {}
    }
    Ok(())
}

fn is_iso_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

fn check_rule(rule: &Rule, value: &Value) -> Result<(), String> {
    match rule {
        Rule::Required => {
            let empty = match value {
                Value::String(text) => text.trim().is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map
                    .get("current")
                    .and_then(Value::as_str)
                    .is_some_and(|current| current.trim().is_empty()),
                _ => false,
            };
            if empty {
                return Err("required".to_string());
            }
        }
        Rule::Min(bound) => match value {
            Value::Number(number) => {
                if number.as_f64().is_some_and(|n| n < *bound) {
                    return Err(format!("must be at least {}", format_bound(*bound)));
                }
            }
            Value::String(text) => {
                if (text.chars().count() as f64) < *bound {
                    return Err(format!("must be at least {} characters", format_bound(*bound)));
                }
            }
            _ => {}
        },
        Rule::Max(bound) => match value {
            Value::Number(number) => {
                if number.as_f64().is_some_and(|n| n > *bound) {
                    return Err(format!("must be at most {}", format_bound(*bound)));
                }
            }
            Value::String(text) => {
                if (text.chars().count() as f64) > *bound {
                    return Err(format!("must be at most {} characters", format_bound(*bound)));
                }
            }
            _ => {}
        },
        Rule::Length(expected) => {
            if let Some(text) = value.as_str() {
                if text.chars().count() != *expected {
                    return Err(format!("must be exactly {expected} characters"));
                }
            }
        }
        Rule::Regex(pattern) => {
            if let (Some(text), Some(regex)) = (value.as_str(), compiled(*pattern)) {
                if !regex.is_match(text) {
                    return Err(format!("does not match pattern {pattern}"));
                }
            }
        }
        Rule::Uri { schemes } => {
            if let Some(text) = value.as_str() {
                let scheme = text.split_once("://").map(|(scheme, _)| scheme);
                let allowed = scheme.is_some_and(|scheme| {
                    schemes
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
                });
                if !allowed {
                    return Err(format!("URL scheme must be one of {}", schemes.join(", ")));
                }
            }
        }
    }
    Ok(())
}

/// A broken pattern is a catalog bug, not a document problem: it is logged
/// and the rule is skipped.
fn compiled(pattern: &'static str) -> Option<Regex> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(pattern)
        .or_insert_with(|| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::error!(pattern, error = %err, "invalid schema pattern");
                None
            }
        })
        .clone()
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::find;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn messages(violations: &[Violation]) -> Vec<String> {
        violations.iter().map(ToString::to_string).collect()
    }

    fn collect_patterns(kind: &FieldKind, out: &mut Vec<&'static str>) {
        match kind {
            FieldKind::Object { fields } => {
                for field in fields {
                    for rule in &field.validation {
                        if let Rule::Regex(pattern) = rule {
                            out.push(*pattern);
                        }
                    }
                    collect_patterns(&field.kind, out);
                }
            }
            FieldKind::Array { of, .. } => {
                for member in of {
                    collect_patterns(&member.kind, out);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn every_catalog_pattern_compiles() {
        let mut patterns = Vec::new();
        for schema in crate::schema::catalog() {
            collect_patterns(
                &FieldKind::Object {
                    fields: schema.fields,
                },
                &mut patterns,
            );
        }
        assert!(patterns.contains(&"^#[0-9A-Fa-f]{6}$"), "{patterns:?}");
        for pattern in patterns {
            assert!(compiled(pattern).is_some(), "{pattern} does not compile");
        }
    }

    #[test]
    fn broken_pattern_is_not_a_document_violation() {
        assert_eq!(check_rule(&Rule::Regex("(unclosed"), &json!("anything")), Ok(()));
        assert!(compiled("(unclosed").is_none());
    }

    #[test]
    fn legacy_team_member_name_is_flagged() {
        let schema = find("teamMember").unwrap();
        let legacy = doc(json!({"_id": "a", "_type": "teamMember", "name": "Jean Dupont"}));
        assert_eq!(
            messages(&validate(&schema, &legacy)),
            vec!["name: expected object, found string"]
        );

        let migrated = doc(json!({
            "_id": "a",
            "_type": "teamMember",
            "name": {"fr": "Jean Dupont", "en": "Jean Dupont", "ru": "Jean Dupont"},
            "role": {"fr": "Directeur", "en": "Director"}
        }));
        assert!(validate(&schema, &migrated).is_empty());
    }

    #[test]
    fn localized_fields_require_french_and_english() {
        let schema = find("teamMember").unwrap();
        let member = doc(json!({
            "_id": "a",
            "_type": "teamMember",
            "name": {"fr": "Jean", "en": ""},
            "role": {"en": "Director"}
        }));
        assert_eq!(
            messages(&validate(&schema, &member)),
            vec!["name.en: required", "role.fr: required"]
        );
    }

    #[test]
    fn statistics_rules_cover_bounds_length_and_pattern() {
        let schema = find("exportStatistics").unwrap();
        let stats = doc(json!({
            "_id": "exportStatistics",
            "_type": "exportStatistics",
            "lastUpdated": "2026-09-30",
            "kpi": {"tonnesExported": 45000, "tracedLots": 100},
            "exportsByRegion": [
                {"_key": "r1", "region": "eu", "percentage": 60},
                {"_key": "r2", "region": "asia", "percentage": 140}
            ],
            "topDestinations": [
                {"_key": "d1", "country": "France", "countryCode": "FRA", "percentage": 20}
            ],
            "monthlyVolumes": [
                {"_key": "m1", "month": "Jan", "year": 2019, "volume": 1200}
            ],
            "productMix": [
                {"_key": "p1", "product": "Cacao", "slug": "cacao", "volume": 100, "percentage": 50, "color": "8B4513"}
            ]
        }));
        assert_eq!(
            messages(&validate(&schema, &stats)),
            vec![
                "kpi.tonnesExported: must be at most 40000",
                "exportsByRegion[1].percentage: must be at most 100",
                "topDestinations[0].countryCode: must be exactly 2 characters",
                "monthlyVolumes[0].year: must be at least 2020",
                "productMix[0].color: does not match pattern ^#[0-9A-Fa-f]{6}$",
            ]
        );
    }

    #[test]
    fn statistics_date_must_be_iso() {
        let schema = find("exportStatistics").unwrap();
        let stats = doc(json!({"_id": "s", "_type": "exportStatistics", "lastUpdated": "30/09/2026"}));
        assert_eq!(
            messages(&validate(&schema, &stats)),
            vec!["lastUpdated: expected date as YYYY-MM-DD, found \"30/09/2026\""]
        );
    }

    #[test]
    fn article_checks_slug_video_scheme_and_hidden_author_fields() {
        let schema = find("article").unwrap();
        let article = doc(json!({
            "_id": "post",
            "_type": "article",
            "title": {"fr": "Récolte 2026", "en": "2026 harvest"},
            "slug": {"_type": "slug", "current": ""},
            "publishedAt": "2026-10-01T08:00:00Z",
            "excerpt": {"fr": "x".repeat(201)},
            "video": {"url": "ftp://example.com/clip.mp4"},
            "author": {"authorType": "team", "externalName": 42},
            "content": {"fr": [{"_type": "block"}, {"_type": "video"}]}
        }));
        assert_eq!(
            messages(&validate(&schema, &article)),
            vec![
                "slug: required",
                "excerpt.fr: must be at most 200 characters",
                "content.fr[1]: item type is not one of block, image",
                "video.url: URL scheme must be one of http, https",
            ]
        );
    }

    #[test]
    fn product_requires_category_and_reference_shape() {
        let product = find("product").unwrap();
        let missing = doc(json!({
            "_id": "p",
            "_type": "product",
            "name": {"fr": "Cacao", "en": "Cocoa"},
            "slug": {"current": "cacao"}
        }));
        assert_eq!(messages(&validate(&product, &missing)), vec!["category: required"]);

        let article = find("article").unwrap();
        let bad_ref = doc(json!({
            "_id": "post",
            "_type": "article",
            "title": {"fr": "a", "en": "a"},
            "slug": {"current": "a"},
            "publishedAt": "2026-10-01T08:00:00Z",
            "relatedProducts": [{"_type": "reference", "_ref": "p"}, {"id": "q"}]
        }));
        assert_eq!(
            messages(&validate(&article, &bad_ref)),
            vec!["relatedProducts[1]: reference has no _ref"]
        );
    }
}
