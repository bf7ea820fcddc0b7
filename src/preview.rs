//! List previews shown by the studio for documents and array items.
//!
//! A preview selects a few dotted paths from the value and formats them into a
//! title and subtitle. Most types show the selected fields verbatim; the export
//! statistics items format numbers and look up region labels.
use crate::schema::REGIONS;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct PreviewSpec {
    /// Alias to dotted path, e.g. `title` -> `name.fr`.
    pub select: BTreeMap<&'static str, &'static str>,
    pub prepare: Prepare,
}

/// How selected values become a title and subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Prepare {
    /// `title`, `subtitle` and `media` aliases are shown as-is.
    Fields,
    ExportRegion,
    TopDestination,
    MonthlyVolume,
    ProductMix,
    ExportStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
}

impl PreviewSpec {
    pub fn new(select: &[(&'static str, &'static str)], prepare: Prepare) -> Self {
        Self {
            select: select.iter().copied().collect(),
            prepare,
        }
    }

    /// Render the preview for `value` (a document or an array item).
    pub fn render(&self, value: &Value) -> Preview {
        let selected: BTreeMap<&str, &Value> = self
            .select
            .iter()
            .filter_map(|(&alias, &path)| lookup(value, path).map(|found| (alias, found)))
            .collect();
        let get = |alias: &str| selected.get(alias).copied();
        let text = |alias: &str| get(alias).map(display).unwrap_or_default();

        let (title, subtitle, media) = match self.prepare {
            Prepare::Fields => (
                text("title"),
                get("subtitle").map(display),
                get("media").cloned(),
            ),
            Prepare::ExportRegion => {
                let region = text("region");
                let label = REGIONS
                    .iter()
                    .find(|(_, code)| *code == region)
                    .map(|(label, _)| label.to_string())
                    .unwrap_or(region);
                (label, Some(format!("{}%", text("percentage"))), None)
            }
            Prepare::TopDestination => {
                let port = text("port");
                (
                    format!("{} - {}%", text("country"), text("percentage")),
                    (!port.is_empty()).then(|| format!("Port: {port}")),
                    None,
                )
            }
            Prepare::MonthlyVolume => (
                format!("{} {}", text("month"), text("year")),
                Some(format!("{} tonnes", text("volume"))),
                None,
            ),
            Prepare::ProductMix => (
                format!("{} - {}%", text("product"), text("percentage")),
                Some(format!("{} tonnes", text("volume"))),
                None,
            ),
            Prepare::ExportStatistics => {
                let updated = text("lastUpdated");
                (
                    "Statistiques d'export".to_string(),
                    Some(if updated.is_empty() {
                        "Non configuré".to_string()
                    } else {
                        format!("Mis à jour: {updated}")
                    }),
                    None,
                )
            }
        };

        let title = if title.trim().is_empty() {
            fallback_title(value)
        } else {
            title
        };
        Preview {
            title,
            subtitle: subtitle.filter(|s| !s.is_empty()),
            media,
        }
    }
}

fn fallback_title(value: &Value) -> String {
    value
        .get("_id")
        .or_else(|| value.get("_key"))
        .and_then(Value::as_str)
        .unwrap_or("Untitled")
        .to_string()
}

/// Resolve a dotted path like `name.fr`.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
        .filter(|found| !found.is_null())
}

/// Template-literal style rendering of a scalar.
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => int.to_string(),
            (None, Some(float)) if float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
