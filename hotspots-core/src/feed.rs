//! Conversion of annotation cue-point responses into hotspots

use crate::hotspot::{ClickAction, Hotspot, RawLayout, Styles};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use tracing::{debug, warn};

/// Response of an annotation list request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CuePointListResponse {
    #[serde(default)]
    pub objects: Vec<CuePointRecord>,
}

/// A single annotation cue point as delivered by the annotation service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePointRecord {
    pub id: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    /// JSON document encoded as a string
    #[serde(default)]
    pub partner_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartnerData {
    #[serde(default)]
    schema_version: Value,
    #[serde(default)]
    layout: RawLayout,
    #[serde(default)]
    styles: Value,
    #[serde(default)]
    on_click: Option<Value>,
}

/// Parses a response body and converts it
pub fn parse_response(json: &str) -> Result<Vec<Hotspot>> {
    let response: CuePointListResponse = serde_json::from_str(json)?;
    Ok(convert_response(&response))
}

/// Reads a response body from a reader and converts it
pub fn read_response<R: Read>(reader: R) -> Result<Vec<Hotspot>> {
    let response: CuePointListResponse = serde_json::from_reader(reader)?;
    Ok(convert_response(&response))
}

/// Converts cue points, skipping those without usable partner data
pub fn convert_response(response: &CuePointListResponse) -> Vec<Hotspot> {
    response.objects.iter().filter_map(convert_record).collect()
}

fn convert_record(record: &CuePointRecord) -> Option<Hotspot> {
    let Some(raw) = record.partner_data.as_deref().filter(|s| !s.is_empty()) else {
        warn!(id = %record.id, "annotation has no partner data, skipping");
        return None;
    };

    let partner: PartnerData = match serde_json::from_str(raw) {
        Ok(partner) => partner,
        Err(e) => {
            warn!(id = %record.id, error = %e, "annotation partner data is not valid, skipping");
            return None;
        }
    };

    if !is_truthy(&partner.schema_version) {
        warn!(id = %record.id, "annotation has no schema version, skipping");
        return None;
    }

    let start_time_ms = record.start_time.map(to_millis);
    if !start_time_ms.is_some_and(|t| t >= 0) {
        debug!(
            id = %record.id,
            ?start_time_ms,
            "annotation has no valid start time, it will never show"
        );
    }

    Some(Hotspot {
        id: record.id.clone(),
        start_time_ms,
        end_time_ms: record.end_time.map(to_millis),
        label: record.text.clone(),
        raw_layout: partner.layout,
        styles: convert_styles(&record.id, &partner.styles),
        on_click: partner
            .on_click
            .as_ref()
            .and_then(|value| convert_click(&record.id, value)),
    })
}

/// Keeps string values and stringifies numbers and booleans
fn convert_styles(id: &str, value: &Value) -> Styles {
    let map = match value {
        Value::Null => return Styles::new(),
        Value::Object(map) => map,
        other => {
            warn!(id, styles = %other, "annotation styles are not an object, ignoring");
            return Styles::new();
        }
    };

    map.iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    warn!(id, key = %key, value = %other, "unsupported style value, dropping");
                    return None;
                }
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Reads a click action; an unusable one leaves the hotspot without a click
fn convert_click(id: &str, value: &Value) -> Option<ClickAction> {
    if value.is_null() {
        return None;
    }

    let url = || {
        value
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    };

    let action = match value.get("type").and_then(Value::as_str) {
        Some("openUrl") => url().map(|url| ClickAction::OpenUrl { url }),
        Some("openUrlInNewTab") => url().map(|url| ClickAction::OpenUrlInNewTab { url }),
        Some("jumpToTime") => value
            .get("jumpToTime")
            .and_then(Value::as_f64)
            .map(|t| ClickAction::JumpToTime {
                jump_to_time: to_millis(t),
            }),
        _ => None,
    };

    if action.is_none() {
        warn!(id, on_click = %value, "annotation click action is not usable, disabling click");
    }
    action
}

fn to_millis(t: f64) -> i64 {
    t.round() as i64
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
