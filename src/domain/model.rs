use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Primary join key between map layers.
pub const PPI_FIELD: &str = "PPI";
/// Unix-epoch-millisecond modification timestamp on the modified-parcels layer.
pub const MODDATE_FIELD: &str = "MODDATE";
/// Schedule number, used to build detail-page URLs.
pub const SCHEDULE_FIELD: &str = "Schedule";

/// One record returned by the map service. Geometry is never requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Feature {
    /// Canonical string form of the PPI attribute. PPI arrives as either a
    /// JSON string or a number depending on the layer.
    pub fn ppi_key(&self) -> Option<String> {
        attribute_key(self.attributes.get(PPI_FIELD)?)
    }

    pub fn moddate_ms(&self) -> Option<i64> {
        self.attributes.get(MODDATE_FIELD).and_then(|v| v.as_i64())
    }
}

fn attribute_key(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A layer snapshot in the service's wire shape. `fields` is kept as raw JSON
/// so a written snapshot reads back structurally identical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "displayFieldName", default)]
    pub display_field_name: String,

    #[serde(rename = "fieldAliases", default)]
    pub field_aliases: HashMap<String, String>,

    #[serde(default)]
    pub fields: Vec<serde_json::Value>,

    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn unique_ppi_count(&self) -> usize {
        let ppis: HashSet<String> = self.features.iter().filter_map(Feature::ppi_key).collect();
        ppis.len()
    }
}

/// One (label, display name) extraction target on a detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSpec {
    pub label: String,
    pub display: String,
}

impl LabelSpec {
    pub fn new(label: &str, display: &str) -> Self {
        Self {
            label: label.to_string(),
            display: display.to_string(),
        }
    }
}

/// Display-name to extracted value mapping from one detail page. Labels that
/// were not found on the page simply have no entry; empty strings are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailRecord {
    pub fields: HashMap<String, String>,
}

impl DetailRecord {
    pub fn get(&self, display: &str) -> Option<&str> {
        self.fields.get(display).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One cross-reference hit: a recently modified parcel whose PPI exists in
/// the schedule-layer snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "PPI")]
    pub ppi: String,

    #[serde(rename = "Modified Date")]
    pub modified_date: String,

    #[serde(rename = "Raw Modified Date")]
    pub raw_modified_date: Option<i64>,

    #[serde(rename = "MODTYPE Attributes")]
    pub modtype_attributes: HashMap<String, serde_json::Value>,

    #[serde(rename = "Schedule ID Attributes")]
    pub schedule_attributes: HashMap<String, serde_json::Value>,
}

impl MatchRecord {
    /// Schedule number from the snapshot side, for detail-page URLs.
    pub fn schedule(&self) -> Option<String> {
        attribute_key(self.schedule_attributes.get(SCHEDULE_FIELD)?)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JoinSummary {
    pub candidates: usize,
    pub matches: usize,
}

impl JoinSummary {
    pub fn percent(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.matches as f64 / self.candidates as f64 * 100.0
        }
    }
}
