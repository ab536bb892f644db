use crate::domain::model::{Feature, FeatureCollection, JoinSummary, MatchRecord};
use chrono::{Local, TimeZone};
use std::collections::HashMap;

/// PPI → feature index over a layer snapshot. Duplicate PPIs keep the later
/// feature (last write wins, matching snapshot accumulation order).
pub fn build_ppi_index(snapshot: &FeatureCollection) -> HashMap<String, &Feature> {
    let mut index = HashMap::new();
    for feature in &snapshot.features {
        if let Some(key) = feature.ppi_key() {
            index.insert(key, feature);
        }
    }
    index
}

/// Epoch-millisecond MODDATE to a human-readable local time. Absent or zero
/// timestamps render as "N/A".
pub fn format_moddate(ms: Option<i64>) -> String {
    ms.filter(|v| *v != 0)
        .and_then(|v| Local.timestamp_millis_opt(v).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Join candidates against the snapshot index in arrival order. Each hit
/// carries the allow-listed attributes from both sides; misses are skipped
/// silently.
pub fn cross_reference(
    index: &HashMap<String, &Feature>,
    candidates: &[Feature],
    modtype_fields: &[String],
    schedule_fields: &[String],
) -> (Vec<MatchRecord>, JoinSummary) {
    let mut matches = Vec::new();

    for candidate in candidates {
        let Some(key) = candidate.ppi_key() else {
            continue;
        };
        let Some(snapshot_feature) = index.get(&key) else {
            continue;
        };

        let moddate = candidate.moddate_ms();
        matches.push(MatchRecord {
            ppi: key,
            modified_date: format_moddate(moddate),
            raw_modified_date: moddate,
            modtype_attributes: project(&candidate.attributes, modtype_fields),
            schedule_attributes: project(&snapshot_feature.attributes, schedule_fields),
        });
    }

    let summary = JoinSummary {
        candidates: candidates.len(),
        matches: matches.len(),
    };
    (matches, summary)
}

fn project(
    attributes: &HashMap<String, serde_json::Value>,
    fields: &[String],
) -> HashMap<String, serde_json::Value> {
    fields
        .iter()
        .filter_map(|field| {
            attributes
                .get(field)
                .map(|value| (field.clone(), value.clone()))
        })
        .collect()
}

/// Detail-page URL for one schedule number.
pub fn detail_url(base: &str, schedule: &str) -> String {
    format!("{}?Schno={}", base, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PPI_FIELD;

    fn feature(pairs: &[(&str, serde_json::Value)]) -> Feature {
        let mut attributes = HashMap::new();
        for (key, value) in pairs {
            attributes.insert(key.to_string(), value.clone());
        }
        Feature { attributes }
    }

    fn snapshot(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            features,
            ..Default::default()
        }
    }

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_ppi_last_write_wins() {
        let snapshot = snapshot(vec![
            feature(&[(PPI_FIELD, serde_json::json!("P1")), ("Tag", serde_json::json!("A"))]),
            feature(&[(PPI_FIELD, serde_json::json!("P1")), ("Tag", serde_json::json!("B"))]),
        ]);
        let index = build_ppi_index(&snapshot);
        assert_eq!(index.len(), 1);
        assert_eq!(index["P1"].attributes["Tag"], serde_json::json!("B"));
    }

    #[test]
    fn test_index_skips_features_without_ppi() {
        let snapshot = snapshot(vec![
            feature(&[("OBJECTID", serde_json::json!(1))]),
            feature(&[(PPI_FIELD, serde_json::json!("P2"))]),
        ]);
        let index = build_ppi_index(&snapshot);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_join_preserves_candidate_order_and_reports_percentage() {
        let snapshot = snapshot(
            ["P1", "P3", "P5"]
                .iter()
                .map(|p| {
                    feature(&[
                        (PPI_FIELD, serde_json::json!(*p)),
                        ("Schedule", serde_json::json!(format!("S-{}", p))),
                    ])
                })
                .collect(),
        );
        let index = build_ppi_index(&snapshot);

        let candidates: Vec<Feature> = ["P5", "P2", "P3", "P4", "P1"]
            .iter()
            .map(|p| {
                feature(&[
                    (PPI_FIELD, serde_json::json!(*p)),
                    ("MODDATE", serde_json::json!(1_700_000_000_000_i64)),
                    ("MODTYPE", serde_json::json!("EDIT")),
                ])
            })
            .collect();

        let (matches, summary) = cross_reference(
            &index,
            &candidates,
            &strings(&["MODDATE", "MODTYPE"]),
            &strings(&["Schedule"]),
        );

        assert_eq!(matches.len(), 3);
        let order: Vec<&str> = matches.iter().map(|m| m.ppi.as_str()).collect();
        assert_eq!(order, vec!["P5", "P3", "P1"]);
        assert_eq!(summary.candidates, 5);
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.percent(), 60.0);
        assert_eq!(
            matches[0].schedule_attributes["Schedule"],
            serde_json::json!("S-P5")
        );
        assert_eq!(matches[0].schedule().as_deref(), Some("S-P5"));
    }

    #[test]
    fn test_projection_keeps_only_allowlisted_fields() {
        let snapshot = snapshot(vec![feature(&[
            (PPI_FIELD, serde_json::json!("P1")),
            ("Schedule", serde_json::json!(6507888)),
            ("OwnerAdd1", serde_json::json!("PO BOX 1")),
        ])]);
        let index = build_ppi_index(&snapshot);
        let candidates = vec![feature(&[
            (PPI_FIELD, serde_json::json!("P1")),
            ("AREA", serde_json::json!(1.5)),
            ("MODTYPE", serde_json::json!("NEW")),
        ])];

        let (matches, _) = cross_reference(
            &index,
            &candidates,
            &strings(&["MODTYPE"]),
            &strings(&["Schedule"]),
        );

        assert_eq!(matches[0].modtype_attributes.len(), 1);
        assert!(!matches[0].modtype_attributes.contains_key("AREA"));
        assert_eq!(matches[0].schedule_attributes.len(), 1);
        // Numeric schedule still builds a usable URL component.
        assert_eq!(matches[0].schedule().as_deref(), Some("6507888"));
    }

    #[test]
    fn test_missing_moddate_renders_na() {
        assert_eq!(format_moddate(None), "N/A");
        assert_eq!(format_moddate(Some(0)), "N/A");
        assert_ne!(format_moddate(Some(1_700_000_000_000)), "N/A");
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(
            detail_url("https://gis.example.gov/map/DetailData.aspx", "6507888"),
            "https://gis.example.gov/map/DetailData.aspx?Schno=6507888"
        );
    }
}
