use crate::domain::model::LabelSpec;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Map-service description: endpoints, layer ids, field allow-lists and
/// detail-page labels. Loadable from TOML; defaults describe the Summit
/// County parcel query tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service: ServiceSection,
    #[serde(default = "ServiceConfig::default_schedule_layer")]
    pub schedule_layer: LayerSection,
    #[serde(default = "ServiceConfig::default_modified_layer")]
    pub modified_layer: LayerSection,
    #[serde(default)]
    pub crossref: CrossRefSection,
    #[serde(default)]
    pub detail: DetailSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    /// MapServer base, without a trailing layer id.
    pub base_url: String,
    /// Detail-page endpoint, parameterized by schedule number.
    pub detail_url: String,
    /// Spatial reference passed as `outSR`.
    pub out_sr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSection {
    pub layer: u32,
    #[serde(default = "default_where_clause")]
    pub where_clause: String,
    #[serde(default)]
    pub order_by: Option<String>,
    /// Empty means all fields.
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossRefSection {
    #[serde(default = "default_modtype_fields")]
    pub modtype_fields: Vec<String>,
    #[serde(default = "default_schedule_match_fields")]
    pub schedule_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSection {
    #[serde(default = "default_table_class")]
    pub table_class: String,
    #[serde(default = "default_detail_labels")]
    pub labels: Vec<LabelSpec>,
}

fn default_where_clause() -> String {
    "1=1".to_string()
}

fn default_table_class() -> String {
    crate::core::detail::DETAIL_TABLE_CLASS.to_string()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_modtype_fields() -> Vec<String> {
    strings(&[
        "AREA", "PERIMETER", "OBJECTID", "PPI", "SOURCE", "MODDATE", "MODTYPE",
    ])
}

fn default_schedule_match_fields() -> Vec<String> {
    strings(&[
        "OBJECTID_1",
        "OBJECTID",
        "PPI",
        "Schedule",
        "EcoCode",
        "EcoDesc",
        "NhoodCode",
        "NhoodDescr",
        "SubCode",
        "SubName",
        "SecondID",
        "ShortDesc",
        "AddressID",
        "StreetID",
        "SitusAdd",
        "HouseNum",
        "FullStreet",
        "StreetName",
        "TownCode",
        "TownName",
        "OwnerAdd1",
        "OwnerAdd2",
        "OwnerCity",
        "OwnerState",
        "PostCode",
        "FullAdd",
        "TotAcres",
        "TotSqFt",
        "YearBuilt",
        "ExtWallMat",
        "ExtWallHgt",
        "HeatType",
        "SquareFeet",
        "SqeFtLiving",
        "Unfinished",
        "BsmtType",
        "GarageType",
        "NumOfCars",
        "GarSqFt",
        "NumOfRms",
        "NumBedRms",
        "NumLofts",
        "NumKitch",
        "MasterBath",
        "FullBath",
        "TqtrBaths",
        "HalfBaths",
        "QtrBaths",
        "TotBath",
        "MobHtitle",
        "FloorLevel",
        "ImpPos",
    ])
}

fn default_export_fields() -> Vec<String> {
    strings(&[
        "OBJECTID",
        "PPI",
        "EcoDesc",
        "SubName",
        "Filing",
        "ShortDesc",
        "HouseNum",
        "FullStreet",
        "StreetName",
        "TownCode",
        "TownName",
        "OwnerAdd1",
        "OwnerAdd2",
        "OwnerCity",
        "OwnerState",
        "PostCode",
        "FullAdd",
        "TotAcres",
        "TotSqFt",
        "MiscChar",
        "MiscCharID",
        "NumUnits",
        "YearBuilt",
        "SquareFeet",
        "SqeFtLiving",
        "Unfinished",
        "BsmtType",
        "GarageType",
        "NumOfCars",
        "GarSqFt",
        "NumOfRms",
        "NumBedRms",
        "NumLofts",
        "NumKitch",
        "MasterBath",
        "FullBath",
        "TqtrBaths",
        "HalfBaths",
        "QtrBaths",
        "TotBath",
        "MobHtitle",
        "FloorLevel",
    ])
}

fn default_detail_labels() -> Vec<LabelSpec> {
    [
        ("Property Desc:", "Property Description"),
        ("Phys. Address:", "Physical Address"),
        ("Primary:", "Primary Ownership"),
        ("Secondary:", "Secondary Ownership"),
        ("C/O", "Mailing Address - C/O"),
        ("Addr.", "Address"),
        ("CSZ", "Address - CSZ"),
        ("Sale Date", "Most Recent Sale Date"),
    ]
    .iter()
    .map(|(label, display)| LabelSpec::new(label, display))
    .collect()
}

impl Default for CrossRefSection {
    fn default() -> Self {
        Self {
            modtype_fields: default_modtype_fields(),
            schedule_fields: default_schedule_match_fields(),
        }
    }
}

impl Default for DetailSection {
    fn default() -> Self {
        Self {
            table_class: default_table_class(),
            labels: default_detail_labels(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceSection {
                base_url: "https://gis.summitcountyco.gov/arcgis/rest/services/ParcelQueryTool/SummitMap1_Pro321/MapServer".to_string(),
                detail_url: "https://gis.summitcountyco.gov/map/DetailData.aspx".to_string(),
                out_sr: Some("102654".to_string()),
            },
            schedule_layer: Self::default_schedule_layer(),
            modified_layer: Self::default_modified_layer(),
            crossref: CrossRefSection::default(),
            detail: DetailSection::default(),
        }
    }
}

impl ServiceConfig {
    fn default_schedule_layer() -> LayerSection {
        LayerSection {
            layer: 12,
            where_clause: default_where_clause(),
            order_by: None,
            fields: default_export_fields(),
        }
    }

    fn default_modified_layer() -> LayerSection {
        LayerSection {
            layer: 19,
            where_clause: "SOURCE=1".to_string(),
            order_by: Some("MODDATE DESC".to_string()),
            fields: Vec::new(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn query_url(&self, layer: u32) -> String {
        format!(
            "{}/{}/query",
            self.service.base_url.trim_end_matches('/'),
            layer
        )
    }

    pub fn schedule_query_url(&self) -> String {
        self.query_url(self.schedule_layer.layer)
    }

    pub fn modified_query_url(&self) -> String {
        self.query_url(self.modified_layer.layer)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.base_url", &self.service.base_url)?;
        validate_url("service.detail_url", &self.service.detail_url)?;
        validate_non_empty_string("schedule_layer.where_clause", &self.schedule_layer.where_clause)?;
        validate_non_empty_string("modified_layer.where_clause", &self.modified_layer.where_clause)?;
        validate_non_empty_string("detail.table_class", &self.detail.table_class)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule_layer.fields.len(), 42);
        assert_eq!(config.crossref.modtype_fields.len(), 7);
        assert_eq!(config.crossref.schedule_fields.len(), 52);
        assert_eq!(config.detail.labels.len(), 8);
    }

    #[test]
    fn test_query_url_per_layer() {
        let config = ServiceConfig::default();
        assert!(config.schedule_query_url().ends_with("/MapServer/12/query"));
        assert!(config.modified_query_url().ends_with("/MapServer/19/query"));
    }

    #[test]
    fn test_from_toml_with_sparse_sections_uses_defaults() {
        let toml_text = r#"
            [service]
            base_url = "https://maps.example.gov/arcgis/rest/services/Parcels/MapServer"
            detail_url = "https://maps.example.gov/map/DetailData.aspx"

            [schedule_layer]
            layer = 3
            fields = ["OBJECTID", "PPI"]
        "#;
        let config: ServiceConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.schedule_layer.layer, 3);
        assert_eq!(config.schedule_layer.where_clause, "1=1");
        assert_eq!(config.schedule_layer.fields.len(), 2);
        assert_eq!(config.modified_layer.layer, 19);
        assert_eq!(config.detail.table_class, "DetailData");
        assert_eq!(config.detail.labels.len(), 8);
        assert!(config.service.out_sr.is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = ServiceConfig::default();
        config.service.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
