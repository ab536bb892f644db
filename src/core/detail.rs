use crate::domain::model::{DetailRecord, LabelSpec};
use crate::utils::error::{ParcelError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

/// The label/value table carrying the parcel description block.
pub const DETAIL_TABLE_CLASS: &str = "DetailData";

/// Ordered label/value rows parsed once out of a two-column detail table.
/// Each row's cells are paired left-to-right, so lookups are deterministic
/// and never scan across row boundaries.
#[derive(Debug)]
pub struct DetailTable {
    rows: Vec<(String, String)>,
}

impl DetailTable {
    /// Parse the first `<table>` carrying `table_class` out of the document.
    /// Returns None when the page has no such table.
    pub fn from_document(doc: &Html, table_class: &str) -> Option<DetailTable> {
        let table_selector = Selector::parse(&format!("table.{}", table_class)).ok()?;
        let table = doc.select(&table_selector).next()?;
        Some(Self::from_table(table))
    }

    fn from_table(table: ElementRef) -> DetailTable {
        let row_selector = Selector::parse("tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        let mut rows = Vec::new();
        for row in table.select(&row_selector) {
            let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
            for pair in cells.chunks(2) {
                match pair {
                    [label, value] => rows.push((label.clone(), value.clone())),
                    // A trailing label with no value cell yields no row.
                    [label] => tracing::debug!("Cell '{}' has no value cell", label),
                    _ => {}
                }
            }
        }
        DetailTable { rows }
    }

    /// First row whose label starts with `label`. Anchored on purpose: a
    /// label like "Addr." must not match a cell that merely contains it
    /// somewhere in the middle.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(row_label, _)| row_label.starts_with(label))
            .map(|(_, value)| value.as_str())
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract the requested labels from an HTML document. A missing table or a
/// missing label produces an empty or partial mapping, never an error.
pub fn extract_fields(html: &str, table_class: &str, labels: &[LabelSpec]) -> DetailRecord {
    let doc = Html::parse_document(html);
    let mut record = DetailRecord::default();

    let Some(table) = DetailTable::from_document(&doc, table_class) else {
        tracing::warn!("{} table not found", table_class);
        return record;
    };

    for spec in labels {
        match table.lookup(&spec.label) {
            Some(value) => {
                record
                    .fields
                    .insert(spec.display.clone(), value.to_string());
            }
            None => tracing::debug!("{} cell not found", spec.label),
        }
    }
    record
}

/// Fetches one detail page and extracts a configured label set.
pub struct DetailScraper {
    client: Client,
}

impl DetailScraper {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch_document(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Detail page status: {}", status);
        if !status.is_success() {
            return Err(ParcelError::ServiceStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    pub async fn scrape(
        &self,
        url: &str,
        table_class: &str,
        labels: &[LabelSpec],
    ) -> Result<DetailRecord> {
        let html = self.fetch_document(url).await?;
        Ok(extract_fields(&html, table_class, labels))
    }
}

impl Default for DetailScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body>
        <table class="DetailData">
            <tr><td>Property Desc:</td><td> 123 Main St </td></tr>
            <tr><td>Phys. Address:</td><td></td></tr>
            <tr><td>Primary:</td><td>DOE JOHN</td><td>Secondary:</td><td>DOE JANE</td></tr>
            <tr><td>Mailing Addr. Note</td><td>ignore me</td></tr>
            <tr><td>Addr.</td><td>PO BOX 42</td></tr>
        </table>
        <table class="ValueData">
            <tr><td>Total Value:</td><td>$500,000</td></tr>
        </table>
        </body></html>
    "#;

    fn labels(pairs: &[(&str, &str)]) -> Vec<LabelSpec> {
        pairs.iter().map(|(l, d)| LabelSpec::new(l, d)).collect()
    }

    #[test]
    fn test_lookup_returns_trimmed_next_cell() {
        let record = extract_fields(
            SAMPLE_PAGE,
            DETAIL_TABLE_CLASS,
            &labels(&[("Property Desc:", "Property Description")]),
        );
        assert_eq!(record.get("Property Description"), Some("123 Main St"));
    }

    #[test]
    fn test_missing_label_yields_no_entry() {
        let record = extract_fields(
            SAMPLE_PAGE,
            DETAIL_TABLE_CLASS,
            &labels(&[
                ("Sale Date", "Most Recent Sale Date"),
                ("Property Desc:", "Property Description"),
            ]),
        );
        assert_eq!(record.get("Most Recent Sale Date"), None);
        assert_eq!(record.get("Property Description"), Some("123 Main St"));
    }

    #[test]
    fn test_empty_value_is_present_not_missing() {
        let record = extract_fields(
            SAMPLE_PAGE,
            DETAIL_TABLE_CLASS,
            &labels(&[("Phys. Address:", "Physical Address")]),
        );
        assert_eq!(record.get("Physical Address"), Some(""));
    }

    #[test]
    fn test_four_column_row_pairs_cells_left_to_right() {
        let record = extract_fields(
            SAMPLE_PAGE,
            DETAIL_TABLE_CLASS,
            &labels(&[
                ("Primary:", "Primary Ownership"),
                ("Secondary:", "Secondary Ownership"),
            ]),
        );
        assert_eq!(record.get("Primary Ownership"), Some("DOE JOHN"));
        assert_eq!(record.get("Secondary Ownership"), Some("DOE JANE"));
    }

    #[test]
    fn test_anchored_match_skips_mid_cell_occurrence() {
        // "Mailing Addr. Note" contains "Addr." but does not start with it.
        let record = extract_fields(
            SAMPLE_PAGE,
            DETAIL_TABLE_CLASS,
            &labels(&[("Addr.", "Address")]),
        );
        assert_eq!(record.get("Address"), Some("PO BOX 42"));
    }

    #[test]
    fn test_missing_table_yields_empty_record() {
        let record = extract_fields(
            SAMPLE_PAGE,
            "ImpData",
            &labels(&[("Property Desc:", "Property Description")]),
        );
        assert!(record.is_empty());
    }

    #[test]
    fn test_lookup_targets_requested_table_only() {
        let record = extract_fields(
            SAMPLE_PAGE,
            "ValueData",
            &labels(&[("Total Value:", "Total Value")]),
        );
        assert_eq!(record.get("Total Value"), Some("$500,000"));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_unpaired_trailing_cell_yields_no_row() {
        let html = r#"
            <table class="DetailData">
            <tr><td>Sale Date</td></tr>
            </table>
        "#;
        let record = extract_fields(
            html,
            DETAIL_TABLE_CLASS,
            &labels(&[("Sale Date", "Most Recent Sale Date")]),
        );
        assert!(record.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let html = r#"
            <table class="DetailData">
            <tr><td>Primary:</td><td>FIRST OWNER</td></tr>
            <tr><td>Primary:</td><td>SECOND OWNER</td></tr>
            </table>
        "#;
        let doc = Html::parse_document(html);
        let table = DetailTable::from_document(&doc, DETAIL_TABLE_CLASS).unwrap();
        assert_eq!(table.lookup("Primary:"), Some("FIRST OWNER"));
        assert_eq!(table.rows().len(), 2);
    }
}
