//! Tabular view of research products for ad-hoc analysis.
//!
//! One row per product. Fixed columns come first, then one column per
//! external-id source and one per citation source seen in any product, so
//! heterogeneous input never loses a column. Missing values are empty cells.

use crate::error::Result;
use crate::product::ResearchProduct;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Columns present for every table, in order.
pub const BASE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "year",
    "type",
    "doi",
    "venue",
    "authors",
    "authors.external_ids",
];

const EXTERNAL_ID_PREFIX: &str = "external_ids.";
const CITATIONS_PREFIX: &str = "citations_count.";

/// In-memory table of products
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ProductTable {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a ResearchProduct>,
    {
        let products: Vec<&ResearchProduct> = products.into_iter().collect();

        let id_sources: BTreeSet<&str> = products
            .iter()
            .flat_map(|p| p.external_ids.iter())
            .filter_map(|e| e.source.as_deref())
            .collect();
        let citation_sources: BTreeSet<&str> = products
            .iter()
            .flat_map(|p| p.citations_count.iter())
            .filter_map(|c| c.source.as_deref())
            .collect();

        let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(id_sources.iter().map(|s| format!("{EXTERNAL_ID_PREFIX}{s}")));
        columns.extend(citation_sources.iter().map(|s| format!("{CITATIONS_PREFIX}{s}")));

        let rows = products
            .iter()
            .map(|p| {
                let mut row = base_cells(p);
                row.extend(id_sources.iter().map(|source| external_id(p, source)));
                row.extend(
                    citation_sources
                        .iter()
                        .map(|source| p.citation_count(source).map(|n| n.to_string())),
                );
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Write the table as CSV with a header row. Missing cells are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Save the table to a CSV file.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.len(), "Saved product table");
        Ok(())
    }
}

fn base_cells(p: &ResearchProduct) -> Vec<Option<String>> {
    let authors: Vec<&str> = p
        .authors
        .iter()
        .filter_map(|a| a.full_name.as_deref())
        .collect();
    let author_ids: Vec<String> = p
        .authors
        .iter()
        .flat_map(|a| a.external_ids.iter())
        .filter_map(|e| Some(format!("{}:{}", e.source.as_deref()?, e.id_string()?)))
        .collect();

    vec![
        p.id.clone(),
        p.title().map(str::to_string),
        p.year().map(|y| y.to_string()),
        p.product_type().map(str::to_string),
        p.normalized_doi().map(str::to_string),
        p.venue_name().map(str::to_string),
        join_non_empty(&authors),
        join_non_empty(&author_ids),
    ]
}

fn external_id(p: &ResearchProduct, source: &str) -> Option<String> {
    p.external_ids
        .iter()
        .find(|e| e.source.as_deref() == Some(source))
        .and_then(|e| e.id_string())
}

fn join_non_empty<S: AsRef<str>>(items: &[S]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products() -> Vec<ResearchProduct> {
        serde_json::from_value(json!([
            {
                "_id": "p1",
                "titles": [{"title": "First"}],
                "types": [{"source": "impactu", "type": "Artículo de revista"}],
                "year_published": 2021,
                "authors": [
                    {"full_name": "Ana Pérez", "external_ids": [{"source": "orcid", "id": "0000-0002"}]},
                    {"full_name": "Luis Gómez"}
                ],
                "external_ids": [{"source": "doi", "id": "10.1/first"}],
                "citations_count": [{"source": "openalex", "count": 7}]
            },
            {
                "_id": "p2",
                "titles": [{"title": "Second"}],
                "external_ids": [{"source": "openalex", "id": "W42"}],
                "citations_count": [{"source": "scholar", "count": 3}]
            },
            {}
        ]))
        .unwrap()
    }

    #[test]
    fn test_one_row_per_product() {
        let products = products();
        let table = ProductTable::from_products(&products);
        assert_eq!(table.len(), 3);
        assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
    }

    #[test]
    fn test_heterogeneous_columns_are_kept() {
        let products = products();
        let table = ProductTable::from_products(&products);
        for col in [
            "external_ids.doi",
            "external_ids.openalex",
            "citations_count.openalex",
            "citations_count.scholar",
        ] {
            let cells = table.column(col).unwrap();
            assert!(cells.iter().any(Option::is_some), "column {col} is empty");
        }
        assert_eq!(
            table.column("citations_count.openalex").unwrap(),
            vec![Some("7"), None, None]
        );
        assert_eq!(
            table.column("citations_count.scholar").unwrap(),
            vec![None, Some("3"), None]
        );
        assert!(table.column("citations_count.semantic").is_none());
    }

    #[test]
    fn test_author_columns() {
        let products = products();
        let table = ProductTable::from_products(&products);
        assert_eq!(
            table.column("authors").unwrap()[0],
            Some("Ana Pérez; Luis Gómez")
        );
        assert_eq!(
            table.column("authors.external_ids").unwrap(),
            vec![Some("orcid:0000-0002"), None, None]
        );
        assert_eq!(table.column("type").unwrap()[0], Some("Artículo de revista"));
        assert_eq!(table.column("year").unwrap(), vec![Some("2021"), None, None]);
    }

    #[test]
    fn test_empty_input() {
        let table = ProductTable::from_products(&Vec::<ResearchProduct>::new());
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), BASE_COLUMNS.len());
    }

    #[test]
    fn test_write_csv() {
        let products = products();
        let table = ProductTable::from_products(&products[..2]);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,year,type,doi,venue,authors,authors.external_ids"));
        assert!(lines[2].starts_with("p2,Second,,,,,,"));
    }

    #[test]
    fn test_save_csv() -> Result<()> {
        let temp = tempfile::NamedTempFile::new()?;
        let products = products();
        ProductTable::from_products(&products).save_csv(temp.path())?;

        let mut reader = csv::Reader::from_path(temp.path())?;
        assert_eq!(reader.records().count(), 3);
        Ok(())
    }
}
