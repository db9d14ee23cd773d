//! Research product records as returned by the Impactu API.
//!
//! The API is loosely typed: almost every key may be missing, `null`, or carry
//! a number where a string is expected. The structs here make presence
//! explicit (`Option`, empty collections) and normalize the lenient scalars at
//! decode time so the filters and the extractor never guess.

use crate::extract::ArticleType;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Type label Impactu assigns to complete journal articles.
pub const JOURNAL_ARTICLE_TYPE: &str = "Artículo de revista";

/// Source tag of the type/title entries curated by Impactu itself.
pub const IMPACTU_SOURCE: &str = "impactu";

/// Provenance/source tag of records that come from CvLAC (Scienti).
pub const SCIENTI: &str = "scienti";

/// One publication record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchProduct {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub titles: Vec<TitleEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<TypeEntry>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub year_published: Option<i64>,
    /// Unix timestamp in seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pub date_published: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<AuthorRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_ids: Vec<ExternalId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: Vec<ExternalUrl>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations_count: Vec<CitationCount>,
    #[serde(default)]
    pub source: Option<Venue>,
    #[serde(default)]
    pub bibliographic_info: Option<BibliographicInfo>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
}

/// Author of a product. Owned by its product, no lifecycle of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_ids: Vec<ExternalId>,
}

/// Identifier of a product or author in some external system.
///
/// `id` is kept as raw JSON: Scienti identifiers are objects
/// (`{"COD_RH": ..., "COD_PRODUCTO": ...}`) while DOIs and OpenAlex ids are
/// plain strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalId {
    #[serde(default, deserialize_with = "lenient_string")]
    pub provenance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default)]
    pub id: Value,
}

impl ExternalId {
    /// Identifier rendered as text. Objects are rendered as compact JSON.
    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    fn is_scienti(&self) -> bool {
        self.source.as_deref() == Some(SCIENTI)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrl {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationCount {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub count: Option<i64>,
}

/// Journal or other venue the product appeared in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// `issn`, `eissn`, ... Accepts both a JSON map and a `[{source, id}]` list.
    #[serde(default, deserialize_with = "venue_ids")]
    pub external_ids: BTreeMap<String, String>,
}

impl Venue {
    /// ISSN, falling back to the electronic ISSN.
    pub fn issn(&self) -> Option<&str> {
        self.external_ids
            .get("issn")
            .or_else(|| self.external_ids.get("eissn"))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BibliographicInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_page: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_page: Option<String>,
}

impl ResearchProduct {
    /// Title of the first title entry, if it is non-blank.
    pub fn title(&self) -> Option<&str> {
        self.titles
            .first()
            .and_then(|t| t.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Language code of the first title entry.
    pub fn title_language(&self) -> Option<&str> {
        self.titles.first().and_then(|t| t.lang.as_deref())
    }

    /// Product type as curated by Impactu.
    pub fn product_type(&self) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.source.as_deref() == Some(IMPACTU_SOURCE))
            .and_then(|t| t.kind.as_deref())
    }

    /// Whether the Impactu type maps to one of the CvLAC article types.
    pub fn is_journal_article(&self) -> bool {
        self.product_type()
            .and_then(ArticleType::from_product_type)
            .is_some()
    }

    /// Publication year, only when it is a 4-digit year.
    pub fn year(&self) -> Option<i32> {
        self.year_published
            .filter(|y| (1000..=9999).contains(y))
            .and_then(|y| i32::try_from(y).ok())
    }

    /// Publication date: the timestamp when present, else January 1 of the year.
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.date_published
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive())
            .or_else(|| self.year().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)))
    }

    /// Citation count reported by `source` (`openalex`, `scholar`, ...).
    pub fn citation_count(&self, source: &str) -> Option<i64> {
        self.citations_count
            .iter()
            .find(|c| c.source.as_deref() == Some(source))
            .and_then(|c| c.count)
    }

    /// DOI without the resolver prefix.
    pub fn normalized_doi(&self) -> Option<&str> {
        self.doi.as_deref().map(strip_doi_prefix).filter(|d| !d.is_empty())
    }

    pub fn venue_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }

    /// True when any external id has the given provenance.
    pub fn has_provenance(&self, provenance: &str) -> bool {
        self.external_ids
            .iter()
            .any(|e| e.provenance.as_deref() == Some(provenance))
    }

    /// Already registered in CvLAC: an external id that is Scienti by both
    /// provenance and source.
    pub fn is_registered_in_cvlac(&self) -> bool {
        self.external_ids
            .iter()
            .any(|e| e.provenance.as_deref() == Some(SCIENTI) && e.is_scienti())
    }

    /// Every identifier the product could be registered under, lower-cased:
    /// the Impactu id, the bare DOI and the external id values.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        if let Some(id) = self.id.as_deref() {
            ids.push(id.to_string());
        }
        if let Some(doi) = self.normalized_doi() {
            ids.push(doi.to_string());
        }
        for ext in &self.external_ids {
            if let Some(value) = ext.id_string() {
                ids.push(strip_doi_prefix(&value).to_string());
            }
        }
        ids.iter_mut().for_each(|id| *id = id.to_lowercase());
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Remove a `doi.org` resolver prefix, if any.
pub fn strip_doi_prefix(doi: &str) -> &str {
    let doi = doi.trim();
    doi_resolver()
        .and_then(|re| re.find(doi))
        .map(|m| &doi[m.end()..])
        .unwrap_or(doi)
}

fn doi_resolver() -> Option<&'static Regex> {
    static DOI_RESOLVER: OnceLock<Option<Regex>> = OnceLock::new();
    DOI_RESOLVER
        .get_or_init(|| Regex::new(r"(?i)^https?://(dx\.)?doi\.org/").ok())
        .as_ref()
}

// === Lenient scalar decoding ===

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings stay strings, numbers become their text, everything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Integers, integral floats and numeric strings; anything else is absent.
fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn venue_ids<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut ids = BTreeMap::new();
    match Value::deserialize(deserializer)? {
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(id) = scalar_text(&value) {
                    ids.insert(key, id);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                let source = entry.get("source").and_then(Value::as_str);
                let id = entry.get("id").and_then(scalar_text);
                if let (Some(source), Some(id)) = (source, id) {
                    ids.insert(source.to_string(), id);
                }
            }
        }
        _ => {}
    }
    Ok(ids)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
