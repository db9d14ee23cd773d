//! Research product → CvLAC scientific article form payload.
//!
//! The portal identifies article types and publication media by its own codes.
//! Those codes are an opaque vocabulary owned by the portal operator, so they
//! live in explicit lookup tables here rather than being inferred.

use crate::product::{strip_doi_prefix, ResearchProduct};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Article type radio buttons of the CvLAC article form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleType {
    /// "Completo"
    #[serde(rename = "111")]
    Complete,
    /// "Corto"
    #[serde(rename = "112")]
    Short,
    /// "Revisión"
    #[serde(rename = "113")]
    Review,
    /// "Caso clínico"
    #[serde(rename = "114")]
    ClinicalCase,
}

/// Product type (trimmed, lower-cased) → article type.
const ARTICLE_TYPES: &[(&str, ArticleType)] = &[
    ("artículo de revista", ArticleType::Complete),
    ("artículo completo", ArticleType::Complete),
    ("journal article", ArticleType::Complete),
    ("full article", ArticleType::Complete),
    ("artículo corto", ArticleType::Short),
    ("short article", ArticleType::Short),
    ("short communication", ArticleType::Short),
    ("artículo de revisión", ArticleType::Review),
    ("review", ArticleType::Review),
    ("review article", ArticleType::Review),
    ("caso clínico", ArticleType::ClinicalCase),
    ("case report", ArticleType::ClinicalCase),
    ("clinical case", ArticleType::ClinicalCase),
];

impl ArticleType {
    /// Portal code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Complete => "111",
            Self::Short => "112",
            Self::Review => "113",
            Self::ClinicalCase => "114",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Complete => "Completo",
            Self::Short => "Corto",
            Self::Review => "Revisión",
            Self::ClinicalCase => "Caso clínico",
        }
    }

    /// Map a product type. Unmapped types yield `None`.
    pub fn from_product_type(kind: &str) -> Option<Self> {
        let kind = kind.trim().to_lowercase();
        ARTICLE_TYPES
            .iter()
            .find(|(name, _)| *name == kind)
            .map(|(_, article_type)| *article_type)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [Self::Complete, Self::Short, Self::Review, Self::ClinicalCase]
            .into_iter()
            .find(|t| t.code() == code.trim())
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Publication medium ("tpo_medio_divulgacion") of the article form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationMedium {
    #[serde(rename = "Papel")]
    Paper,
    #[default]
    #[serde(rename = "Electrónico")]
    Electronic,
}

impl PublicationMedium {
    pub fn code(self) -> &'static str {
        match self {
            Self::Paper => "P",
            Self::Electronic => "H",
        }
    }

    /// Label shown by the portal.
    pub fn label(self) -> &'static str {
        match self {
            Self::Paper => "Papel",
            Self::Electronic => "Electrónico",
        }
    }

    /// Parse either a portal label or a portal code.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        [Self::Paper, Self::Electronic]
            .into_iter()
            .find(|m| m.label().to_lowercase() == value || m.code().to_lowercase() == value)
    }
}

impl fmt::Display for PublicationMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Month names accepted by the portal's month selector.
pub const SPANISH_MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Language used when the title carries none.
pub const DEFAULT_LANGUAGE_CODE: &str = "es";

/// ISO 639 code → language name as listed in the portal's language selector.
const LANGUAGES: &[(&str, &str)] = &[
    ("es", "Español"),
    ("ab", "Abjasio"),
    ("aa", "Afar"),
    ("af", "Africano"),
    ("ay", "Aimara"),
    ("sq", "Albanés"),
    ("de", "Alemán"),
    ("am", "Amhárico"),
    ("ar", "Árabe"),
    ("hy", "Armenio"),
    ("as", "Assamés"),
    ("az", "Azerbaijani"),
    ("bal", "Baluchi"),
    ("ba", "Bashkir"),
    ("bn", "Bengalí"),
    ("ber", "Berbere"),
    ("be", "Bielorruso"),
    ("bh", "Bihari"),
    ("my", "Birmano"),
    ("bi", "Bislama"),
    ("br", "Bretón"),
    ("bg", "Búlgaro"),
    ("dz", "Butaní"),
    ("km", "Camboyano"),
    ("ca", "Catalán"),
    ("cs", "Checo"),
    ("zh", "Chino"),
    ("si", "Cingalés"),
    ("ko", "Coreano"),
    ("co", "Corso"),
    ("hr", "Croata"),
    ("ku", "Curdo / Kurdo"),
    ("da", "Danés"),
    ("dv", "Divehi"),
    ("sk", "Eslovaco"),
    ("sl", "Esloveno"),
    ("eo", "Esperanto"),
    ("et", "Estonio"),
    ("ee", "Eue"),
    ("fo", "Faroese"),
    ("fj", "Fidjiano"),
    ("tl", "Filipino"),
    ("fi", "Finlandés"),
    ("fr", "Francés"),
    ("fy", "Frisón"),
    ("gd", "Gaélico"),
    ("cy", "Galés"),
    ("gl", "Gallego"),
    ("ka", "Georgiano"),
    ("el", "Griego"),
    ("kl", "Groenlandés"),
    ("gn", "Guaraní"),
    ("gu", "Gujarati"),
    ("ha", "Hausa"),
    ("he", "Hebreo"),
    ("hi", "Hindi"),
    ("nl", "Holandés"),
    ("hu", "Húngaro"),
    ("id", "Indonesio"),
    ("en", "Inglés"),
    ("ia", "Interlingua"),
    ("ik", "Inupiak"),
    ("ga", "Irlandés"),
    ("is", "Islandés"),
    ("it", "Italiano"),
    ("ja", "Japonés"),
    ("jv", "Javanés"),
    ("kn", "kannada"),
    ("ks", "Kashmiri"),
    ("kk", "Kazajio"),
    ("rw", "kinya-Ruanda"),
    ("ky", "Kirguiz"),
    ("rn", "Kirundi"),
    ("lo", "Laosiano"),
    ("la", "Latín"),
    ("lv", "Letón"),
    ("ln", "Lingala"),
    ("lt", "Lituano"),
    ("lb", "Luxemburgues"),
    ("mk", "Macedonio"),
    ("ml", "Malayalam"),
    ("ms", "Malayo"),
    ("mg", "Malgache"),
    ("mt", "Maltés"),
    ("mi", "Maorí"),
    ("mr", "Marathi"),
    ("mo", "Moldavio"),
    ("mn", "Mongol"),
    ("me", "Montenegrino"),
    ("na", "Nauruano"),
    ("ne", "Nepalés"),
    ("no", "Noruego"),
    ("or", "Oriya"),
    ("om", "Oromo"),
    ("fa", "Persa"),
    ("pl", "Polaco"),
    ("pt", "Portugués"),
    ("pa", "Punjabi"),
    ("ps", "Pushtu"),
    ("qu", "Quechua"),
    ("sw", "Quisuahili"),
    ("rm", "Reto-romano"),
    ("ro", "Rumano"),
    ("ru", "Ruso"),
    ("sm", "Samoano"),
    ("sg", "Sango"),
    ("sa", "Sánscrito"),
    ("sr", "Serbio"),
    ("sh", "Serbocroata"),
    ("st", "Sesotho"),
    ("tn", "Setswana"),
    ("sn", "Shona"),
    ("sd", "Sindhi"),
    ("ss", "Siswati"),
    ("so", "Somalí"),
    ("su", "Sudanés"),
    ("sv", "Sueco"),
    ("th", "Tailandés"),
    ("tg", "Tajiko"),
    ("ta", "Tamil"),
    ("tt", "Tártaro"),
    ("te", "Telugu"),
    ("bo", "Tibetano"),
    ("ti", "Tigrinya"),
    ("to", "Tongano"),
    ("ts", "Tsonga"),
    ("tr", "Turco"),
    ("tk", "Turkmeno"),
    ("tv", "Tuvaloano"),
    ("tw", "Twi"),
    ("uk", "Ucraniano"),
    ("wo", "Uolof"),
    ("ur", "Urdu"),
    ("uz", "Uzbeko"),
    ("eu", "Vasco"),
    ("vi", "Vietnamita"),
    ("vo", "Volapuk"),
    ("xh", "Xhosa"),
    ("yi", "Yiddish"),
    ("yo", "Yoruba"),
    ("zu", "Zulu"),
];

/// Spanish language name for an ISO code; unknown codes are returned as-is.
pub fn language_name(code: &str) -> String {
    let lower = code.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(iso, _)| *iso == lower)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Spanish month name of a unix timestamp (UTC).
pub fn spanish_month(timestamp: i64) -> Option<&'static str> {
    let month = DateTime::<Utc>::from_timestamp(timestamp, 0)?.month0();
    SPANISH_MONTHS.get(month as usize).copied()
}

/// Field values for one CvLAC scientific article form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormPayload {
    pub title: String,
    pub article_type: ArticleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_page: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_issn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub publication_medium: PublicationMedium,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// Map a research product to the article form fields.
///
/// Returns `None` when the product has no title or when its type has no
/// article type code.
pub fn extract_scientific_article_data(product: &ResearchProduct) -> Option<FormPayload> {
    let title = product.title()?.to_string();
    let article_type = product.product_type().and_then(ArticleType::from_product_type)?;

    let language = language_name(product.title_language().unwrap_or(DEFAULT_LANGUAGE_CODE));
    let month = product
        .date_published
        .and_then(spanish_month)
        .map(str::to_string);

    let venue = product.source.as_ref();
    let journal_name = venue.and_then(|v| v.name.clone());
    let journal_issn = venue.and_then(|v| v.issn()).map(str::to_string);

    let info = product.bibliographic_info.clone().unwrap_or_default();

    let raw_doi = product
        .doi
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let doi = raw_doi.map(|d| strip_doi_prefix(d).to_string());
    let website_url = raw_doi.map(str::to_string).or_else(|| {
        product
            .external_urls
            .first()
            .and_then(|u| u.url.clone())
    });

    Some(FormPayload {
        title,
        article_type,
        initial_page: info.start_page,
        final_page: info.end_page,
        language,
        year: product.year(),
        month,
        journal_name,
        journal_issn,
        volume: info.volume,
        issue: info.issue,
        series: None,
        publication_medium: PublicationMedium::default(),
        website_url,
        doi,
    })
}
