//! Filters over fetched research products.
//!
//! Every filter takes borrowed records (a slice, a `Vec`, or the output of
//! another filter) and returns the selected ones in their original order, so
//! filters compose freely:
//!
//! ```rust
//! use autocvlac::filters::{filter_by_source, filter_by_year};
//! use autocvlac::product::ResearchProduct;
//!
//! let products: Vec<ResearchProduct> = Vec::new();
//! let in_2023 = filter_by_year(&products, 2023);
//! assert!(filter_by_source(in_2023, "Biomédica").is_empty());
//! ```

use crate::product::{strip_doi_prefix, ResearchProduct, SCIENTI};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use tracing::debug;

/// Size of the recency window, in years, for the missing-in-CvLAC filter.
pub const RECENT_YEARS: i32 = 5;

/// Keep products published exactly in `year`.
///
/// Products without a valid 4-digit year are never kept.
pub fn filter_by_year<'a, I>(products: I, year: i32) -> Vec<&'a ResearchProduct>
where
    I: IntoIterator<Item = &'a ResearchProduct>,
{
    let products: Vec<_> = products.into_iter().collect();
    let kept: Vec<_> = products.iter().copied().filter(|p| p.year() == Some(year)).collect();
    debug!(year, total = products.len(), kept = kept.len(), "Filtered by year");
    kept
}

/// Keep products published in `start_year` or later that did not come from
/// Scienti.
pub fn filter_products_since_year<'a, I>(products: I, start_year: i32) -> Vec<&'a ResearchProduct>
where
    I: IntoIterator<Item = &'a ResearchProduct>,
{
    let products: Vec<_> = products.into_iter().collect();
    let kept: Vec<_> = products
        .iter()
        .copied()
        .filter(|p| !p.has_provenance(SCIENTI))
        .filter(|p| p.year().is_some_and(|y| y >= start_year))
        .collect();
    debug!(
        start_year,
        total = products.len(),
        kept = kept.len(),
        "Filtered since year"
    );
    kept
}

/// Keep products whose venue matches `pattern`.
///
/// The pattern matches when it is a case-insensitive substring of the venue
/// name, or when it equals the venue ISSN/EISSN. Surrounding whitespace is
/// ignored; a blank pattern matches nothing.
pub fn filter_by_source<'a, I>(products: I, pattern: &str) -> Vec<&'a ResearchProduct>
where
    I: IntoIterator<Item = &'a ResearchProduct>,
{
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Vec::new();
    }
    let needle = pattern.to_lowercase();

    let products: Vec<_> = products.into_iter().collect();
    let kept: Vec<_> = products
        .iter()
        .copied()
        .filter(|p| {
            let Some(venue) = p.source.as_ref() else {
                return false;
            };
            let by_name = venue
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle));
            let by_issn = venue
                .external_ids
                .iter()
                .filter(|(kind, _)| matches!(kind.as_str(), "issn" | "eissn"))
                .any(|(_, issn)| issn.eq_ignore_ascii_case(pattern));
            by_name || by_issn
        })
        .collect();
    debug!(pattern, total = products.len(), kept = kept.len(), "Filtered by source");
    kept
}

/// Keep journal articles from the last five years that are not yet in CvLAC.
///
/// `registered` holds identifiers (Impactu ids, DOIs, external ids) already
/// present in CvLAC. `today` fixes the recency window; see
/// [`MissingArticleFilter`] for the exact rules.
pub fn filter_missing_journal_articles<'a, I>(
    products: I,
    registered: &HashSet<String>,
    today: NaiveDate,
) -> Vec<&'a ResearchProduct>
where
    I: IntoIterator<Item = &'a ResearchProduct>,
{
    MissingArticleFilter::new(today)
        .registered(registered.iter().map(String::as_str))
        .apply(products)
}

/// Predicate behind [`filter_missing_journal_articles`].
///
/// A product is kept when:
/// 1. it carries no Scienti/Scienti external id and none of its identifiers is
///    registered;
/// 2. its Impactu type is a journal article;
/// 3. its year is at least `today.year() - 5` and it was published before
///    `today` (year-only records count as published on January 1);
/// 4. optionally, its venue has an ISSN or EISSN.
#[derive(Debug, Clone)]
pub struct MissingArticleFilter {
    today: NaiveDate,
    registered: HashSet<String>,
    require_issn: bool,
}

impl MissingArticleFilter {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            registered: HashSet::new(),
            require_issn: false,
        }
    }

    /// Add identifiers already registered in CvLAC.
    pub fn registered<'s>(mut self, ids: impl IntoIterator<Item = &'s str>) -> Self {
        self.registered.extend(
            ids.into_iter()
                .map(|id| strip_doi_prefix(id).to_lowercase())
                .filter(|id| !id.is_empty()),
        );
        self
    }

    /// Also require the venue to have an ISSN or EISSN.
    pub fn require_issn(mut self, require: bool) -> Self {
        self.require_issn = require;
        self
    }

    /// First year inside the recency window.
    pub fn start_year(&self) -> i32 {
        self.today.year() - RECENT_YEARS
    }

    pub fn matches(&self, product: &ResearchProduct) -> bool {
        if product.is_registered_in_cvlac() {
            return false;
        }
        if product
            .identifiers()
            .iter()
            .any(|id| self.registered.contains(id))
        {
            return false;
        }
        if !product.is_journal_article() {
            return false;
        }
        let recent = product.year().is_some_and(|y| y >= self.start_year())
            && product.published_on().is_some_and(|d| d < self.today);
        if !recent {
            return false;
        }
        !self.require_issn
            || product
                .source
                .as_ref()
                .and_then(|venue| venue.issn())
                .is_some()
    }

    pub fn apply<'a, I>(&self, products: I) -> Vec<&'a ResearchProduct>
    where
        I: IntoIterator<Item = &'a ResearchProduct>,
    {
        let products: Vec<_> = products.into_iter().collect();
        let kept: Vec<_> = products.iter().copied().filter(|p| self.matches(p)).collect();
        debug!(
            today = %self.today,
            start_year = self.start_year(),
            registered = self.registered.len(),
            require_issn = self.require_issn,
            total = products.len(),
            kept = kept.len(),
            "Filtered missing journal articles"
        );
        kept
    }
}
