//! Fetch → filter → extract → submit for one researcher.
//!
//! Failures of a single record never abort the batch: every record that passes
//! the missing-in-CvLAC filter yields exactly one [`SubmissionReport`].
//! Payload validation is the submitter's job.

use crate::cvlac::{FormSubmitter, Session, SubmissionOutcome};
use crate::error::Result;
use crate::extract::extract_scientific_article_data;
use crate::filters::MissingArticleFilter;
use crate::impactu::ProductSource;
use serde::Serialize;
use tracing::{info, warn};

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReportKind {
    /// The record lacks what the form needs (title, mappable type)
    Skipped,
    /// The submitter was called and reported this outcome
    Submitted { outcome: SubmissionOutcome },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub product_id: Option<String>,
    pub title: Option<String>,
    #[serde(flatten)]
    pub kind: ReportKind,
}

impl SubmissionReport {
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        match &self.kind {
            ReportKind::Skipped => None,
            ReportKind::Submitted { outcome } => Some(outcome),
        }
    }
}

/// Submit every journal article of `cod_rh` that is missing in CvLAC.
///
/// Only the fetch can fail the whole call.
pub async fn submit_missing_articles<S, F>(
    source: &S,
    submitter: &F,
    session: &Session,
    cod_rh: &str,
    filter: &MissingArticleFilter,
) -> Result<Vec<SubmissionReport>>
where
    S: ProductSource + ?Sized,
    F: FormSubmitter + ?Sized,
{
    let products = source.research_products(cod_rh).await?;
    let missing = filter.apply(&products);
    info!(
        cod_rh,
        fetched = products.len(),
        missing = missing.len(),
        "Submitting missing journal articles"
    );

    let mut reports = Vec::with_capacity(missing.len());
    for product in missing {
        let product_id = product.id.clone();
        let title = product.title().map(str::to_string);

        let kind = match extract_scientific_article_data(product) {
            None => {
                warn!(product_id = ?product_id, "Product not extractable, skipping");
                ReportKind::Skipped
            }
            Some(payload) => {
                let outcome = submitter.submit(&payload, session).await;
                if !outcome.is_success() {
                    warn!(product_id = ?product_id, message = %outcome.message, "Submission failed");
                }
                ReportKind::Submitted { outcome }
            }
        };

        reports.push(SubmissionReport {
            product_id,
            title,
            kind,
        });
    }

    let submitted = reports
        .iter()
        .filter(|r| r.outcome().is_some_and(SubmissionOutcome::is_success))
        .count();
    info!(cod_rh, total = reports.len(), submitted, "Submission batch complete");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cvlac::{DryRunSubmitter, SubmissionStatus};
    use crate::error::CvlacError;
    use crate::extract::FormPayload;
    use crate::filters::filter_missing_journal_articles;
    use crate::product::ResearchProduct;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeSource(Vec<ResearchProduct>);

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn research_products(&self, cod_rh: &str) -> Result<Vec<ResearchProduct>> {
            if cod_rh == "missing" {
                return Err(CvlacError::Api {
                    code: 404,
                    message: format!("Not research products for: {}", cod_rh),
                });
            }
            Ok(self.0.clone())
        }
    }

    /// Records payloads; fails the titles it is told to fail.
    #[derive(Default)]
    struct FakeSubmitter {
        fail_titles: Vec<String>,
        seen: Mutex<Vec<FormPayload>>,
    }

    #[async_trait]
    impl FormSubmitter for FakeSubmitter {
        async fn submit(&self, payload: &FormPayload, _session: &Session) -> SubmissionOutcome {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(payload.clone());
            }
            if self.fail_titles.contains(&payload.title) {
                SubmissionOutcome::error("Failed to fill scientific article form: timeout", true)
            } else {
                SubmissionOutcome::success("Scientific article form filled successfully.")
            }
        }
    }

    fn scenario_products() -> Vec<ResearchProduct> {
        serde_json::from_value(json!([
            {
                "_id": "a",
                "titles": [{"title": "A"}],
                "types": [{"source": "impactu", "type": "Artículo de revista"}],
                "year_published": 2024,
                "doi": "10.1/a"
            },
            {
                "_id": "b",
                "titles": [{"title": "B"}],
                "types": [{"source": "impactu", "type": "Libro"}],
                "year_published": 2024
            }
        ]))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let products = scenario_products();
        let missing = filter_missing_journal_articles(&products, &HashSet::new(), today());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].title(), Some("A"));

        let payload = extract_scientific_article_data(missing[0]).unwrap();
        assert_eq!(payload.title, "A");
        assert_eq!(payload.year, Some(2024));
        assert_eq!(payload.doi.as_deref(), Some("10.1/a"));
    }

    /// Impactu type labels as they appear in English-language exports.
    fn english_scenario_products() -> Vec<ResearchProduct> {
        serde_json::from_value(json!([
            {"_id": "a", "titles": [{"title": "A"}],
             "types": [{"source": "impactu", "type": "journal article"}],
             "year_published": 2024, "doi": "10.1/a"},
            {"_id": "b", "titles": [{"title": "B"}],
             "types": [{"source": "impactu", "type": "book"}],
             "year_published": 2024}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_english_type_labels_end_to_end() {
        let products = english_scenario_products();
        let missing = filter_missing_journal_articles(&products, &HashSet::new(), today());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].title(), Some("A"));
        let payload = extract_scientific_article_data(missing[0]).unwrap();
        assert_eq!(payload.doi.as_deref(), Some("10.1/a"));

        let submitter = FakeSubmitter::default();
        let reports = submit_missing_articles(
            &FakeSource(products),
            &submitter,
            &Session::new("tester"),
            "0001",
            &MissingArticleFilter::new(today()),
        )
        .await
        .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].product_id.as_deref(), Some("a"));
        assert!(reports[0].outcome().unwrap().is_success());
        let seen = submitter.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].doi.as_deref(), Some("10.1/a"));
    }

    #[tokio::test]
    async fn test_submitter_errors_pass_through() {
        let submitter = DryRunSubmitter;
        let reports = submit_missing_articles(
            &FakeSource(english_scenario_products()),
            &submitter,
            &Session {
                label: "closed".to_string(),
                active: false,
            },
            "0001",
            &MissingArticleFilter::new(today()),
        )
        .await
        .unwrap();
        assert_eq!(reports.len(), 1);
        let outcome = reports[0].outcome().unwrap();
        assert_eq!(outcome.status, SubmissionStatus::Error);
        assert_eq!(outcome.message, "session is not active");
        assert!(!outcome.session_active);
    }

    #[tokio::test]
    async fn test_pipeline_submits_missing_articles() {
        let source = FakeSource(scenario_products());
        let submitter = FakeSubmitter::default();
        let session = Session::new("tester");

        let reports = submit_missing_articles(
            &source,
            &submitter,
            &session,
            "0001",
            &MissingArticleFilter::new(today()),
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].product_id.as_deref(), Some("a"));
        assert!(reports[0].outcome().unwrap().is_success());
        let seen = submitter.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].doi.as_deref(), Some("10.1/a"));
    }

    #[tokio::test]
    async fn test_pipeline_continues_past_failures() {
        let mut products = scenario_products();
        products.extend(
            serde_json::from_value::<Vec<ResearchProduct>>(json!([
                {
                    "_id": "untitled",
                    "types": [{"source": "impactu", "type": "Artículo de revista"}],
                    "year_published": 2023
                },
                {
                    "_id": "c",
                    "titles": [{"title": "C"}],
                    "types": [{"source": "impactu", "type": "Artículo de revista"}],
                    "year_published": 2022
                }
            ]))
            .unwrap(),
        );
        let source = FakeSource(products);
        let submitter = FakeSubmitter {
            fail_titles: vec!["A".to_string()],
            ..Default::default()
        };

        let reports = submit_missing_articles(
            &source,
            &submitter,
            &Session::new("tester"),
            "0001",
            &MissingArticleFilter::new(today()),
        )
        .await
        .unwrap();

        let ids: Vec<_> = reports.iter().map(|r| r.product_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("a"), Some("untitled"), Some("c")]);

        let failed = reports[0].outcome().unwrap();
        assert_eq!(failed.status, SubmissionStatus::Error);
        assert_eq!(failed.message, "Failed to fill scientific article form: timeout");
        assert_eq!(reports[1].kind, ReportKind::Skipped);
        assert!(reports[2].outcome().unwrap().is_success());
    }

    #[tokio::test]
    async fn test_registered_ids_are_not_submitted() {
        let source = FakeSource(scenario_products());
        let submitter = FakeSubmitter::default();
        let filter = MissingArticleFilter::new(today()).registered(["https://doi.org/10.1/A"]);

        let reports = submit_missing_articles(&source, &submitter, &Session::new("t"), "0001", &filter)
            .await
            .unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_surfaced() {
        let source = FakeSource(Vec::new());
        let submitter = FakeSubmitter::default();
        let err = submit_missing_articles(
            &source,
            &submitter,
            &Session::new("t"),
            "missing",
            &MissingArticleFilter::new(today()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CvlacError::Api { code: 404, .. }));
    }

    #[test]
    fn test_report_serialization() {
        let report = SubmissionReport {
            product_id: Some("a".to_string()),
            title: Some("A".to_string()),
            kind: ReportKind::Submitted {
                outcome: SubmissionOutcome::success("ok"),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["result"], "submitted");
        assert_eq!(json["outcome"]["status"], "success");
    }
}
