//! End-to-end analysis and comparison flows over in-memory persistence.

mod common;

use uuid::Uuid;

use bizlens::domain::{AnalysisSource, BcgQuadrant, ChartKind, UploadedDocument};
use bizlens::errors::AppError;
use bizlens::services::ServiceContainer;
use bizlens::types::PaginationParams;

use common::{harness, harness_with, FakeModel, FakeSearch};

#[tokio::test]
async fn test_company_analysis_produces_every_framework() {
    let h = harness();
    let user = Uuid::new_v4();

    let analysis = h
        .services
        .analyses()
        .analyze_company(user, "  Acme   Corp ")
        .await
        .unwrap();

    assert_eq!(analysis.company_name, "Acme Corp");
    assert_eq!(analysis.source, AnalysisSource::Company);
    assert!(analysis.report.failures.is_empty());

    let report = &analysis.report;
    assert_eq!(report.swot.as_ref().unwrap().balance(), 1);
    assert_eq!(report.pestel.as_ref().unwrap().technological.impact, 5);
    assert_eq!(report.porter.as_ref().unwrap().competitive_rivalry.intensity, 4);
    let bcg = report.bcg.as_ref().unwrap();
    assert_eq!(bcg.count(BcgQuadrant::Star), 1);
    assert_eq!(bcg.count(BcgQuadrant::Dog), 1);
    assert_eq!(report.mckinsey.as_ref().unwrap().structure, "Divisional");
    assert!((report.sentiment.as_ref().unwrap().overall_score - 0.4).abs() < 1e-9);
    assert_eq!(report.sources.len(), 3);

    // PESTEL, Porter, BCG and sentiment distribution
    assert_eq!(analysis.charts.len(), 4);
    assert!(analysis
        .charts
        .iter()
        .any(|c| c.kind == ChartKind::Scatter));
    assert!(analysis.charts.iter().all(|c| !c.png_base64.is_empty()));

    // The sentiment capture is recorded in the time series too
    assert_eq!(h.store.sentiment_count("acme corp"), 1);
    // Five core frameworks plus the sentiment prompt
    assert_eq!(h.model.calls(), 6);
}

#[tokio::test]
async fn test_failed_frameworks_degrade_the_report() {
    let h = harness_with(
        FakeModel::failing(&["BCG Growth-Share Matrix", "McKinsey 7S Framework"]),
        FakeSearch::with_quiet(&["Initech"]),
    );

    let analysis = h
        .services
        .analyses()
        .analyze_company(Uuid::new_v4(), "Initech")
        .await
        .unwrap();

    let failed: Vec<&str> = analysis
        .report
        .failures
        .iter()
        .map(|f| f.framework.as_str())
        .collect();
    assert_eq!(
        failed,
        vec!["BCG Growth-Share Matrix", "McKinsey 7S Framework", "LinkedIn Sentiment"]
    );
    assert!(analysis.report.bcg.is_none());
    assert!(analysis.report.sentiment.is_none());
    assert!(analysis.report.swot.is_some());
    // No BCG scatter, no sentiment distribution
    assert_eq!(analysis.charts.len(), 2);
}

#[tokio::test]
async fn test_analysis_fails_when_nothing_is_produced() {
    let h = harness_with(
        FakeModel::failing(&[
            "SWOT Analysis",
            "PESTEL Analysis",
            "Porter's Five Forces",
            "BCG Growth-Share Matrix",
            "McKinsey 7S Framework",
            "LinkedIn Sentiment",
        ]),
        FakeSearch::default(),
    );

    let result = h
        .services
        .analyses()
        .analyze_company(Uuid::new_v4(), "Acme")
        .await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
    assert_eq!(h.store.analysis_count(), 0);
}

#[tokio::test]
async fn test_document_analysis_uses_file_stem() {
    let h = harness();
    let user = Uuid::new_v4();

    let analysis = h
        .services
        .analyses()
        .analyze_document(
            user,
            UploadedDocument {
                filename: "globex-annual-report.md".to_string(),
                content_type: "text/markdown".to_string(),
                bytes: b"# Globex\nRevenue grew 12% on strong widget demand.".to_vec(),
                company_name: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(analysis.company_name, "globex-annual-report");
    assert_eq!(analysis.source, AnalysisSource::Document);
    assert_eq!(
        analysis.document_name.as_deref(),
        Some("globex-annual-report.md")
    );
    assert!(analysis.report.sentiment.is_none());
    assert!(analysis.report.failures.is_empty());
    // Documents skip the LinkedIn capture
    assert_eq!(h.model.calls(), 5);
}

#[tokio::test]
async fn test_document_rejections() {
    let h = harness();
    let analyses = h.services.analyses();

    let pdf = UploadedDocument {
        filename: "deck.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.7".to_vec(),
        company_name: Some("Acme".to_string()),
    };
    assert!(matches!(
        analyses.analyze_document(Uuid::new_v4(), pdf).await,
        Err(AppError::UnsupportedMediaType(_))
    ));

    let empty = UploadedDocument {
        filename: "notes.txt".to_string(),
        content_type: "text/plain".to_string(),
        bytes: Vec::new(),
        company_name: None,
    };
    assert!(matches!(
        analyses.analyze_document(Uuid::new_v4(), empty).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_list_get_and_delete() {
    let h = harness();
    let analyses = h.services.analyses();
    let user = Uuid::new_v4();

    let first = analyses.analyze_company(user, "Acme").await.unwrap();
    let second = analyses.analyze_company(user, "Globex").await.unwrap();
    analyses
        .analyze_company(Uuid::new_v4(), "Initech")
        .await
        .unwrap();

    let params = PaginationParams {
        page: 1,
        per_page: 1,
    };
    let (page, total) = analyses.list(user, &params).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second.id);

    assert_eq!(analyses.get(first.id).await.unwrap().company_name, "Acme");
    analyses.delete(first.id).await.unwrap();
    assert!(matches!(analyses.get(first.id).await, Err(AppError::NotFound)));
    assert!(matches!(analyses.delete(first.id).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_comparison_reuses_existing_analyses() {
    let h = harness();
    let user = Uuid::new_v4();

    h.services
        .analyses()
        .analyze_company(user, "Acme")
        .await
        .unwrap();
    let calls_before = h.model.calls();

    let comparison = h
        .services
        .comparisons()
        .compare(
            user,
            vec!["acme".to_string(), "Globex".to_string(), "ACME".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(comparison.companies, vec!["acme", "Globex"]);
    assert_eq!(comparison.metrics.len(), 2);
    assert_eq!(comparison.metrics[0].company, "Acme");
    assert_eq!(comparison.metrics[0].star_products, 1);
    assert!(comparison.insights.contains("Acme leads"));
    assert!(!comparison.charts.is_empty());

    // Only Globex was analyzed (6 prompts), plus one insights prompt
    assert_eq!(h.model.calls() - calls_before, 7);
    assert_eq!(h.store.analysis_count(), 2);

    let fetched = h.services.comparisons().get(comparison.id).await.unwrap();
    assert_eq!(fetched.companies, comparison.companies);
}

#[tokio::test]
async fn test_comparison_falls_back_without_insights() {
    let h = harness_with(
        FakeModel::failing(&["Comparative Insights"]),
        FakeSearch::default(),
    );

    let comparison = h
        .services
        .comparisons()
        .compare(Uuid::new_v4(), vec!["Acme".to_string(), "Globex".to_string()])
        .await
        .unwrap();

    assert!(!comparison.insights.trim().is_empty());
    assert!(comparison.insights.contains("Acme"));
}

#[tokio::test]
async fn test_comparison_needs_two_distinct_companies() {
    let h = harness();
    let result = h
        .services
        .comparisons()
        .compare(Uuid::new_v4(), vec!["Acme".to_string(), " acme ".to_string()])
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.model.calls(), 0);
}
