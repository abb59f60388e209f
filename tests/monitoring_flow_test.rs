//! Monitored companies, the sentiment sweep and sentiment summaries.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use bizlens::config::MonitorSettings;
use bizlens::domain::{ChartKind, Trend};
use bizlens::errors::AppError;
use bizlens::jobs::SentimentMonitor;
use bizlens::services::ServiceContainer;

use common::{harness, harness_with, FakeModel, FakeSearch};

#[tokio::test]
async fn test_monitored_company_lifecycle() {
    let h = harness();
    let monitoring = h.services.monitoring();
    let admin = Uuid::new_v4();

    let added = monitoring.add("  Globex  ", Some(admin)).await.unwrap();
    assert_eq!(added.name, "Globex");
    assert_eq!(added.added_by, Some(admin));
    assert!(added.last_checked_at.is_none());

    monitoring.add("Acme", None).await.unwrap();
    assert!(matches!(
        monitoring.add("GLOBEX", None).await,
        Err(AppError::Conflict(_))
    ));

    let names: Vec<String> = monitoring
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Acme", "Globex"]);

    monitoring.remove("globex").await.unwrap();
    assert!(matches!(
        monitoring.remove("globex").await,
        Err(AppError::NotFound)
    ));
    assert_eq!(monitoring.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sweep_skips_companies_that_keep_failing() {
    let h = harness_with(FakeModel::default(), FakeSearch::with_quiet(&["Globex"]));
    let monitoring = h.services.monitoring();
    monitoring.add("Acme", None).await.unwrap();
    monitoring.add("Globex", None).await.unwrap();

    let monitor = SentimentMonitor::new(
        h.services.monitoring(),
        h.services.sentiment(),
        MonitorSettings {
            enabled: true,
            interval_seconds: 60,
            failure_threshold: 2,
        },
    );

    let first = monitor.run_once().await.unwrap();
    assert_eq!(first.processed, vec!["Acme"]);
    assert_eq!(first.failed, vec!["Globex"]);
    assert!(first.newly_skipped.is_empty());
    assert!(!first.lock_contended);

    let second = monitor.run_once().await.unwrap();
    assert_eq!(second.failed, vec!["Globex"]);
    assert_eq!(second.newly_skipped, vec!["Globex"]);
    assert_eq!(monitor.skip_list().list().await, vec!["globex"]);

    let third = monitor.run_once().await.unwrap();
    assert_eq!(third.processed, vec!["Acme"]);
    assert_eq!(third.skipped, vec!["Globex"]);
    assert!(third.failed.is_empty());

    assert_eq!(h.store.sentiment_count("acme"), 3);
    assert_eq!(h.store.sentiment_count("globex"), 0);

    let companies = monitoring.list().await.unwrap();
    let acme = companies.iter().find(|c| c.name == "Acme").unwrap();
    let globex = companies.iter().find(|c| c.name == "Globex").unwrap();
    assert!(acme.last_checked_at.is_some());
    assert!(globex.last_checked_at.is_none());

    // Taken off the skip list, Globex is attempted again
    assert!(monitor.skip_list().unskip("GLOBEX").await);
    let fourth = monitor.run_once().await.unwrap();
    assert_eq!(fourth.failed, vec!["Globex"]);
}

#[tokio::test]
async fn test_monitor_loop_stops_on_shutdown() {
    let h = harness();
    h.services.monitoring().add("Acme", None).await.unwrap();

    let monitor = Arc::new(SentimentMonitor::new(
        h.services.monitoring(),
        h.services.sentiment(),
        MonitorSettings {
            enabled: true,
            interval_seconds: 3600,
            failure_threshold: 3,
        },
    ));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(monitor.run(shutdown_rx));

    // The first sweep runs immediately
    for _ in 0..100 {
        if h.store.sentiment_count("acme") > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(h.store.sentiment_count("acme"), 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_summary_over_recorded_points() {
    let h = harness();
    let now = Utc::now();
    for (days_ago, score) in [(3, 0.1), (2, 0.2), (1, 0.3), (0, 0.4)] {
        h.store
            .seed_sentiment("Acme", score, now - Duration::days(days_ago));
    }

    let sentiment = h.services.sentiment();
    let history = sentiment.history("ACME", 10).await.unwrap();
    assert_eq!(history.len(), 4);
    assert!((history[0].score - 0.1).abs() < 1e-9);

    let report = sentiment.summary("acme", 10).await.unwrap();
    assert_eq!(report.company, "acme");
    let summary = report.summary.unwrap();
    assert_eq!(summary.count, 4);
    assert!((summary.latest - 0.4).abs() < 1e-9);
    assert!((summary.average - 0.25).abs() < 1e-9);
    assert!((summary.slope_per_day - 0.1).abs() < 1e-6);
    assert_eq!(summary.trend, Trend::Improving);
    assert_eq!(report.chart.unwrap().kind, ChartKind::Line);

    let empty = sentiment.summary("Initech", 10).await.unwrap();
    assert!(empty.summary.is_none());
    assert!(empty.chart.is_none());
}

#[tokio::test]
async fn test_capture_appends_to_history() {
    let h = harness();
    let sentiment = h.services.sentiment();

    let captured = sentiment.capture("Acme").await.unwrap();
    assert!((captured.point.score - 0.4).abs() < 1e-9);
    assert_eq!(captured.point.sample_size, 3);
    assert_eq!(captured.sentiment.key_themes, vec!["hiring", "product launch"]);

    let history = sentiment.history("acme", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, captured.point.id);

    let quiet = harness_with(FakeModel::default(), FakeSearch::with_quiet(&["Acme"]));
    assert!(matches!(
        quiet.services.sentiment().capture("Acme").await,
        Err(AppError::Upstream(_))
    ));
}
