//! Periodic sentiment sweep over the monitored companies.
//!
//! Each sweep walks the monitored list one company at a time, captures its
//! LinkedIn sentiment and stamps it as checked. A company whose capture
//! keeps failing is put on the skip list until an admin takes it off again.
//! With Redis available, a lock keeps two instances from sweeping at once.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::MissedTickBehavior;

use crate::config::{MonitorSettings, MONITOR_LOCK_RESOURCE};
use crate::domain::{company_key, SweepReport};
use crate::errors::AppResult;
use crate::infra::Cache;
use crate::services::{MonitoringService, SentimentService};

/// Company keys the monitor passes over. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct SkipList {
    keys: Arc<RwLock<HashSet<String>>>,
}

impl SkipList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the company was already skipped.
    pub async fn skip(&self, name: &str) -> bool {
        self.keys.write().await.insert(company_key(name))
    }

    /// Returns false when the company was not skipped.
    pub async fn unskip(&self, name: &str) -> bool {
        self.keys.write().await.remove(&company_key(name))
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.keys.read().await.contains(&company_key(name))
    }

    /// Skipped company keys, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.read().await.iter().cloned().collect();
        keys.sort();
        keys
    }
}

pub struct SentimentMonitor {
    monitoring: Arc<dyn MonitoringService>,
    sentiment: Arc<dyn SentimentService>,
    skip_list: SkipList,
    cache: Option<Cache>,
    settings: MonitorSettings,
    /// Consecutive failures per company key
    failures: Mutex<HashMap<String, u32>>,
}

impl SentimentMonitor {
    pub fn new(
        monitoring: Arc<dyn MonitoringService>,
        sentiment: Arc<dyn SentimentService>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            monitoring,
            sentiment,
            skip_list: SkipList::new(),
            cache: None,
            settings,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Take the sweep lock in Redis before each sweep.
    pub fn with_lock(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn skip_list(&self) -> &SkipList {
        &self.skip_list
    }

    /// Drop everything the monitor remembers about a company: its skip
    /// list entry and its failure count. Called when it stops being monitored.
    pub async fn forget(&self, name: &str) {
        self.skip_list.unskip(name).await;
        self.failures.lock().await.remove(&company_key(name));
    }

    /// Consecutive failed captures recorded for a company.
    pub async fn failure_count(&self, name: &str) -> u32 {
        self.failures
            .lock()
            .await
            .get(&company_key(name))
            .copied()
            .unwrap_or(0)
    }

    /// One pass over the monitored companies.
    pub async fn run_once(&self) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        let lock = match &self.cache {
            Some(cache) => {
                match cache
                    .try_acquire_lock(MONITOR_LOCK_RESOURCE, self.settings.interval_seconds)
                    .await?
                {
                    Some(guard) => Some(guard),
                    None => {
                        tracing::info!("Sentiment sweep already running elsewhere, skipping");
                        report.lock_contended = true;
                        return Ok(report);
                    }
                }
            }
            None => None,
        };

        let companies = self.monitoring.list().await?;
        tracing::info!(companies = companies.len(), "Sentiment sweep started");

        for company in companies {
            let name = company.name;
            if self.skip_list.contains(&name).await {
                report.skipped.push(name);
                continue;
            }

            match self.sentiment.capture(&name).await {
                Ok(captured) => {
                    if let Err(e) = self.monitoring.mark_checked(&name, Utc::now()).await {
                        tracing::warn!(company = %name, error = %e, "Failed to stamp check time");
                    }
                    tracing::debug!(company = %name, score = captured.point.score, "Company swept");
                    self.failures.lock().await.remove(&company_key(&name));
                    report.processed.push(name);
                }
                Err(e) => {
                    let key = company_key(&name);
                    let mut failures = self.failures.lock().await;
                    let count = failures.entry(key.clone()).or_insert(0);
                    *count += 1;
                    tracing::warn!(company = %name, failures = *count, error = %e, "Sentiment capture failed");

                    if *count >= self.settings.failure_threshold {
                        failures.remove(&key);
                        drop(failures);
                        self.skip_list.skip(&name).await;
                        tracing::warn!(
                            company = %name,
                            threshold = self.settings.failure_threshold,
                            "Company added to skip list after repeated failures"
                        );
                        report.newly_skipped.push(name.clone());
                    }
                    report.failed.push(name);
                }
            }
        }

        if let Some(guard) = lock {
            if let Err(e) = guard.release().await {
                tracing::warn!(error = %e, "Failed to release sweep lock");
            }
        }

        tracing::info!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Sentiment sweep finished"
        );
        Ok(report)
    }

    /// Sweep every `interval_seconds` until `shutdown` flips to true or its
    /// sender goes away. The first sweep runs immediately.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.settings.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_seconds = self.settings.interval_seconds,
            "Sentiment monitor started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Sentiment sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Sentiment monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LinkedInSentiment, MonitoredCompany, SentimentPoint};
    use crate::errors::AppError;
    use crate::services::{MockMonitoringService, MockSentimentService, SentimentCapture};
    use uuid::Uuid;

    fn settings(threshold: u32) -> MonitorSettings {
        MonitorSettings {
            enabled: true,
            interval_seconds: 3600,
            failure_threshold: threshold,
        }
    }

    fn monitored(names: &[&str]) -> Vec<MonitoredCompany> {
        names
            .iter()
            .map(|name| MonitoredCompany {
                id: Uuid::new_v4(),
                name: name.to_string(),
                added_by: None,
                created_at: Utc::now(),
                last_checked_at: None,
            })
            .collect()
    }

    fn captured(company: &str) -> SentimentCapture {
        SentimentCapture {
            point: SentimentPoint {
                id: Uuid::new_v4(),
                company_name: company.to_string(),
                score: 0.2,
                positive: 40.0,
                neutral: 40.0,
                negative: 20.0,
                sample_size: 3,
                themes: vec![],
                recorded_at: Utc::now(),
            },
            sentiment: LinkedInSentiment::default(),
        }
    }

    fn monitor(threshold: u32) -> SentimentMonitor {
        let mut monitoring = MockMonitoringService::new();
        monitoring
            .expect_list()
            .returning(|| Ok(monitored(&["Acme", "Globex", "Initech"])));
        monitoring.expect_mark_checked().returning(|_, _| Ok(()));

        let mut sentiment = MockSentimentService::new();
        sentiment.expect_capture().returning(|company| {
            if company == "Globex" {
                Err(AppError::upstream("no mentions"))
            } else {
                Ok(captured(company))
            }
        });

        SentimentMonitor::new(Arc::new(monitoring), Arc::new(sentiment), settings(threshold))
    }

    #[tokio::test]
    async fn test_skip_list_normalizes_names() {
        let skip_list = SkipList::new();
        assert!(skip_list.skip("Acme  Corp").await);
        assert!(!skip_list.skip("acme corp").await);
        assert!(skip_list.contains("ACME CORP").await);
        assert_eq!(skip_list.list().await, vec!["acme corp"]);
        assert!(skip_list.unskip("Acme Corp").await);
        assert!(!skip_list.unskip("Acme Corp").await);
    }

    #[tokio::test]
    async fn test_sweep_processes_and_counts_failures() {
        let monitor = monitor(3);
        let report = monitor.run_once().await.unwrap();
        assert_eq!(report.processed, vec!["Acme", "Initech"]);
        assert_eq!(report.failed, vec!["Globex"]);
        assert!(report.newly_skipped.is_empty());
        assert!(!report.lock_contended);
    }

    #[tokio::test]
    async fn test_repeated_failures_skip_company() {
        let monitor = monitor(2);

        monitor.run_once().await.unwrap();
        let second = monitor.run_once().await.unwrap();
        assert_eq!(second.newly_skipped, vec!["Globex"]);
        assert!(monitor.skip_list().contains("globex").await);

        let third = monitor.run_once().await.unwrap();
        assert_eq!(third.skipped, vec!["Globex"]);
        assert!(third.failed.is_empty());
    }

    #[tokio::test]
    async fn test_unskip_starts_counting_afresh() {
        let monitor = monitor(2);
        monitor.run_once().await.unwrap();
        monitor.run_once().await.unwrap();
        monitor.skip_list().unskip("Globex").await;

        let report = monitor.run_once().await.unwrap();
        assert_eq!(report.failed, vec!["Globex"]);
        assert!(report.newly_skipped.is_empty());
    }

    #[tokio::test]
    async fn test_forget_clears_skip_and_failures() {
        let monitor = monitor(2);
        monitor.run_once().await.unwrap();
        assert_eq!(monitor.failure_count("Globex").await, 1);

        monitor.forget("GLOBEX").await;
        assert_eq!(monitor.failure_count("Globex").await, 0);

        monitor.run_once().await.unwrap();
        monitor.run_once().await.unwrap();
        assert!(monitor.skip_list().contains("Globex").await);

        monitor.forget("Globex").await;
        assert!(!monitor.skip_list().contains("Globex").await);
        assert_eq!(monitor.failure_count("Globex").await, 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let monitor = Arc::new(monitor(3));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(monitor.run(rx));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("monitor should stop")
            .unwrap();
    }
}
