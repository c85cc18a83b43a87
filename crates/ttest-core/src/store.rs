//! External store interfaces and their in-memory implementations.
//!
//! The orchestrator consumes two services:
//!
//! - [`DataSource`]: read-only access to the active dataset plus the
//!   "flush pending edits" call that must succeed before any dispatch.
//! - [`ResultStore`]: the log → analytic → statistic persistence chain. Each
//!   call depends on the id returned by the previous one, so calls are
//!   strictly sequential.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use ttest_model::Dataset;

use crate::error::StoreError;

/// Provider of the dataset being analyzed.
pub trait DataSource {
    /// Flush pending edits. A failure aborts the run before dispatch.
    fn check_and_save(&mut self) -> Result<(), StoreError>;

    /// Row-major dataset; never mutated by the orchestrator.
    fn dataset(&self) -> &Dataset;
}

/// New analytic record under a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalytic {
    pub title: String,
    pub note: Option<String>,
}

/// New statistic record under an analytic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatistic {
    pub title: String,
    /// JSON text of `{"tables": [...]}`.
    pub output_data: String,
    pub components: String,
    pub description: String,
}

/// Sink for persisted results.
pub trait ResultStore {
    fn add_log(&mut self, log: &str) -> Result<u64, StoreError>;
    fn add_analytic(&mut self, log_id: u64, analytic: NewAnalytic) -> Result<u64, StoreError>;
    fn add_statistic(
        &mut self,
        analytic_id: u64,
        statistic: NewStatistic,
    ) -> Result<u64, StoreError>;
}

/// Dataset held in memory with nothing to flush.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    dataset: Dataset,
    saves: usize,
}

impl InMemoryDataSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset, saves: 0 }
    }

    /// How many times pending edits were flushed.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl DataSource for InMemoryDataSource {
    fn check_and_save(&mut self) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }

    fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: u64,
    pub log: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticRecord {
    pub id: u64,
    pub log_id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticRecord {
    pub id: u64,
    pub analytic_id: u64,
    pub title: String,
    pub output_data: String,
    pub components: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Result store kept in memory, with sequential ids shared across record
/// kinds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryResultStore {
    pub logs: Vec<LogRecord>,
    pub analytics: Vec<AnalyticRecord>,
    pub statistics: Vec<StatisticRecord>,
    #[serde(skip)]
    last_id: u64,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Statistics persisted under one analytic, in insertion order.
    pub fn statistics_for(&self, analytic_id: u64) -> impl Iterator<Item = &StatisticRecord> {
        self.statistics
            .iter()
            .filter(move |s| s.analytic_id == analytic_id)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the whole store as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), statistics = self.statistics.len(), "saved results");
        Ok(())
    }
}

impl ResultStore for MemoryResultStore {
    fn add_log(&mut self, log: &str) -> Result<u64, StoreError> {
        let id = self.next_id();
        self.logs.push(LogRecord {
            id,
            log: log.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn add_analytic(&mut self, log_id: u64, analytic: NewAnalytic) -> Result<u64, StoreError> {
        if !self.logs.iter().any(|l| l.id == log_id) {
            return Err(StoreError::rejected(format!("unknown log id {log_id}")));
        }
        let id = self.next_id();
        self.analytics.push(AnalyticRecord {
            id,
            log_id,
            title: analytic.title,
            note: analytic.note,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn add_statistic(
        &mut self,
        analytic_id: u64,
        statistic: NewStatistic,
    ) -> Result<u64, StoreError> {
        if !self.analytics.iter().any(|a| a.id == analytic_id) {
            return Err(StoreError::rejected(format!(
                "unknown analytic id {analytic_id}"
            )));
        }
        let id = self.next_id();
        self.statistics.push(StatisticRecord {
            id,
            analytic_id,
            title: statistic.title,
            output_data: statistic.output_data,
            components: statistic.components,
            description: statistic.description,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statistic(title: &str) -> NewStatistic {
        NewStatistic {
            title: title.to_string(),
            output_data: r#"{"tables":[]}"#.to_string(),
            components: title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn chain_links_ids() {
        let mut store = MemoryResultStore::new();
        let log = store.add_log("T-TEST").unwrap();
        let analytic = store
            .add_analytic(
                log,
                NewAnalytic {
                    title: "Paired Samples T Test".into(),
                    note: None,
                },
            )
            .unwrap();
        store.add_statistic(analytic, statistic("A")).unwrap();
        store.add_statistic(analytic, statistic("B")).unwrap();

        assert_eq!(store.analytics[0].log_id, log);
        let titles: Vec<_> = store.statistics_for(analytic).map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn rejects_dangling_parent() {
        let mut store = MemoryResultStore::new();
        assert!(store.add_statistic(7, statistic("A")).is_err());
        assert!(
            store
                .add_analytic(
                    3,
                    NewAnalytic {
                        title: "x".into(),
                        note: None
                    }
                )
                .is_err()
        );
    }

    #[test]
    fn saves_as_json() {
        let mut store = MemoryResultStore::new();
        store.add_log("T-TEST PAIRS=a WITH b PAIRED").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        store.save_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["logs"][0]["log"], "T-TEST PAIRS=a WITH b PAIRED");
        assert!(value["logs"][0]["createdAt"].is_string());
    }

    #[test]
    fn in_memory_source_counts_saves() {
        let mut source = InMemoryDataSource::new(Dataset::default());
        source.check_and_save().unwrap();
        assert_eq!(source.save_count(), 1);
        assert_eq!(source.dataset().row_count(), 0);
    }
}
