use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use super::preset::Preset;

/// Generations kept for the detailed view
const HISTORY_LIMIT: usize = 1000;

/// One finished generation, successful or not
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub topics: Vec<String>,
    pub minutes: f64,
    pub preset: Preset,
    pub latency_ms: u64,
    pub success: bool,
    pub cached: bool,
    pub timing_accuracy: Option<f64>,
    pub retries: u32,
    pub fallback_applied: bool,
    /// Failing collaborator, for dependency errors
    pub dependency: Option<String>,
    pub error: Option<String>,
}

/// Aggregates over every recorded generation since startup
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MetricsSummary {
    pub total_generations: u64,
    pub successful: u64,
    pub failed: u64,
    /// Percent
    pub success_rate: f64,
    pub cache_hits: u64,
    pub fallbacks: u64,
    pub mean_latency_ms: f64,
    pub fastest_ms: Option<u64>,
    pub slowest_ms: Option<u64>,
    /// Mean over successful, uncached generations
    pub mean_timing_accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedMetrics {
    pub summary: MetricsSummary,
    pub by_preset: Vec<PresetMetrics>,
    pub recent: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PresetMetrics {
    pub preset: Preset,
    pub generations: u64,
    pub mean_latency_ms: f64,
    pub mean_timing_accuracy: f64,
}

#[derive(Default)]
struct Totals {
    total: u64,
    successful: u64,
    cache_hits: u64,
    fallbacks: u64,
    latency_sum_ms: u64,
    fastest_ms: Option<u64>,
    slowest_ms: Option<u64>,
    accuracy_sum: f64,
    accuracy_count: u64,
}

/// In-process generation statistics
pub struct GenerationMetrics {
    totals: RwLock<Totals>,
    history: RwLock<VecDeque<GenerationRecord>>,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self {
            totals: RwLock::new(Totals::default()),
            history: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn record(&self, record: GenerationRecord) {
        let mut totals = self.totals.write().await;
        totals.total += 1;
        totals.latency_sum_ms += record.latency_ms;
        if record.success {
            totals.successful += 1;
            totals.fastest_ms = Some(totals.fastest_ms.map_or(record.latency_ms, |f| f.min(record.latency_ms)));
            totals.slowest_ms = Some(totals.slowest_ms.map_or(record.latency_ms, |s| s.max(record.latency_ms)));
        }
        if record.cached {
            totals.cache_hits += 1;
        }
        if record.fallback_applied {
            totals.fallbacks += 1;
        }
        if let (Some(accuracy), false) = (record.timing_accuracy, record.cached) {
            totals.accuracy_sum += accuracy;
            totals.accuracy_count += 1;
        }
        drop(totals);

        let mut history = self.history.write().await;
        history.push_back(record);
        if history.len() > HISTORY_LIMIT {
            history.pop_front();
        }
    }

    pub async fn summary(&self) -> MetricsSummary {
        let totals = self.totals.read().await;
        MetricsSummary {
            total_generations: totals.total,
            successful: totals.successful,
            failed: totals.total - totals.successful,
            success_rate: percent(totals.successful, totals.total),
            cache_hits: totals.cache_hits,
            fallbacks: totals.fallbacks,
            mean_latency_ms: mean(totals.latency_sum_ms as f64, totals.total),
            fastest_ms: totals.fastest_ms,
            slowest_ms: totals.slowest_ms,
            mean_timing_accuracy: mean(totals.accuracy_sum, totals.accuracy_count),
        }
    }

    /// Summary plus a per-preset breakdown and the latest `recent` records, newest first
    pub async fn detailed(&self, recent: usize) -> DetailedMetrics {
        let summary = self.summary().await;
        let history = self.history.read().await;

        let by_preset = [Preset::Fast, Preset::Balanced, Preset::Precise]
            .into_iter()
            .filter_map(|preset| {
                let runs: Vec<_> = history
                    .iter()
                    .filter(|r| r.preset == preset && r.success && !r.cached)
                    .collect();
                if runs.is_empty() {
                    return None;
                }
                let n = runs.len() as u64;
                let accuracies: Vec<f64> = runs.iter().filter_map(|r| r.timing_accuracy).collect();
                Some(PresetMetrics {
                    preset,
                    generations: n,
                    mean_latency_ms: mean(runs.iter().map(|r| r.latency_ms as f64).sum(), n),
                    mean_timing_accuracy: mean(accuracies.iter().sum(), accuracies.len() as u64),
                })
            })
            .collect();

        DetailedMetrics {
            summary,
            by_preset,
            recent: history.iter().rev().take(recent).cloned().collect(),
        }
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((sum / count as f64) * 10.0).round() / 10.0
}

fn percent(part: u64, whole: u64) -> f64 {
    mean(part as f64 * 100.0, whole)
}
