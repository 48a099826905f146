//! Timing statistics over per-row invocation times.

use std::time::Duration;

use serde::Serialize;
use verdict::format_duration;

/// Summary statistics of a set of durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimingStats {
    pub samples: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    /// Median duration (p50)
    pub median: Duration,
    /// 95th percentile
    pub p95: Duration,
    /// Population standard deviation
    pub std_dev: Duration,
    pub total: Duration,
}

impl TimingStats {
    /// Compute statistics, or `None` when there are no samples.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let total: Duration = sorted.iter().sum();
        let mean = total / u32::try_from(sorted.len()).unwrap_or(u32::MAX);
        let mean_secs = mean.as_secs_f64();
        let variance = sorted
            .iter()
            .map(|d| {
                let diff = d.as_secs_f64() - mean_secs;
                diff * diff
            })
            .sum::<f64>()
            / sorted.len() as f64;

        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2
        } else {
            sorted[sorted.len() / 2]
        };

        Some(Self {
            samples: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median,
            p95: percentile(&sorted, 95.0),
            std_dev: Duration::from_secs_f64(variance.sqrt()),
            total,
        })
    }

    /// One-line summary, e.g. `avg 12 us, median 10 us, p95 30 us (4 rows)`
    pub fn to_string_pretty(&self) -> String {
        format!(
            "avg {}, median {}, p95 {}, max {} ({} rows)",
            format_duration(self.mean),
            format_duration(self.median),
            format_duration(self.p95),
            format_duration(self.max),
            self.samples
        )
    }
}

/// Nearest-rank percentile of sorted samples
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    #[test]
    fn test_empty_samples() {
        assert!(TimingStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_basic_stats() {
        let stats = TimingStats::from_samples(&ms(&[4, 1, 3, 2])).unwrap();
        assert_eq!(stats.samples, 4);
        assert_eq!(stats.min, Duration::from_millis(1));
        assert_eq!(stats.max, Duration::from_millis(4));
        assert_eq!(stats.median, Duration::from_micros(2500));
        assert_eq!(stats.total, Duration::from_millis(10));
        let mean_ms = stats.mean.as_secs_f64() * 1000.0;
        assert!((mean_ms - 2.5).abs() < 1e-6);
        // Population std dev of 1..=4 is sqrt(1.25)
        let std_ms = stats.std_dev.as_secs_f64() * 1000.0;
        assert!((std_ms - 1.25_f64.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_single_sample() {
        let stats = TimingStats::from_samples(&ms(&[7])).unwrap();
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.median, Duration::from_millis(7));
        assert_eq!(stats.p95, Duration::from_millis(7));
        assert_eq!(stats.std_dev, Duration::ZERO);
    }

    #[test]
    fn test_percentile_picks_tail() {
        let samples: Vec<u64> = (1..=100).collect();
        let stats = TimingStats::from_samples(&ms(&samples)).unwrap();
        assert_eq!(stats.p95, Duration::from_millis(95));
    }

    #[test]
    fn test_pretty_format() {
        let stats = TimingStats::from_samples(&ms(&[2, 2])).unwrap();
        assert_eq!(
            stats.to_string_pretty(),
            "avg 2 ms, median 2 ms, p95 2 ms, max 2 ms (2 rows)"
        );
    }

    proptest! {
        #[test]
        fn stats_are_ordered(values in prop::collection::vec(0u64..1_000_000, 1..50)) {
            let samples: Vec<Duration> = values.iter().map(|v| Duration::from_micros(*v)).collect();
            let stats = TimingStats::from_samples(&samples).unwrap();
            prop_assert!(stats.min <= stats.median);
            prop_assert!(stats.median <= stats.p95);
            prop_assert!(stats.p95 <= stats.max);
            prop_assert!(stats.min <= stats.mean + Duration::from_nanos(1));
            prop_assert!(stats.mean <= stats.max + Duration::from_nanos(1));
        }
    }
}
