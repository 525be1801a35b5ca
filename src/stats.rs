//! Per-bucket scoring counters for the results HUD
//!
//! Cumulative for the lifetime of one board; cleared when the board is
//! rebuilt for a new row count.

use serde::Serialize;

use crate::sim::rewards::from_units;

/// Hits and reward per bucket, plus drains and EV-resolved units
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketStats {
    pub hits: Vec<u64>,
    /// Reward per bucket in fixed-point units
    pub reward_units: Vec<u64>,
    /// Units lost to the side drains
    pub drained: u64,
    /// Units scored through the expected-value path
    pub expected_hits: u64,
    pub expected_reward_units: u64,
}

impl BucketStats {
    /// Empty counters for `bucket_count` buckets
    pub fn new(bucket_count: usize) -> Self {
        Self {
            hits: vec![0; bucket_count],
            reward_units: vec![0; bucket_count],
            ..Self::default()
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.hits.len()
    }

    /// Count a unit landing in `bucket`
    pub fn record_hit(&mut self, bucket: usize, units: u64) {
        if let (Some(hits), Some(reward)) =
            (self.hits.get_mut(bucket), self.reward_units.get_mut(bucket))
        {
            *hits += 1;
            *reward = reward.saturating_add(units);
        }
    }

    pub fn record_drain(&mut self) {
        self.drained += 1;
    }

    pub fn record_expected(&mut self, units: u64) {
        self.expected_hits += 1;
        self.expected_reward_units = self.expected_reward_units.saturating_add(units);
    }

    /// Units that reached a scoring bucket
    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    /// Total reward earned on this board, including EV scoring
    pub fn total_reward(&self) -> f64 {
        let buckets: u64 = self.reward_units.iter().sum();
        from_units(buckets.saturating_add(self.expected_reward_units))
    }

    /// Reward earned in `bucket`
    pub fn reward(&self, bucket: usize) -> f64 {
        self.reward_units.get(bucket).copied().map_or(0.0, from_units)
    }

    /// Share of hits per bucket, in percent (all zero before the first hit)
    pub fn distribution(&self) -> Vec<f64> {
        let total = self.total_hits();
        if total == 0 {
            return vec![0.0; self.hits.len()];
        }
        self.hits
            .iter()
            .map(|&h| h as f64 / total as f64 * 100.0)
            .collect()
    }

    /// Check if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.total_hits() == 0 && self.drained == 0 && self.expected_hits == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_distribution() {
        let mut stats = BucketStats::new(3);
        assert!(stats.is_empty());
        assert_eq!(stats.distribution(), vec![0.0, 0.0, 0.0]);

        stats.record_hit(0, 70_000);
        stats.record_hit(1, 8_000);
        stats.record_hit(1, 8_000);
        stats.record_hit(2, 70_000);
        stats.record_drain();

        assert_eq!(stats.total_hits(), 4);
        assert_eq!(stats.drained, 1);
        assert_eq!(stats.distribution(), vec![25.0, 50.0, 25.0]);
        assert_eq!(stats.reward(1), 1.6);
        assert_eq!(stats.total_reward(), 15.6);
    }

    #[test]
    fn test_out_of_range_bucket_ignored() {
        let mut stats = BucketStats::new(2);
        stats.record_hit(5, 10);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_expected_path_counts_separately() {
        let mut stats = BucketStats::new(9);
        stats.record_expected(12_703);
        assert_eq!(stats.total_hits(), 0);
        assert!(!stats.is_empty());
        assert_eq!(stats.total_reward(), 1.2703);
    }
}
