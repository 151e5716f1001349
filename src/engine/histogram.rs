//! Cumulative histograms rebuilt from windowed percentile gauges.
//!
//! A percentile `p` becomes a bucket with upper bound `p / 100`, every bucket
//! (and the closing `+Inf` one) counts the window's total operations, and the
//! sum is the sum of the reported latencies.

use crate::engine::family::Bucket;

/// Points collected for one window of one bean.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentileWindow {
    ops: Option<f64>,
    points: Vec<(u32, f64)>,
}

impl PercentileWindow {
    pub fn set_ops(&mut self, ops: f64) {
        self.ops = Some(ops);
    }

    pub fn push(&mut self, percentile: u32, latency: f64) {
        self.points.push((percentile, latency));
    }

    /// A window without an operation count reports zero operations.
    pub fn reconstruct(&self) -> (Vec<Bucket>, f64) {
        reconstruct(&self.points, self.ops.unwrap_or(0.0))
    }
}

/// Builds ordered buckets from `(percentile, latency)` points. Percentiles
/// above 100 cannot be placed on the quantile axis and are ignored.
pub fn reconstruct(points: &[(u32, f64)], ops: f64) -> (Vec<Bucket>, f64) {
    let mut valid: Vec<(f64, f64)> = points
        .iter()
        .filter(|(percentile, _)| *percentile <= 100)
        .map(|(percentile, latency)| (f64::from(*percentile) / 100.0, *latency))
        .collect();
    valid.sort_by(|a, b| a.0.total_cmp(&b.0));

    let sum = valid.iter().map(|(_, latency)| latency).sum();
    let mut buckets: Vec<Bucket> = valid
        .iter()
        .map(|(quantile, _)| Bucket {
            upper_bound: *quantile,
            count: ops,
        })
        .collect();
    buckets.push(Bucket {
        upper_bound: f64::INFINITY,
        count: ops,
    });
    (buckets, sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(buckets: &[Bucket]) -> Vec<f64> {
        buckets.iter().map(|b| b.upper_bound).collect()
    }

    #[test]
    fn test_sync_window() {
        let mut window = PercentileWindow::default();
        window.set_ops(1000.0);
        window.push(99, 900.0);
        window.push(50, 120.0);
        window.push(95, 480.0);
        window.push(75, 240.0);

        let (buckets, sum) = window.reconstruct();
        assert_eq!(bounds(&buckets), vec![0.5, 0.75, 0.95, 0.99, f64::INFINITY]);
        assert!(buckets.iter().all(|b| b.count == 1000.0));
        assert_eq!(sum, 1740.0);
    }

    #[test]
    fn test_missing_ops_counts_zero() {
        let mut window = PercentileWindow::default();
        window.push(50, 10.0);
        let (buckets, sum) = window.reconstruct();
        assert_eq!(buckets.len(), 2);
        assert!(buckets.iter().all(|b| b.count == 0.0));
        assert_eq!(sum, 10.0);
    }

    #[test]
    fn test_out_of_range_percentile_ignored() {
        let (buckets, sum) = reconstruct(&[(999, 5.0), (50, 1.0)], 3.0);
        assert_eq!(bounds(&buckets), vec![0.5, f64::INFINITY]);
        assert_eq!(sum, 1.0);
    }
}
