//! Summary statistics of a value distribution, as shown by a box-plot.

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::error::{Result, YeonetsError};

/// Whiskers extend to the most extreme data points within this many IQRs from the box.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// The five number summary plus mean and spread of a set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {

    /// Compute the statistics of the given finite values.
    ///
    /// Quartiles use linear interpolation between order statistics, see [`percentile`].
    /// The `label` is only used for the error in case `values` is empty.
    pub fn from_values(values: &[f64], label: usize) -> Result<BoxStats> {
        if values.is_empty() {
            return Err(YeonetsError::EmptyNetwork(label));
        }

        let arr: Array1<f64> = Array1::from(values.to_vec());
        let count = arr.len();
        let mean = arr.sum() / count as f64;
        let std = (arr.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64).sqrt();
        let min = *arr.min_skipnan();
        let max = *arr.max_skipnan();

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);

        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        // Sorted, so the first value inside the fences is the lowest one and vice versa.
        let whisker_low = sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(q1).min(q1);
        let whisker_high = sorted.iter().rev().copied().find(|&v| v <= high_fence).unwrap_or(q3).max(q3);
        let outliers: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Ok(BoxStats {
            count,
            mean,
            std,
            min,
            q1,
            median,
            q3,
            max,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// The interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}


/// Compute the `p`-th percentile (`p` in `[0, 100]`) of ascending `sorted` values, interpolating linearly between the
/// two closest order statistics.
///
/// # Panics
///
/// If `sorted` is empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let p = p.max(0.0).min(100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn percentiles_interpolate_between_order_statistics() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(1.75, percentile(&sorted, 25.0));
        assert_abs_diff_eq!(2.5, percentile(&sorted, 50.0));
        assert_abs_diff_eq!(3.25, percentile(&sorted, 75.0));
        assert_abs_diff_eq!(4.0, percentile(&sorted, 100.0));
        assert_abs_diff_eq!(7.0, percentile(&[7.0], 30.0));
    }

    #[test]
    fn box_stats_of_a_simple_sample() {
        let values = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        let stats = BoxStats::from_values(&values, 1).unwrap();

        assert_eq!(5, stats.count);
        assert_abs_diff_eq!(3.0, stats.mean);
        assert_abs_diff_eq!(2.0_f64.sqrt(), stats.std, epsilon = 1e-12);
        assert_abs_diff_eq!(2.0, stats.q1);
        assert_abs_diff_eq!(3.0, stats.median);
        assert_abs_diff_eq!(4.0, stats.q3);
        assert_abs_diff_eq!(2.0, stats.iqr());
        assert_abs_diff_eq!(1.0, stats.whisker_low);
        assert_abs_diff_eq!(5.0, stats.whisker_high);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn far_values_become_outliers() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0, -50.0];
        let stats = BoxStats::from_values(&values, 1).unwrap();

        assert_abs_diff_eq!(1.5, stats.q1);
        assert_abs_diff_eq!(4.5, stats.q3);
        assert_abs_diff_eq!(1.0, stats.whisker_low);
        assert_abs_diff_eq!(5.0, stats.whisker_high);
        assert_eq!(vec![-50.0, 100.0], stats.outliers);
        assert_abs_diff_eq!(-50.0, stats.min);
        assert_abs_diff_eq!(100.0, stats.max);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = BoxStats::from_values(&[], 4).unwrap_err();
        assert!(matches!(err, YeonetsError::EmptyNetwork(4)));
    }
}
