use crate::utils::round2;
use std::fmt;

/// Descriptive statistics of a price series. `None` means "not applicable".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceStatistics {
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub iqr: Option<f64>,
}

impl PriceStatistics {
    /// Computes the statistics of `values`; order does not matter.
    ///
    /// An empty series yields nothing. A single value only has min, max,
    /// median and a zero range: mean, sample deviation and quartiles are
    /// left out for n = 1.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        match sorted.as_slice() {
            [] => Self::default(),
            [single] => Self {
                min: Some(*single),
                max: Some(*single),
                median: Some(*single),
                range: Some(0.0),
                ..Self::default()
            },
            _ => {
                let count = sorted.len() as f64;
                let avg = sorted.iter().sum::<f64>() / count;
                let variance = sorted
                    .iter()
                    .map(|p| (p - avg).powi(2))
                    .sum::<f64>() / (count - 1.0);
                let min = sorted[0];
                let max = sorted[sorted.len() - 1];
                let q1 = percentile(&sorted, 0.25);
                let q3 = percentile(&sorted, 0.75);

                Self {
                    average: Some(avg),
                    std_dev: Some(variance.sqrt()),
                    min: Some(min),
                    max: Some(max),
                    range: Some(max - min),
                    q1,
                    median: percentile(&sorted, 0.5),
                    q3,
                    iqr: q1.zip(q3).map(|(lo, hi)| hi - lo),
                }
            }
        }
    }

    /// Labelled fields in display order.
    pub fn fields(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("Average", self.average),
            ("Std Dev", self.std_dev),
            ("Min", self.min),
            ("Max", self.max),
            ("Range", self.range),
            ("Q1", self.q1),
            ("Median", self.median),
            ("Q3", self.q3),
            ("IQR", self.iqr),
        ]
    }
}

/// Linear-interpolation percentile of an ascending slice, `p` in `[0, 1]`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Relative change between the start and end price of a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub percent: f64,
}

impl PriceChange {
    /// `None` when either price is missing or the start price is zero.
    pub fn between(start: Option<f64>, end: Option<f64>) -> Option<Self> {
        let (start, end) = start.zip(end)?;
        if start == 0.0 {
            return None;
        }
        Some(Self {
            percent: (end - start) / start * 100.0,
        })
    }

    pub fn direction(&self) -> &'static str {
        if self.percent >= 0.0 { "increased" } else { "decreased" }
    }

    pub fn magnitude(&self) -> f64 {
        round2(self.percent.abs())
    }
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} by {:.2}%", self.direction(), self.magnitude())
    }
}
