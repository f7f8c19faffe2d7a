//! Summary statistics over decoded values.
//!
//! Variance and standard deviation are population statistics (divide by N),
//! matching the legacy tooling.

use crate::models::{SimulationOutput, TabularDataset};
use serde::Serialize;

/// Aggregate statistics of one set of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Pooled statistics of a simulation output plus one mean/std per realization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSummary {
    pub overall: Summary,
    pub realization_means: Vec<f64>,
    pub realization_stds: Vec<f64>,
}

/// Statistics of one named column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub summary: Option<Summary>,
}

/// Summarize `values`; `None` when there are none
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    Some(Summary {
        count,
        mean,
        variance,
        std: variance.sqrt(),
        min,
        max,
    })
}

/// Pooled and per-realization statistics; `None` for an empty output
pub fn summarize_output(output: &SimulationOutput) -> Option<OutputSummary> {
    let overall = summarize(output.values())?;

    let (realization_means, realization_stds) = if output.is_single_realization() {
        (vec![overall.mean], vec![overall.std])
    } else {
        output
            .realizations()
            .map(|values| summarize(values).map_or((f64::NAN, f64::NAN), |s| (s.mean, s.std)))
            .unzip()
    };

    Some(OutputSummary {
        overall,
        realization_means,
        realization_stds,
    })
}

/// One summary per variable of a dataset
pub fn summarize_columns(dataset: &TabularDataset) -> Vec<ColumnSummary> {
    dataset
        .variable_names()
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnSummary {
            name: name.clone(),
            summary: dataset.column(index).and_then(|values| summarize(&values)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_population_statistics() {
        let summary = summarize(&[1.0, 2.0]).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 1.5);
        assert_eq!(summary.variance, 0.25);
        assert_eq!(summary.std, 0.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 2.0);
    }

    #[test]
    fn test_divides_by_n() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.variance, 4.0);
        assert_eq!(summary.std, 2.0);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(summarize(&[]).is_none());
        let single = summarize(&[-3.5]).unwrap();
        assert_eq!(single.variance, 0.0);
        assert_eq!(single.min, -3.5);
        assert_eq!(single.max, -3.5);
    }

    #[test]
    fn test_per_realization_not_pooled() {
        let output =
            SimulationOutput::new("t", 2, (2, 1, 1), vec![0.0, 2.0, 10.0, 14.0]).unwrap();
        let summary = summarize_output(&output).unwrap();

        assert_eq!(summary.realization_means, vec![1.0, 12.0]);
        assert_eq!(summary.realization_stds, vec![1.0, 2.0]);
        assert!(approx(summary.overall.mean, 6.5));
        assert_eq!(summary.overall.min, 0.0);
        assert_eq!(summary.overall.max, 14.0);
    }

    #[test]
    fn test_single_realization_output() {
        let output = SimulationOutput::new("t", 1, (3, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let summary = summarize_output(&output).unwrap();
        assert_eq!(summary.realization_means, vec![2.0]);
        assert_eq!(summary.overall.count, 3);
    }

    #[test]
    fn test_column_summaries() {
        let dataset = TabularDataset::new(
            "T",
            vec!["x".to_string(), "value".to_string()],
            vec![vec![0.0, 1.0], vec![1.0, 2.0]],
        )
        .unwrap();
        let columns = summarize_columns(&dataset);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].name, "value");
        assert_eq!(columns[1].summary.unwrap().mean, 1.5);

        let empty = TabularDataset::empty("T", vec!["x".to_string()]);
        assert!(summarize_columns(&empty)[0].summary.is_none());
    }
}
