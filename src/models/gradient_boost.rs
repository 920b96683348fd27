//! Gradient-boosted regression trees on the weekday feature

use crate::data::CallDataset;
use crate::error::{ForecastError, Result};
use crate::models::{TrainedWeekdayModel, WeekdayModel};

/// Parameters for the gradient boosting fit
#[derive(Debug, Clone, Copy)]
pub struct GradientBoostParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to each tree's contribution
    pub learning_rate: f64,
    /// Maximum depth of each regression tree
    pub max_depth: usize,
    /// Minimum number of samples required to split a node
    pub min_samples_split: usize,
}

impl Default for GradientBoostParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

/// Gradient boosting model with a squared-error objective
#[derive(Debug, Clone)]
pub struct GradientBoost {
    /// Name of the model
    name: String,
    /// Boosting parameters
    params: GradientBoostParams,
}

/// Trained gradient boosting model
#[derive(Debug, Clone)]
pub struct TrainedGradientBoost {
    /// Name of the model
    name: String,
    /// Constant base prediction (mean of the training targets)
    base: f64,
    /// Shrinkage applied to each tree's contribution
    learning_rate: f64,
    /// Fitted regression trees, one per boosting round
    trees: Vec<Node>,
}

impl GradientBoost {
    /// Create a model with the default parameters
    pub fn new() -> Self {
        let params = GradientBoostParams::default();
        Self {
            name: format!(
                "Gradient Boosting (n_estimators={}, learning_rate={})",
                params.n_estimators, params.learning_rate
            ),
            params,
        }
    }

    /// Create a model with explicit parameters
    pub fn with_params(params: GradientBoostParams) -> Result<Self> {
        if params.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if params.learning_rate <= 0.0 || params.learning_rate > 1.0 {
            return Err(ForecastError::InvalidParameter(
                "learning_rate must be in (0, 1]".to_string(),
            ));
        }
        if params.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be positive".to_string(),
            ));
        }
        if params.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Gradient Boosting (n_estimators={}, learning_rate={})",
                params.n_estimators, params.learning_rate
            ),
            params,
        })
    }
}

impl Default for GradientBoost {
    fn default() -> Self {
        Self::new()
    }
}

impl WeekdayModel for GradientBoost {
    type Trained = TrainedGradientBoost;

    fn train(&self, data: &CallDataset) -> Result<Self::Trained> {
        let records = data.records();
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot train on an empty dataset".to_string(),
            ));
        }

        let xs: Vec<f64> = records.iter().map(|r| r.weekday as f64).collect();
        let ys: Vec<f64> = records.iter().map(|r| r.calls_offered).collect();
        let base = ys.iter().sum::<f64>() / ys.len() as f64;

        // Ordering by feature value, computed once; residuals change per round
        let mut order: Vec<usize> = (0..xs.len()).collect();
        order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

        let mut current = vec![base; ys.len()];
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let points: Vec<(f64, f64)> = order
                .iter()
                .map(|&i| (xs[i], ys[i] - current[i]))
                .collect();
            let tree = Node::fit(&points, self.params.max_depth, self.params.min_samples_split);

            for (i, x) in xs.iter().enumerate() {
                current[i] += self.params.learning_rate * tree.predict(*x);
            }
            trees.push(tree);
        }

        Ok(TrainedGradientBoost {
            name: self.name.clone(),
            base,
            learning_rate: self.params.learning_rate,
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedWeekdayModel for TrainedGradientBoost {
    fn predict(&self, weekday: u32) -> f64 {
        let x = weekday as f64;
        let boost: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        self.base + self.learning_rate * boost
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Regression tree node over the single weekday feature
#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Fit a depth-limited tree to `points`, which must be sorted by feature
    fn fit(points: &[(f64, f64)], depth: usize, min_samples_split: usize) -> Node {
        if depth == 0 || points.len() < min_samples_split {
            return Node::Leaf(mean_target(points));
        }
        let Some((split_idx, threshold)) = best_split(points) else {
            return Node::Leaf(mean_target(points));
        };

        let (left, right) = points.split_at(split_idx);
        Node::Split {
            threshold,
            left: Box::new(Node::fit(left, depth - 1, min_samples_split)),
            right: Box::new(Node::fit(right, depth - 1, min_samples_split)),
        }
    }

    fn predict(&self, x: f64) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                threshold,
                left,
                right,
            } => {
                if x <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

fn mean_target(points: &[(f64, f64)]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|(_, y)| y).sum::<f64>() / points.len() as f64
}

/// Find the squared-error-minimizing split, if any split beats a single leaf
///
/// Returns the split index into the sorted points and the threshold between
/// the two neighboring feature values.
fn best_split(points: &[(f64, f64)]) -> Option<(usize, f64)> {
    let n = points.len();
    let mut sum = vec![0.0; n + 1];
    let mut sum_sq = vec![0.0; n + 1];
    for (i, (_, y)) in points.iter().enumerate() {
        sum[i + 1] = sum[i] + y;
        sum_sq[i + 1] = sum_sq[i] + y * y;
    }

    let sse = |lo: usize, hi: usize| -> f64 {
        let len = (hi - lo) as f64;
        let segment_sum = sum[hi] - sum[lo];
        (sum_sq[hi] - sum_sq[lo]) - segment_sum * segment_sum / len
    };

    let parent_sse = sse(0, n);
    let mut best: Option<(usize, f64, f64)> = None;

    for i in 1..n {
        // Cannot split between equal feature values
        if points[i - 1].0 == points[i].0 {
            continue;
        }
        let score = sse(0, i) + sse(i, n);
        if best.map_or(true, |(_, _, s)| score < s) {
            let threshold = (points[i - 1].0 + points[i].0) / 2.0;
            best = Some((i, threshold, score));
        }
    }

    best.filter(|&(_, _, score)| score + 1e-12 < parent_sse)
        .map(|(idx, threshold, _)| (idx, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weekday_dataset(weeks: u32, means: [f64; 5]) -> CallDataset {
        // 2024-01-01 is a Monday
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut pairs = Vec::new();
        for week in 0..weeks {
            for day in 0..5u32 {
                let date = start + chrono::Duration::days((week * 7 + day) as i64);
                pairs.push((date, means[day as usize]));
            }
        }
        CallDataset::from_records(pairs).unwrap()
    }

    #[test]
    fn fit_recovers_per_weekday_means() {
        let means = [120.0, 135.0, 150.0, 110.0, 95.0];
        let data = weekday_dataset(4, means);

        let trained = GradientBoost::new().train(&data).unwrap();
        for (weekday, expected) in means.iter().enumerate() {
            let predicted = trained.predict(weekday as u32);
            assert!(
                (predicted - expected).abs() < 0.5,
                "weekday {}: predicted {}, expected {}",
                weekday,
                predicted,
                expected
            );
        }
    }

    #[test]
    fn constant_target_predicts_constant() {
        let data = weekday_dataset(2, [200.0; 5]);
        let trained = GradientBoost::new().train(&data).unwrap();

        for weekday in 0..5 {
            assert!((trained.predict(weekday) - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let zero_rounds = GradientBoostParams {
            n_estimators: 0,
            ..Default::default()
        };
        assert!(GradientBoost::with_params(zero_rounds).is_err());

        let bad_rate = GradientBoostParams {
            learning_rate: 1.5,
            ..Default::default()
        };
        assert!(GradientBoost::with_params(bad_rate).is_err());

        let bad_depth = GradientBoostParams {
            max_depth: 0,
            ..Default::default()
        };
        assert!(GradientBoost::with_params(bad_depth).is_err());
    }

    #[test]
    fn best_split_requires_distinct_features() {
        let points = vec![(1.0, 10.0), (1.0, 20.0), (1.0, 30.0)];
        assert!(best_split(&points).is_none());
    }
}
