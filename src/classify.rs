//! Mapping aggregated polarities to coarse sentiment labels: star ratings collapse into three
//! classes, and a one-vs-rest logistic regression learns the mapping from polarity.
use std::collections::HashMap;
use std::fmt;

use aprender::classification::LogisticRegression;
use aprender::metrics::classification::{accuracy, confusion_matrix};
use aprender::primitives::Matrix;
use aprender::AprenderError;
use tracing::info;

use crate::error::Result;

/// Coarse sentiment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
  /// 0 or 1 stars
  Negative,
  /// 2 or 3 stars
  Neutral,
  /// 4 or 5 stars
  Positive,
}

impl Sentiment {
  /// all classes, in index order
  pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

  /// Collapse a six-point star rating (0 to 5 lit stars) into a class
  pub fn from_stars(stars: u8) -> Option<Sentiment> {
    match stars {
      0 | 1 => Some(Sentiment::Negative),
      2 | 3 => Some(Sentiment::Neutral),
      4 | 5 => Some(Sentiment::Positive),
      _ => None,
    }
  }

  /// position in `Sentiment::ALL`
  pub fn index(self) -> usize {
    match self {
      Sentiment::Negative => 0,
      Sentiment::Neutral => 1,
      Sentiment::Positive => 2,
    }
  }

  fn name(self) -> &'static str {
    match self {
      Sentiment::Negative => "negative",
      Sentiment::Neutral => "neutral",
      Sentiment::Positive => "positive",
    }
  }
}

impl fmt::Display for Sentiment {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// One training example: an aggregated polarity and its true class
pub type Sample = (f64, Sentiment);

/// Split samples into class-balanced train and test sets. Every class present is capped at the
/// count of the rarest class; `train_fraction` of that budget goes to training, the rest to
/// testing, filled in input order.
pub fn balanced_split(samples: &[Sample], train_fraction: f64) -> (Vec<Sample>, Vec<Sample>) {
  let mut counts: HashMap<Sentiment, usize> = HashMap::new();
  for (_, label) in samples {
    *counts.entry(*label).or_insert(0) += 1;
  }
  let labels = counts.len();
  let rarest = match counts.values().min() {
    Some(&rarest) => rarest,
    None => return (Vec::new(), Vec::new()),
  };
  let data_size = rarest * labels;
  let train_size = (train_fraction * data_size as f64) as usize;
  let test_size = data_size - train_size;
  let (train_cap, test_cap) = (train_size / labels, test_size / labels);

  let mut train = Vec::new();
  let mut test = Vec::new();
  let mut train_counts = [0usize; 3];
  let mut test_counts = [0usize; 3];
  for &(x, label) in samples {
    let index = label.index();
    if train_counts[index] < train_cap {
      train_counts[index] += 1;
      train.push((x, label));
    } else if test_counts[index] < test_cap {
      test_counts[index] += 1;
      test.push((x, label));
    }
  }
  (train, test)
}

/// One-vs-rest logistic regression over a single feature: one binary aprender classifier per
/// class, each fitted by batch gradient descent from zero weights.
#[derive(Debug, Clone)]
pub struct SentimentModel {
  /// gradient descent steps per binary classifier
  pub iterations: usize,
  /// step size
  pub learning_rate: f32,
  classifiers: Vec<LogisticRegression>,
}

impl Default for SentimentModel {
  fn default() -> SentimentModel {
    SentimentModel {
      iterations: 2000,
      learning_rate: 0.5,
      classifiers: Vec::new(),
    }
  }
}

fn feature_matrix(polarities: &[f64]) -> Result<Matrix<f32>> {
  let column: Vec<f32> = polarities.iter().map(|&x| x as f32).collect();
  Ok(Matrix::from_vec(column.len(), 1, column).map_err(AprenderError::from)?)
}

impl SentimentModel {
  /// An unfitted model with default settings
  pub fn new() -> Self {
    SentimentModel::default()
  }

  /// Builder-style override of the number of gradient steps
  pub fn with_iterations(mut self, iterations: usize) -> Self {
    self.iterations = iterations;
    self
  }

  /// Whether `fit` has succeeded
  pub fn is_fitted(&self) -> bool {
    self.classifiers.len() == Sentiment::ALL.len()
  }

  /// Fit one classifier per class to `samples`, replacing earlier fits
  pub fn fit(&mut self, samples: &[Sample]) -> Result<()> {
    self.classifiers.clear();
    let polarities: Vec<f64> = samples.iter().map(|(x, _)| *x).collect();
    let features = feature_matrix(&polarities)?;
    let mut classifiers = Vec::with_capacity(Sentiment::ALL.len());
    for class in Sentiment::ALL.iter() {
      let targets: Vec<usize> = samples
        .iter()
        .map(|(_, label)| usize::from(label == class))
        .collect();
      let mut classifier = LogisticRegression::new()
        .with_learning_rate(self.learning_rate)
        .with_max_iter(self.iterations);
      classifier.fit(&features, &targets)?;
      info!(
        "fitted {} vs rest on {} samples: coefficient {:?}, intercept {}",
        class,
        samples.len(),
        classifier.coefficients().as_slice(),
        classifier.intercept()
      );
      classifiers.push(classifier);
    }
    self.classifiers = classifiers;
    Ok(())
  }

  /// Class probabilities for every polarity, in `Sentiment::ALL` order. The one-vs-rest
  /// scores are normalized to sum to one.
  pub fn predict_proba(&self, polarities: &[f64]) -> Result<Vec<[f64; 3]>> {
    if !self.is_fitted() {
      return Err(AprenderError::from("model is not fitted").into());
    }
    let features = feature_matrix(polarities)?;
    let mut probabilities = vec![[0.0; 3]; polarities.len()];
    for (k, classifier) in self.classifiers.iter().enumerate() {
      for (row, score) in classifier.predict_proba(&features).as_slice().iter().enumerate() {
        probabilities[row][k] = f64::from(*score);
      }
    }
    for row in probabilities.iter_mut() {
      let total: f64 = row.iter().sum();
      if total > 0.0 {
        for probability in row.iter_mut() {
          *probability /= total;
        }
      }
    }
    Ok(probabilities)
  }

  /// Most probable class for every polarity; ties go to the earlier class
  pub fn predict(&self, polarities: &[f64]) -> Result<Vec<Sentiment>> {
    let probabilities = self.predict_proba(polarities)?;
    Ok(
      probabilities
        .iter()
        .map(|row| {
          let mut best = 0;
          for k in 1..row.len() {
            if row[k] > row[best] {
              best = k;
            }
          }
          Sentiment::ALL[best]
        })
        .collect(),
    )
  }
}

/// Counts of (true class, predicted class) pairs, with the share of correct predictions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfusionMatrix {
  counts: [[usize; 3]; 3],
  accuracy: f32,
}

impl ConfusionMatrix {
  /// Tally predictions against truths, pairwise
  pub fn from_pairs(truths: &[Sentiment], predictions: &[Sentiment]) -> Self {
    let length = truths.len().min(predictions.len());
    if length == 0 {
      return ConfusionMatrix::default();
    }
    let y_true: Vec<usize> = truths[..length].iter().map(|label| label.index()).collect();
    let y_pred: Vec<usize> = predictions[..length].iter().map(|label| label.index()).collect();
    // aprender sizes the matrix by the largest label seen
    let tallied = confusion_matrix(&y_pred, &y_true);
    let mut counts = [[0usize; 3]; 3];
    for (truth, row) in counts.iter_mut().enumerate().take(tallied.n_rows()) {
      for (predicted, count) in row.iter_mut().enumerate().take(tallied.n_cols()) {
        *count = tallied.get(truth, predicted);
      }
    }
    ConfusionMatrix {
      counts,
      accuracy: accuracy(&y_pred, &y_true),
    }
  }

  /// how often `truth` was predicted as `predicted`
  pub fn get(&self, truth: Sentiment, predicted: Sentiment) -> usize {
    self.counts[truth.index()][predicted.index()]
  }

  /// number of tallied pairs
  pub fn total(&self) -> usize {
    self.counts.iter().flatten().sum()
  }

  /// share of pairs on the diagonal, `0` when empty
  pub fn accuracy(&self) -> f64 {
    f64::from(self.accuracy)
  }
}

impl fmt::Display for ConfusionMatrix {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:>10}", "true\\pred")?;
    for label in Sentiment::ALL.iter() {
      write!(f, " {:>9}", label.name())?;
    }
    writeln!(f)?;
    for truth in Sentiment::ALL.iter() {
      write!(f, "{:>10}", truth.name())?;
      for predicted in Sentiment::ALL.iter() {
        write!(f, " {:>9}", self.get(*truth, *predicted))?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

/// Predict every test sample and tally the outcome
pub fn evaluate(model: &SentimentModel, test: &[Sample]) -> Result<ConfusionMatrix> {
  let polarities: Vec<f64> = test.iter().map(|(x, _)| *x).collect();
  let truths: Vec<Sentiment> = test.iter().map(|(_, label)| *label).collect();
  let predictions = model.predict(&polarities)?;
  Ok(ConfusionMatrix::from_pairs(&truths, &predictions))
}
