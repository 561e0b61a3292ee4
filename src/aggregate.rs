//! Per-review aggregation of mention polarities, paired with the review's own star rating
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::mention::AspectMention;
use crate::preprocess::PreprocessedReview;

/// Mean polarity of one aspect within one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectPolarity {
  /// review the mentions belong to
  #[serde(rename = "reviewnumber")]
  pub review_number: usize,
  /// aspect label
  pub aspect: String,
  /// mean of the scored mention polarities
  #[serde(rename = "review_polarity")]
  pub polarity: f64,
  /// number of scored mentions averaged
  pub mention_count: usize,
  /// stars the reviewer gave this aspect, if the review rated it
  pub true_label: Option<u8>,
}

/// Average the scored mentions per `(review, aspect)`, ordered by review then aspect label.
/// Pairs without any scored mention are left out; the true label is looked up in the review's
/// rating when `reviews` carries the review.
pub fn summarize(mentions: &[AspectMention], reviews: &[PreprocessedReview]) -> Vec<AspectPolarity> {
  let mut sums: BTreeMap<(usize, &str), (f64, usize)> = BTreeMap::new();
  for mention in mentions {
    if let Some(value) = mention.polarity_strength {
      let sum = sums
        .entry((mention.review_number, mention.aspect.as_str()))
        .or_insert((0.0, 0));
      sum.0 += value;
      sum.1 += 1;
    }
  }
  let ratings: HashMap<usize, &BTreeMap<String, u8>> = reviews
    .iter()
    .map(|review| (review.review_number, &review.rating))
    .collect();

  sums
    .into_iter()
    .map(|((review_number, aspect), (total, count))| AspectPolarity {
      review_number,
      aspect: aspect.to_string(),
      polarity: total / count as f64,
      mention_count: count,
      true_label: ratings
        .get(&review_number)
        .and_then(|rating| rating.get(aspect))
        .copied(),
    })
    .collect()
}

/// Write the aggregated table to disk
pub fn write_polarities<P: AsRef<Path>>(path: P, polarities: &[AspectPolarity]) -> Result<()> {
  write_polarities_to(File::create(path.as_ref())?, polarities)?;
  info!(
    "wrote {} review polarities to {}",
    polarities.len(),
    path.as_ref().display()
  );
  Ok(())
}

/// Write the aggregated table to any writer
pub fn write_polarities_to<W: Write>(writer: W, polarities: &[AspectPolarity]) -> Result<()> {
  let mut csv_writer = csv::Writer::from_writer(writer);
  for polarity in polarities {
    csv_writer.serialize(polarity)?;
  }
  csv_writer.flush()?;
  Ok(())
}

/// Read an aggregated table from disk
pub fn read_polarities<P: AsRef<Path>>(path: P) -> Result<Vec<AspectPolarity>> {
  read_polarities_from(File::open(path)?)
}

/// Read an aggregated table from any reader. Rows with a non-finite polarity are skipped.
pub fn read_polarities_from<R: Read>(reader: R) -> Result<Vec<AspectPolarity>> {
  let mut csv_reader = csv::Reader::from_reader(reader);
  let mut polarities = Vec::new();
  for record in csv_reader.deserialize() {
    let polarity: AspectPolarity = record?;
    if !polarity.polarity.is_finite() {
      warn!(
        "skipping review {} aspect {:?}: polarity {} is not finite",
        polarity.review_number, polarity.aspect, polarity.polarity
      );
      continue;
    }
    polarities.push(polarity);
  }
  Ok(polarities)
}
