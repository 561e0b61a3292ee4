//! The aspect-mention table: one row per located aspect keyword, extended with the
//! derived polarity fields once scored
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::lexicon::strip_non_word;
use crate::resolver::PolarityResult;

/// One occurrence of an aspect keyword in a review sentence
#[derive(Debug, Clone, PartialEq)]
pub struct AspectMention {
  /// position of the review in the preprocessed table
  pub review_number: usize,
  /// index of the sentence within the review
  pub sentence_index: usize,
  /// index of the word within the sentence
  pub word_index: usize,
  /// the matched word, stripped of non-word characters
  pub word_found: String,
  /// label of the matched aspect, e.g. `Grafik`
  pub aspect: String,
  /// signed polarity of the mention, once scored
  pub polarity_strength: Option<f64>,
  /// descriptor surface forms used for the score
  pub sentiment_words: Vec<String>,
  /// intensifier and shifter surface forms that altered the score
  pub intensifier_words: Vec<String>,
}

impl AspectMention {
  /// A fresh, unscored mention
  pub fn new(
    review_number: usize,
    sentence_index: usize,
    word_index: usize,
    word_found: &str,
    aspect: &str,
  ) -> Self {
    AspectMention {
      review_number,
      sentence_index,
      word_index,
      word_found: strip_non_word(word_found),
      aspect: aspect.to_string(),
      polarity_strength: None,
      sentiment_words: Vec::new(),
      intensifier_words: Vec::new(),
    }
  }

  /// Attach a resolver result to the mention, replacing earlier derived fields
  pub fn apply(&mut self, result: &PolarityResult) {
    self.polarity_strength = Some(result.value);
    self.sentiment_words = vec![result.descriptor.clone()];
    self.intensifier_words = result.contributing_words.clone();
  }

  /// drop the derived fields
  pub fn clear_derived(&mut self) {
    self.polarity_strength = None;
    self.sentiment_words.clear();
    self.intensifier_words.clear();
  }

  /// true once a polarity has been attached
  pub fn is_scored(&self) -> bool {
    self.polarity_strength.is_some()
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct MentionRow {
  reviewnumber: usize,
  word_found: String,
  sent_idx: usize,
  word_idx: usize,
  aspect: String,
  #[serde(default)]
  polarity_strength: String,
  #[serde(default)]
  sentiment_words: String,
  #[serde(default)]
  intensifier_words: String,
}

/// Decode a list cell: a JSON array, tolerating single-quoted (Python repr) strings
pub(crate) fn decode_list(cell: &str) -> Vec<String> {
  let cell = cell.trim();
  if cell.is_empty() {
    return Vec::new();
  }
  serde_json::from_str::<Vec<String>>(cell)
    .or_else(|_| serde_json::from_str::<Vec<String>>(&cell.replace('\'', "\"")))
    .unwrap_or_else(|_| {
      warn!("unreadable list cell {:?}, treating as empty", cell);
      Vec::new()
    })
}

pub(crate) fn encode_list(words: &[String]) -> Result<String> {
  Ok(serde_json::to_string(words)?)
}

/// Decode a polarity cell: a plain number, or the first element of a bracketed list.
/// Non-finite values (`nan`, `inf`) read as unscored.
fn decode_polarity(cell: &str) -> Option<f64> {
  let inner = cell.trim().trim_start_matches('[').trim_end_matches(']');
  let value: f64 = inner.split(',').next()?.trim().parse().ok()?;
  if value.is_finite() {
    Some(value)
  } else {
    None
  }
}

impl From<MentionRow> for AspectMention {
  fn from(row: MentionRow) -> AspectMention {
    let mut mention = AspectMention::new(
      row.reviewnumber,
      row.sent_idx,
      row.word_idx,
      &row.word_found,
      &row.aspect,
    );
    mention.polarity_strength = decode_polarity(&row.polarity_strength);
    mention.sentiment_words = decode_list(&row.sentiment_words);
    mention.intensifier_words = decode_list(&row.intensifier_words);
    mention
  }
}

/// Read a mention table from disk
pub fn read_mentions<P: AsRef<Path>>(path: P) -> Result<Vec<AspectMention>> {
  let mentions = read_mentions_from(File::open(path.as_ref())?)?;
  info!(
    "read {} aspect mentions from {}",
    mentions.len(),
    path.as_ref().display()
  );
  Ok(mentions)
}

/// Read a mention table; rows that do not deserialize are skipped with a warning
pub fn read_mentions_from<R: Read>(reader: R) -> Result<Vec<AspectMention>> {
  let mut csv_reader = csv::Reader::from_reader(reader);
  let mut mentions = Vec::new();
  for (index, record) in csv_reader.deserialize::<MentionRow>().enumerate() {
    match record {
      Ok(row) => mentions.push(AspectMention::from(row)),
      Err(e) => warn!("skipping mention row {}: {}", index + 1, e),
    }
  }
  Ok(mentions)
}

/// Write a mention table to disk
pub fn write_mentions<P: AsRef<Path>>(path: P, mentions: &[AspectMention]) -> Result<()> {
  write_mentions_to(File::create(path.as_ref())?, mentions)?;
  info!(
    "wrote {} aspect mentions to {}",
    mentions.len(),
    path.as_ref().display()
  );
  Ok(())
}

/// Write a mention table with list columns as JSON arrays
pub fn write_mentions_to<W: Write>(writer: W, mentions: &[AspectMention]) -> Result<()> {
  let mut csv_writer = csv::Writer::from_writer(writer);
  for mention in mentions {
    csv_writer.serialize(MentionRow {
      reviewnumber: mention.review_number,
      word_found: mention.word_found.clone(),
      sent_idx: mention.sentence_index,
      word_idx: mention.word_index,
      aspect: mention.aspect.clone(),
      polarity_strength: mention
        .polarity_strength
        .map(|value| value.to_string())
        .unwrap_or_default(),
      sentiment_words: encode_list(&mention.sentiment_words)?,
      intensifier_words: encode_list(&mention.intensifier_words)?,
    })?;
  }
  csv_writer.flush()?;
  Ok(())
}
