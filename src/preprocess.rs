//! Reading scraped review files, normalizing their text and splitting it into sentences and
//! words
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;
use whatlang::{detect, Lang, Script};

use crate::error::{Error, Result};
use crate::stopwords;
use crate::tokenizer::Tokenizer;

lazy_static! {
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// One scraped review
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Review {
  /// review text as scraped
  pub text: String,
  /// lit stars per aspect label, e.g. `{"Grafik": 4}`
  #[serde(default)]
  pub rating: BTreeMap<String, u8>,
}

/// A scraped page: a game title with its reviews
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReviewFile {
  /// game title
  #[serde(default)]
  pub title: String,
  /// all reviews of the page
  #[serde(default)]
  pub reviews: Vec<Review>,
}

impl ReviewFile {
  /// Read one scraped JSON file
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    ReviewFile::from_reader(BufReader::new(File::open(path)?))
  }
  /// Read one scraped JSON document
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    Ok(serde_json::from_reader(reader)?)
  }
}

/// All `.json` files below `dir`, sorted by path
pub fn review_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
  let mut files: Vec<PathBuf> = WalkDir::new(dir.as_ref())
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!("-- error while walking for review files: {}", e);
        None
      },
    })
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| entry.into_path())
    .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
    .collect();
  if files.is_empty() {
    return Err(Error::NoReviewFiles(dir.as_ref().to_path_buf()));
  }
  files.sort();
  Ok(files)
}

/// Switches of the text normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
  /// lower-case everything
  pub lower: bool,
  /// drop characters that are neither alphanumeric, whitespace nor sentence punctuation
  pub remove_non_alphanumeric: bool,
  /// transliterate ä, ö, ü, ß (and any other non-ASCII character) to ASCII
  pub substitute_special: bool,
  /// drop stopwords from the word lists (the normalized text keeps them)
  pub remove_stopwords: bool,
  /// skip reviews that are confidently detected as not German
  pub require_german: bool,
}

/// A review after normalization and tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedReview {
  /// position of the review over all input files
  pub review_number: usize,
  /// game title of the file the review came from
  pub title: String,
  /// normalized review text
  pub text_normalized: String,
  /// words, grouped by sentence
  pub tokens: Vec<Vec<String>>,
  /// lit stars per aspect label
  pub rating: BTreeMap<String, u8>,
}

/// Normalizes review text according to a fixed set of options
pub struct Normalizer {
  options: NormalizeOptions,
  stopwords: HashSet<&'static str>,
  tokenizer: Tokenizer,
}

fn substitute(c: char, into: &mut String) {
  match c {
    'ä' => into.push_str("ae"),
    'ö' => into.push_str("oe"),
    'ü' => into.push_str("ue"),
    'Ä' => into.push_str("Ae"),
    'Ö' => into.push_str("Oe"),
    'Ü' => into.push_str("Ue"),
    'ß' => into.push_str("ss"),
    c if c.is_ascii() => into.push(c),
    c => into.push_str(unidecode::unidecode_char(c)),
  }
}

impl Normalizer {
  /// A normalizer with the given options
  pub fn new(options: NormalizeOptions) -> Self {
    Normalizer {
      options,
      stopwords: stopwords::load(),
      tokenizer: Tokenizer::default(),
    }
  }

  /// Normalize a review text: line breaks become spaces, whitespace runs collapse, and the
  /// optional substitutions apply in the order special characters, case, non-alphanumerics.
  pub fn normalize(&self, text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for c in text.chars() {
      if self.options.substitute_special {
        substitute(c, &mut normalized);
      } else {
        normalized.push(c);
      }
    }
    if self.options.lower {
      normalized = normalized.to_lowercase();
    }
    if self.options.remove_non_alphanumeric {
      normalized = normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '!' | '?' | '-'))
        .collect();
    }
    WHITESPACE.replace_all(normalized.trim(), " ").into_owned()
  }

  /// Check if a text reads as German in Latin script. Undetectable texts pass.
  pub fn is_german(&self, text: &str) -> bool {
    match detect(text) {
      Some(info) => {
        info.script() == Script::Latin && (info.lang() == Lang::Deu || info.confidence() <= 0.93)
      },
      None => true,
    }
  }

  /// Sentences and words of a normalized text, dropping stopwords if requested
  pub fn tokenize(&self, text: &str) -> Vec<Vec<String>> {
    let mut sentences = self.tokenizer.tokenize(text);
    if self.options.remove_stopwords {
      for sentence in sentences.iter_mut() {
        sentence.retain(|word| !self.stopwords.contains(word.to_lowercase().as_str()));
      }
      sentences.retain(|sentence| !sentence.is_empty());
    }
    sentences
  }

  fn process_file(&self, path: &Path) -> Vec<(String, Review, String, Vec<Vec<String>>)> {
    let file = match ReviewFile::from_path(path) {
      Ok(file) => file,
      Err(e) => {
        warn!("skipping review file {}: {}", path.display(), e);
        return Vec::new();
      },
    };
    let title = file.title.replace('\n', "").trim().to_string();
    let mut processed = Vec::with_capacity(file.reviews.len());
    for review in file.reviews {
      let text = self.normalize(&review.text);
      if text.is_empty() {
        continue;
      }
      if self.options.require_german && !self.is_german(&text) {
        warn!("skipping non-German review in {}", path.display());
        continue;
      }
      let tokens = self.tokenize(&text);
      processed.push((title.clone(), review, text, tokens));
    }
    processed
  }

  /// Normalize and tokenize all reviews of the given files. Reviews are numbered in file order,
  /// then in their order within the file; unreadable files are skipped.
  pub fn preprocess(&self, files: &[PathBuf]) -> Vec<PreprocessedReview> {
    let per_file: Vec<_> = files.par_iter().map(|path| self.process_file(path)).collect();
    let reviews: Vec<PreprocessedReview> = per_file
      .into_iter()
      .flatten()
      .enumerate()
      .map(|(review_number, (title, review, text_normalized, tokens))| PreprocessedReview {
        review_number,
        title,
        text_normalized,
        tokens,
        rating: review.rating,
      })
      .collect();
    info!(
      "preprocessed {} reviews from {} files",
      reviews.len(),
      files.len()
    );
    reviews
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct ReviewRow {
  reviewnumber: usize,
  #[serde(default)]
  title: String,
  text_normalized: String,
  tokens: String,
  #[serde(default)]
  rating: String,
}

/// Write the preprocessed review table; `tokens` and `rating` are JSON cells
pub fn write_reviews<P: AsRef<Path>>(path: P, reviews: &[PreprocessedReview]) -> Result<()> {
  write_reviews_to(File::create(path.as_ref())?, reviews)?;
  info!(
    "wrote {} reviews to {}",
    reviews.len(),
    path.as_ref().display()
  );
  Ok(())
}

/// Write the preprocessed review table to any writer
pub fn write_reviews_to<W: Write>(writer: W, reviews: &[PreprocessedReview]) -> Result<()> {
  let mut csv_writer = csv::Writer::from_writer(writer);
  for review in reviews {
    csv_writer.serialize(ReviewRow {
      reviewnumber: review.review_number,
      title: review.title.clone(),
      text_normalized: review.text_normalized.clone(),
      tokens: serde_json::to_string(&review.tokens)?,
      rating: serde_json::to_string(&review.rating)?,
    })?;
  }
  csv_writer.flush()?;
  Ok(())
}

/// Read the preprocessed review table
pub fn read_reviews<P: AsRef<Path>>(path: P) -> Result<Vec<PreprocessedReview>> {
  read_reviews_from(File::open(path)?)
}

/// Read the preprocessed review table from any reader
pub fn read_reviews_from<R: Read>(reader: R) -> Result<Vec<PreprocessedReview>> {
  let mut csv_reader = csv::Reader::from_reader(reader);
  let mut reviews = Vec::new();
  for record in csv_reader.deserialize::<ReviewRow>() {
    let row = record?;
    let rating = if row.rating.trim().is_empty() {
      BTreeMap::new()
    } else {
      serde_json::from_str(&row.rating)?
    };
    reviews.push(PreprocessedReview {
      review_number: row.reviewnumber,
      title: row.title,
      text_normalized: row.text_normalized,
      tokens: serde_json::from_str(&row.tokens)?,
      rating,
    });
  }
  Ok(reviews)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_normalization_only_fixes_whitespace() {
    let normalizer = Normalizer::new(NormalizeOptions::default());
    assert_eq!(
      normalizer.normalize("  Die Grafik\nist   schön!\r\n"),
      "Die Grafik ist schön!"
    );
  }

  #[test]
  fn full_normalization() {
    let normalizer = Normalizer::new(NormalizeOptions {
      lower: true,
      remove_non_alphanumeric: true,
      substitute_special: true,
      ..NormalizeOptions::default()
    });
    assert_eq!(
      normalizer.normalize("Größte Atmosphäre (ever), „Café“-Flair!"),
      "groesste atmosphaere ever cafe-flair!"
    );
  }

  #[test]
  fn stopwords_are_dropped_from_tokens_only() {
    let normalizer = Normalizer::new(NormalizeOptions {
      remove_stopwords: true,
      ..NormalizeOptions::default()
    });
    let text = normalizer.normalize("Die Grafik ist nicht gut. Und so.");
    assert_eq!(text, "Die Grafik ist nicht gut. Und so.");
    assert_eq!(normalizer.tokenize(&text), vec![vec!["Grafik", "nicht", "gut"]]);
  }

  #[test]
  fn german_detection() {
    let normalizer = Normalizer::new(NormalizeOptions::default());
    assert!(normalizer.is_german(
      "Die Grafik ist wirklich wunderschön und die Steuerung funktioniert ohne Probleme."
    ));
    assert!(!normalizer.is_german(
      "The graphics are really beautiful and the controls work without any problems at all. \
       I would recommend this game to everyone who likes a good story with a lot of atmosphere, \
       and the soundtrack is one of the best that I have heard in years."
    ));
  }

  #[test]
  fn review_table_reads_back() {
    let mut rating = BTreeMap::new();
    rating.insert("Grafik".to_string(), 4);
    let reviews = vec![PreprocessedReview {
      review_number: 0,
      title: "Gothic".into(),
      text_normalized: "Schöne Optik, mieser Ton.".into(),
      tokens: vec![vec!["Schöne".into(), "Optik".into(), "mieser".into(), "Ton".into()]],
      rating,
    }];
    let mut buffer = Vec::new();
    write_reviews_to(&mut buffer, &reviews).unwrap();
    assert_eq!(read_reviews_from(buffer.as_slice()).unwrap(), reviews);
  }
}
