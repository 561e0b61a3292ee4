//! Error types shared by the loaders and writers of the pipeline
use std::path::PathBuf;

/// Errors raised while reading or writing pipeline resources
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Underlying filesystem failure
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  /// A CSV table could not be read or written
  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  /// A JSON document (review file, keyword dictionary, list cell) was malformed
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  /// A CoNLL-U parse file contained a malformed row
  #[error("malformed CoNLL-U at line {line}: {message}")]
  Conllu {
    /// 1-based line number in the input
    line: usize,
    /// what was wrong with the row
    message: String,
  },

  /// A dependency tree referenced a head outside of its sentence
  #[error("token {token} has head {head}, but the sentence only has {len} tokens")]
  InvalidHead {
    /// 0-based index of the offending token
    token: usize,
    /// 0-based head index it pointed to
    head: usize,
    /// number of tokens in the sentence
    len: usize,
  },

  /// No review JSON files were found under the given directory
  #[error("no review JSON files found under {0}")]
  NoReviewFiles(PathBuf),

  /// The sentiment classifier could not be fitted or applied
  #[error("model error: {0}")]
  Model(#[from] aprender::AprenderError),

  /// A configuration value was rejected
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
}

/// Result alias for fallible pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
