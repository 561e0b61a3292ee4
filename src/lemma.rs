//! Best-effort lemmatization of word forms
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::lexicon::sentiws_rows;

/// Maps a word form (with its coarse part of speech) to its lemma, if one is known
pub trait Lemmatizer: Sync {
  /// The lemma of `word`, or `None` when no lemma can be found
  fn lemma(&self, word: &str, pos: &str) -> Option<String>;
}

/// A lemmatizer that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLemmatizer;

impl Lemmatizer for NoLemmatizer {
  fn lemma(&self, _word: &str, _pos: &str) -> Option<String> {
    None
  }
}

/// Form to lemma lookup table
#[derive(Debug, Clone, Default)]
pub struct TableLemmatizer {
  forms: HashMap<String, String>,
}

impl TableLemmatizer {
  /// empty table
  pub fn new() -> Self {
    TableLemmatizer::default()
  }

  /// Read a two-column `form<TAB>lemma` file; lines with fewer columns are ignored
  pub fn from_tsv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let table = TableLemmatizer::from_tsv_reader(File::open(path.as_ref())?)?;
    info!(
      "loaded {} lemma forms from {}",
      table.len(),
      path.as_ref().display()
    );
    Ok(table)
  }

  /// Read two-column `form<TAB>lemma` lines
  pub fn from_tsv_reader<R: Read>(reader: R) -> Result<Self> {
    let mut table = TableLemmatizer::new();
    for line in BufReader::new(reader).lines() {
      let line = line?;
      if let Some((form, lemma)) = line.trim_end().split_once('\t') {
        let (form, lemma) = (form.trim(), lemma.trim());
        if !form.is_empty() && !lemma.is_empty() {
          table.insert(form, lemma);
        }
      }
    }
    Ok(table)
  }

  /// Build the table from the inflection lists of SentiWS files
  pub fn from_sentiws_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
    let mut table = TableLemmatizer::new();
    for path in paths {
      table.extend_sentiws(File::open(path.as_ref())?)?;
    }
    Ok(table)
  }

  /// Build the table from the inflection list of one SentiWS file
  pub fn from_sentiws_reader<R: Read>(reader: R) -> Result<Self> {
    let mut table = TableLemmatizer::new();
    table.extend_sentiws(reader)?;
    Ok(table)
  }

  fn extend_sentiws<R: Read>(&mut self, reader: R) -> Result<()> {
    for row in sentiws_rows(reader)? {
      for form in &row.inflections {
        self.insert(form, &row.word);
      }
    }
    Ok(())
  }

  /// Record `lemma` for `form`; the first recorded lemma of a form is kept
  pub fn insert(&mut self, form: &str, lemma: &str) {
    self
      .forms
      .entry(form.to_string())
      .or_insert_with(|| lemma.to_string());
  }

  /// number of known forms
  pub fn len(&self) -> usize {
    self.forms.len()
  }

  /// true when no form is known
  pub fn is_empty(&self) -> bool {
    self.forms.is_empty()
  }
}

impl Lemmatizer for TableLemmatizer {
  fn lemma(&self, word: &str, _pos: &str) -> Option<String> {
    self
      .forms
      .get(word)
      .or_else(|| self.forms.get(&word.to_lowercase()))
      .cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tsv_table_lookup_falls_back_to_lowercase() {
    let table = TableLemmatizer::from_tsv_reader("schlechte\tschlecht\nSchöne\tschön\nkaputt\n".as_bytes()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.lemma("schlechte", "ADJ").as_deref(), Some("schlecht"));
    assert_eq!(table.lemma("schöne", "ADJ"), None);
    assert_eq!(table.lemma("Schlechte", "ADJ").as_deref(), Some("schlecht"));
    assert_eq!(table.lemma("kaputt", "ADJ"), None);
  }

  #[test]
  fn sentiws_inflections_point_to_their_base_word() {
    let list = "schön|ADJX\t0.4\tschöne,schönen,schöner\n";
    let table = TableLemmatizer::from_sentiws_reader(list.as_bytes()).unwrap();
    assert_eq!(table.lemma("schönen", "ADJ").as_deref(), Some("schön"));
    assert_eq!(table.lemma("schön", "ADJ"), None);
  }

  #[test]
  fn no_lemmatizer_finds_nothing() {
    assert_eq!(NoLemmatizer.lemma("schlechte", "ADJ"), None);
  }
}
