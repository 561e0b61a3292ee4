//! The sentiment lexicon: normalized word forms mapped to one or more qualified
//! polarity strengths.
//!
//! Two on-disk formats are understood:
//! - the `germanlex` CSV table (`word,qualifier,polarity_strength,pos`), which carries
//!   intensifiers (`INT`) and shifters (`SHI`) next to the polar words;
//! - the SentiWS tab-separated lists (`Word|POS<TAB>score<TAB>inflections`), which only
//!   carry polar words, with the sign of the score deciding `POS` or `NEG`.
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::Result;

lazy_static! {
  static ref NON_WORD: Regex = Regex::new(r"[^\w]").unwrap();
}

/// The sentiment role of a lexicon entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
  /// positive polar word
  Pos,
  /// negative polar word
  Neg,
  /// intensifier, scales the polarity of the word it modifies
  Int,
  /// shifter (negator), flips the polarity of the word it modifies
  Shi,
  /// no (recognized) qualifier
  Unset,
}

impl Qualifier {
  /// `POS` or `NEG`
  pub fn is_polar(self) -> bool {
    matches!(self, Qualifier::Pos | Qualifier::Neg)
  }
  /// `INT` or `SHI`
  pub fn is_modifier(self) -> bool {
    matches!(self, Qualifier::Int | Qualifier::Shi)
  }
}

impl From<&str> for Qualifier {
  fn from(raw: &str) -> Qualifier {
    match raw.trim() {
      "POS" => Qualifier::Pos,
      "NEG" => Qualifier::Neg,
      "INT" => Qualifier::Int,
      "SHI" => Qualifier::Shi,
      _ => Qualifier::Unset,
    }
  }
}

impl fmt::Display for Qualifier {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match self {
      Qualifier::Pos => "POS",
      Qualifier::Neg => "NEG",
      Qualifier::Int => "INT",
      Qualifier::Shi => "SHI",
      Qualifier::Unset => "",
    };
    f.write_str(name)
  }
}

/// One row of the lexicon
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
  /// sentiment role of the word
  pub qualifier: Qualifier,
  /// non-negative strength; for intensifiers the scaling factor
  pub polarity_strength: f64,
  /// part of speech as recorded by the lexicon source, if any
  pub pos: Option<String>,
}

impl LexiconEntry {
  /// Build an entry, storing the magnitude of `polarity_strength`
  pub fn new(qualifier: Qualifier, polarity_strength: f64) -> Self {
    LexiconEntry {
      qualifier,
      polarity_strength: polarity_strength.abs(),
      pos: None,
    }
  }
}

/// Outcome of a lexicon lookup, distinguishing homographs from unambiguous words
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexiconLookup<'a> {
  /// exactly one row exists for the word
  Single(&'a LexiconEntry),
  /// several rows exist, in storage order
  Multiple(&'a [LexiconEntry]),
  /// the word is not in the lexicon
  NotFound,
}

impl<'a> LexiconLookup<'a> {
  /// true unless `NotFound`
  pub fn is_found(&self) -> bool {
    !matches!(self, LexiconLookup::NotFound)
  }

  /// All rows of the lookup, in storage order
  pub fn entries(&self) -> &'a [LexiconEntry] {
    match *self {
      LexiconLookup::Single(entry) => std::slice::from_ref(entry),
      LexiconLookup::Multiple(entries) => entries,
      LexiconLookup::NotFound => &[],
    }
  }

  /// The row to use when the word acts as a descriptor, see [`select_polar`]
  pub fn polar(&self) -> Option<&'a LexiconEntry> {
    select_polar(self.entries())
  }

  /// The row to use when the word acts as a modifier, see [`select_modifier`]
  pub fn modifier(&self) -> Option<&'a LexiconEntry> {
    select_modifier(self.entries())
  }
}

/// Homograph tie-break for descriptors: the first `POS` or `NEG` row in storage order.
/// Rows with any other qualifier are never picked, so a word that is only known as an
/// intensifier counts as "no entry".
pub fn select_polar(entries: &[LexiconEntry]) -> Option<&LexiconEntry> {
  entries.iter().find(|entry| entry.qualifier.is_polar())
}

/// Homograph tie-break for modifiers: the first `INT` or `SHI` row in storage order
pub fn select_modifier(entries: &[LexiconEntry]) -> Option<&LexiconEntry> {
  entries.iter().find(|entry| entry.qualifier.is_modifier())
}

/// Strip every non-word character from a surface form
pub fn strip_non_word(word: &str) -> String {
  NON_WORD.replace_all(word, "").into_owned()
}

#[derive(Debug, Deserialize)]
struct GermanlexRow {
  word: String,
  #[serde(default)]
  qualifier: String,
  #[serde(default)]
  polarity_strength: String,
  #[serde(default)]
  pos: Option<String>,
}

/// A row of a SentiWS list
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SentiWsRow {
  pub word: String,
  pub pos: String,
  pub score: f64,
  pub inflections: Vec<String>,
}

/// Parse SentiWS lines, skipping (and reporting) malformed ones
pub(crate) fn sentiws_rows<R: Read>(reader: R) -> Result<Vec<SentiWsRow>> {
  let mut rows = Vec::new();
  for (index, line) in BufReader::new(reader).lines().enumerate() {
    let line = line?;
    let line = line.trim_start_matches('\u{feff}').trim_end();
    if line.is_empty() {
      continue;
    }
    let mut columns = line.split('\t');
    let head = columns.next().unwrap_or("");
    let (word, pos) = match head.split_once('|') {
      Some((word, pos)) => (word, pos),
      None => (head, ""),
    };
    let score = match columns.next().map(|raw| raw.trim().parse::<f64>()) {
      Some(Ok(score)) if score.is_finite() => score,
      _ => {
        warn!("SentiWS line {} has no numeric score, skipping", index + 1);
        continue;
      },
    };
    let inflections = columns
      .next()
      .map(|raw| {
        raw
          .split(',')
          .map(str::trim)
          .filter(|form| !form.is_empty())
          .map(String::from)
          .collect()
      })
      .unwrap_or_default();
    rows.push(SentiWsRow {
      word: word.trim().to_string(),
      pos: pos.trim().to_string(),
      score,
      inflections,
    });
  }
  Ok(rows)
}

/// Read-only word to polarity store
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
  entries: HashMap<String, Vec<LexiconEntry>>,
}

impl Lexicon {
  /// An empty lexicon
  pub fn new() -> Self {
    Lexicon::default()
  }

  /// Load a `germanlex`-style CSV table from disk
  pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let lexicon = Lexicon::from_csv_reader(File::open(path.as_ref())?)?;
    info!(
      "loaded {} lexicon words from {}",
      lexicon.len(),
      path.as_ref().display()
    );
    Ok(lexicon)
  }

  /// Load a `germanlex`-style CSV table. Duplicate `(word, qualifier)` rows are dropped,
  /// keeping the first one; `NA` or empty strengths read as `0`, other non-numeric or
  /// non-finite strengths skip the row.
  pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
    let mut csv_reader = csv::ReaderBuilder::new()
      .flexible(true)
      .trim(csv::Trim::All)
      .from_reader(reader);
    let mut lexicon = Lexicon::new();
    for (index, record) in csv_reader.deserialize::<GermanlexRow>().enumerate() {
      let row = match record {
        Ok(row) => row,
        Err(e) => {
          warn!("skipping lexicon row {}: {}", index + 1, e);
          continue;
        },
      };
      let strength = match row.polarity_strength.as_str() {
        "" | "NA" | "NaN" => 0.0,
        raw => match raw.parse::<f64>() {
          Ok(strength) if strength.is_finite() => strength,
          _ => {
            warn!(
              "skipping lexicon row {} ({:?}): bad polarity strength {:?}",
              index + 1,
              row.word,
              raw
            );
            continue;
          },
        },
      };
      let qualifier = Qualifier::from(row.qualifier.as_str());
      if lexicon
        .entries
        .get(&row.word)
        .map(|known| known.iter().any(|entry| entry.qualifier == qualifier))
        .unwrap_or(false)
      {
        debug!("duplicate lexicon row for {:?} ({})", row.word, qualifier);
        continue;
      }
      let mut entry = LexiconEntry::new(qualifier, strength);
      entry.pos = row.pos.filter(|pos| !pos.is_empty() && pos != "NA");
      lexicon.insert(row.word, entry);
    }
    Ok(lexicon)
  }

  /// Load one or more SentiWS list files (typically the positive and the negative half)
  pub fn from_sentiws_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
    let mut lexicon = Lexicon::new();
    for path in paths {
      lexicon.extend_sentiws(File::open(path.as_ref())?)?;
    }
    info!("loaded {} SentiWS word forms", lexicon.len());
    Ok(lexicon)
  }

  /// Load a SentiWS list; inflected forms are indexed with the entry of their base word
  pub fn from_sentiws_reader<R: Read>(reader: R) -> Result<Self> {
    let mut lexicon = Lexicon::new();
    lexicon.extend_sentiws(reader)?;
    Ok(lexicon)
  }

  fn extend_sentiws<R: Read>(&mut self, reader: R) -> Result<()> {
    for row in sentiws_rows(reader)? {
      let qualifier = if row.score < 0.0 {
        Qualifier::Neg
      } else {
        Qualifier::Pos
      };
      let mut entry = LexiconEntry::new(qualifier, row.score);
      if !row.pos.is_empty() {
        entry.pos = Some(row.pos.clone());
      }
      for form in row.inflections {
        self.insert(form, entry.clone());
      }
      self.insert(row.word, entry);
    }
    Ok(())
  }

  /// Append a row for `word`, after any rows it already has
  pub fn insert(&mut self, word: String, entry: LexiconEntry) {
    self.entries.entry(word).or_insert_with(Vec::new).push(entry);
  }

  /// number of distinct word forms
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// true when no word is stored
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Exact-case lookup. Absent words yield `NotFound`, never an error.
  pub fn lookup(&self, word: &str) -> LexiconLookup<'_> {
    match self.entries.get(word).map(Vec::as_slice) {
      None | Some([]) => LexiconLookup::NotFound,
      Some([entry]) => LexiconLookup::Single(entry),
      Some(entries) => LexiconLookup::Multiple(entries),
    }
  }

  /// Lookup cascade for a token: the surface form stripped of non-word characters, then
  /// its lower-cased form, then the lemma (when one is available). The first hit is
  /// returned as is, later forms are not consulted.
  pub fn resolve(&self, word: &str, lemma: Option<&str>) -> LexiconLookup<'_> {
    let stripped = strip_non_word(word);
    let found = self.lookup(&stripped);
    if found.is_found() {
      return found;
    }
    let lowered = stripped.to_lowercase();
    if lowered != stripped {
      let found = self.lookup(&lowered);
      if found.is_found() {
        return found;
      }
    }
    match lemma {
      Some(lemma) if !lemma.is_empty() => self.lookup(lemma),
      _ => LexiconLookup::NotFound,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Lexicon {
    let table = "word,qualifier,polarity_strength,pos\n\
                 schlecht,NEG,0.8,adj\n\
                 sehr,INT,1.5,adv\n\
                 nicht,SHI,1,neg\n\
                 toll,POS,0.9,adj\n\
                 toll,POS,0.2,adj\n\
                 super,INT,2,adv\n\
                 super,POS,0.7,adj\n\
                 ganz,INT,NA,adv\n";
    Lexicon::from_csv_reader(table.as_bytes()).unwrap()
  }

  #[test]
  fn lookup_distinguishes_single_multiple_and_missing() {
    let lexicon = sample();
    assert!(matches!(lexicon.lookup("schlecht"), LexiconLookup::Single(_)));
    assert!(matches!(lexicon.lookup("super"), LexiconLookup::Multiple(entries) if entries.len() == 2));
    assert_eq!(lexicon.lookup("Schlecht"), LexiconLookup::NotFound);
    assert_eq!(lexicon.lookup("unbekannt"), LexiconLookup::NotFound);
  }

  #[test]
  fn duplicate_word_qualifier_rows_keep_the_first() {
    let lexicon = sample();
    let toll = lexicon.lookup("toll");
    assert_eq!(toll.entries().len(), 1);
    assert_eq!(toll.entries()[0].polarity_strength, 0.9);
  }

  #[test]
  fn missing_strength_reads_as_zero() {
    let lexicon = sample();
    assert_eq!(lexicon.lookup("ganz").entries()[0].polarity_strength, 0.0);
  }

  #[test]
  fn non_finite_strengths_are_skipped() {
    let table = "word,qualifier,polarity_strength,pos\n\
                 schlecht,NEG,nan,adj\n\
                 toll,POS,inf,adj\n\
                 gut,POS,0.5,adj\n";
    let lexicon = Lexicon::from_csv_reader(table.as_bytes()).unwrap();
    assert_eq!(lexicon.len(), 1);
    assert_eq!(lexicon.lookup("schlecht"), LexiconLookup::NotFound);
    assert_eq!(lexicon.lookup("toll"), LexiconLookup::NotFound);
  }

  #[test]
  fn polar_tie_break_skips_modifier_rows() {
    let lexicon = sample();
    let super_lookup = lexicon.lookup("super");
    let polar = super_lookup.polar().unwrap();
    assert_eq!(polar.qualifier, Qualifier::Pos);
    assert_eq!(polar.polarity_strength, 0.7);
    let modifier = super_lookup.modifier().unwrap();
    assert_eq!(modifier.qualifier, Qualifier::Int);
    assert!(lexicon.lookup("sehr").polar().is_none());
  }

  #[test]
  fn polar_tie_break_follows_storage_order() {
    let mut lexicon = Lexicon::new();
    lexicon.insert("leicht".into(), LexiconEntry::new(Qualifier::Neg, 0.3));
    lexicon.insert("leicht".into(), LexiconEntry::new(Qualifier::Pos, 0.5));
    let polar = lexicon.lookup("leicht").polar().unwrap();
    assert_eq!(polar.qualifier, Qualifier::Neg);
  }

  #[test]
  fn resolve_cascades_stripped_lowered_lemma() {
    let lexicon = sample();
    assert!(lexicon.resolve("schlecht!", None).is_found());
    assert!(lexicon.resolve("Schlecht", None).is_found());
    assert!(lexicon.resolve("schlechte", Some("schlecht")).is_found());
    assert!(!lexicon.resolve("schlechte", None).is_found());
    assert!(!lexicon.resolve("schlechte", Some("")).is_found());
  }

  #[test]
  fn resolve_stops_at_the_first_hit() {
    let mut lexicon = Lexicon::new();
    lexicon.insert("Super".into(), LexiconEntry::new(Qualifier::Int, 2.0));
    lexicon.insert("super".into(), LexiconEntry::new(Qualifier::Pos, 0.7));
    let found = lexicon.resolve("Super", None);
    assert!(found.polar().is_none());
  }

  #[test]
  fn sentiws_indexes_inflections() {
    let list = "Abbau|NN\t-0.058\tAbbaus,Abbaues,Abbauen\n\
                schön|ADJX\t0.4\tschöne,schönen\n\
                kaputt|ADJX\tkeine-zahl\n";
    let lexicon = Lexicon::from_sentiws_reader(list.as_bytes()).unwrap();
    assert_eq!(lexicon.len(), 7);
    let abbau = lexicon.lookup("Abbaues").polar().unwrap();
    assert_eq!(abbau.qualifier, Qualifier::Neg);
    assert_eq!(abbau.polarity_strength, 0.058);
    assert_eq!(lexicon.lookup("schönen").polar().unwrap().qualifier, Qualifier::Pos);
    assert_eq!(lexicon.lookup("kaputt"), LexiconLookup::NotFound);
  }
}
