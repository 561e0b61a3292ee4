//! Corpus statistics over the aspect-mention table
//! (how often each aspect is mentioned, and which words describe it)

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::mention::AspectMention;

/// Records the frequencies of single words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unigrams {
  /// hashmap for the unigram counts
  pub map: HashMap<String, usize>,
}

impl Unigrams {
  /// Creates a new, empty Unigrams struct
  pub fn new() -> Self {
    Unigrams::default()
  }
  /// Get the word count
  pub fn get(&self, word: &str) -> usize {
    self.map.get(word).copied().unwrap_or(0)
  }
  /// insert a word
  pub fn insert(&mut self, word: String) {
    let counter = self.map.entry(word).or_insert(0);
    *counter += 1;
  }
  /// the `n` most frequent words, ties broken alphabetically
  pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
    let mut as_vec: Vec<(&str, usize)> = self
      .map
      .iter()
      .map(|(word, count)| (word.as_str(), *count))
      .collect();
    as_vec.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    as_vec.truncate(n);
    as_vec
  }
  /// get the number of different words inserted
  pub fn count(&self) -> usize {
    self.map.len()
  }
}

/// Counts for one aspect label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectCounts {
  /// mentions located
  pub mentions: usize,
  /// mentions that received a polarity
  pub scored: usize,
  /// sum of the scored polarities
  pub polarity_sum: f64,
  /// descriptor words, lower-cased
  pub descriptors: Unigrams,
  /// intensifier and shifter words, lower-cased
  pub modifiers: Unigrams,
}

impl AspectCounts {
  /// mean polarity of the scored mentions
  pub fn mean_polarity(&self) -> Option<f64> {
    if self.scored == 0 {
      None
    } else {
      Some(self.polarity_sum / self.scored as f64)
    }
  }
}

/// Per-aspect statistics, ordered by aspect label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectStats {
  /// counts per aspect label
  pub aspects: BTreeMap<String, AspectCounts>,
  /// how many lines `Display` lists per word table
  pub top: usize,
}

impl AspectStats {
  /// Tally a mention table
  pub fn from_mentions(mentions: &[AspectMention]) -> Self {
    let mut stats = AspectStats {
      aspects: BTreeMap::new(),
      top: 10,
    };
    for mention in mentions {
      stats.insert(mention);
    }
    stats
  }

  /// Builder-style override of the table length used by `Display`
  pub fn with_top(mut self, top: usize) -> Self {
    self.top = top;
    self
  }

  /// add one mention
  pub fn insert(&mut self, mention: &AspectMention) {
    let counts = self.aspects.entry(mention.aspect.clone()).or_default();
    counts.mentions += 1;
    if let Some(value) = mention.polarity_strength {
      counts.scored += 1;
      counts.polarity_sum += value;
    }
    for word in &mention.sentiment_words {
      counts.descriptors.insert(word.to_lowercase());
    }
    for word in &mention.intensifier_words {
      counts.modifiers.insert(word.to_lowercase());
    }
  }

  /// counts of one aspect
  pub fn get(&self, aspect: &str) -> Option<&AspectCounts> {
    self.aspects.get(aspect)
  }

  /// total mentions over all aspects
  pub fn total_mentions(&self) -> usize {
    self.aspects.values().map(|counts| counts.mentions).sum()
  }
}

impl fmt::Display for AspectStats {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "{} aspect mentions", self.total_mentions())?;
    for (aspect, counts) in &self.aspects {
      write!(f, "{}: {} mentions, {} scored", aspect, counts.mentions, counts.scored)?;
      if let Some(mean) = counts.mean_polarity() {
        write!(f, ", mean polarity {:.3}", mean)?;
      }
      writeln!(f)?;
      for (word, count) in counts.descriptors.most_common(self.top) {
        writeln!(f, "  {:>6}  {}", count, word)?;
      }
      let modifiers = counts.modifiers.most_common(self.top);
      if !modifiers.is_empty() {
        writeln!(f, "  modified by:")?;
        for (word, count) in modifiers {
          writeln!(f, "  {:>6}  {}", count, word)?;
        }
      }
    }
    Ok(())
  }
}
