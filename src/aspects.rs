//! Keyword-based location of aspect mentions in tokenized reviews
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::mention::AspectMention;

/// The four review dimensions rated by the review site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aspect {
  /// Grafik
  Graphics,
  /// Sound
  Sound,
  /// Steuerung
  Controls,
  /// Atmosphäre
  Atmosphere,
}

impl Aspect {
  /// all aspects, in rating order
  pub const ALL: [Aspect; 4] = [
    Aspect::Graphics,
    Aspect::Sound,
    Aspect::Controls,
    Aspect::Atmosphere,
  ];

  /// the German label used in ratings and mention tables
  pub fn label(self) -> &'static str {
    match self {
      Aspect::Graphics => "Grafik",
      Aspect::Sound => "Sound",
      Aspect::Controls => "Steuerung",
      Aspect::Atmosphere => "Atmosphäre",
    }
  }

  /// the built-in keywords of the aspect, lower case
  pub fn keywords(self) -> &'static [&'static str] {
    match self {
      Aspect::Graphics => &["grafik", "optik"],
      Aspect::Sound => &["sound", "klang", "ton", "akustik"],
      Aspect::Controls => &["steuerung", "bedienung"],
      Aspect::Atmosphere => &["atmosphäre", "stimmung"],
    }
  }
}

impl fmt::Display for Aspect {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Aspect {
  type Err = Error;
  fn from_str(label: &str) -> Result<Aspect> {
    Aspect::ALL
      .iter()
      .copied()
      .find(|aspect| aspect.label().eq_ignore_ascii_case(label.trim()))
      .ok_or_else(|| Error::InvalidConfig(format!("unknown aspect {:?}", label)))
  }
}

/// Aspect labels with the keywords that signal them, in search order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectKeywords {
  aspects: Vec<(String, Vec<String>)>,
}

impl Default for AspectKeywords {
  fn default() -> AspectKeywords {
    AspectKeywords {
      aspects: Aspect::ALL
        .iter()
        .map(|aspect| {
          (
            aspect.label().to_string(),
            aspect.keywords().iter().map(|k| k.to_string()).collect(),
          )
        })
        .collect(),
    }
  }
}

impl AspectKeywords {
  /// Load a keyword dictionary such as `{"Grafik": ["grafik", "optik"], ...}`.
  pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let keywords = AspectKeywords::from_json_reader(BufReader::new(File::open(path.as_ref())?))?;
    info!(
      "loaded {} aspects from {}",
      keywords.len(),
      path.as_ref().display()
    );
    Ok(keywords)
  }

  /// Load a keyword dictionary; the order of the JSON object is kept, keywords are
  /// lower-cased.
  pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
    let value: Value = serde_json::from_reader(reader)?;
    let object = value
      .as_object()
      .ok_or_else(|| Error::InvalidConfig("aspect dictionary must be a JSON object".into()))?;
    let mut aspects = Vec::with_capacity(object.len());
    for (label, words) in object {
      let words = words.as_array().ok_or_else(|| {
        Error::InvalidConfig(format!("keywords of aspect {:?} must be a list", label))
      })?;
      let words = words
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty())
        .collect();
      aspects.push((label.clone(), words));
    }
    Ok(AspectKeywords { aspects })
  }

  /// number of aspects
  pub fn len(&self) -> usize {
    self.aspects.len()
  }

  /// true without any aspect
  pub fn is_empty(&self) -> bool {
    self.aspects.is_empty()
  }

  /// iterate over `(label, keywords)`
  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
    self
      .aspects
      .iter()
      .map(|(label, words)| (label.as_str(), words.as_slice()))
  }

  /// Find the mentions of a tokenized review. Aspects are searched in dictionary order,
  /// then sentence by sentence and word by word; every keyword contained in the
  /// lower-cased word yields its own mention.
  pub fn locate(&self, review_number: usize, sentences: &[Vec<String>]) -> Vec<AspectMention> {
    let mut mentions = Vec::new();
    for (label, keywords) in self.iter() {
      for (sentence_index, sentence) in sentences.iter().enumerate() {
        for (word_index, word) in sentence.iter().enumerate() {
          let lowered = word.to_lowercase();
          for keyword in keywords {
            if lowered.contains(keyword.as_str()) {
              mentions.push(AspectMention::new(
                review_number,
                sentence_index,
                word_index,
                word,
                label,
              ));
            }
          }
        }
      }
    }
    mentions
  }
}
