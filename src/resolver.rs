//! Polarity resolution for aspect mentions.
//!
//! For one mention the resolver walks the dependency tree of its sentence:
//! 1. the mention token is the first token whose text equals `word_found`;
//! 2. its descriptor is the first direct child that is an attributive adjective or an
//!    adverb;
//! 3. failing that, the first auxiliary or main verb above the mention is taken and its
//!    first descriptor child is used instead;
//! 4. the descriptor's base polarity comes from its polar lexicon entry (negated for
//!    `NEG`), or from the configured `MissPolicy`;
//! 5. each direct child of the descriptor that is an intensifier (`INT`) scales the
//!    polarity by its strength, each shifter (`SHI`) flips its sign.
//!
//! Only one descriptor is ever scored per mention, and the first one found wins.
use rayon::prelude::*;
use tracing::debug;

use crate::config::{MissPolicy, ResolverConfig};
use crate::lemma::Lemmatizer;
use crate::lexicon::{Lexicon, Qualifier};
use crate::mention::AspectMention;
use crate::parse::{ParseIndex, ParseTree, Token};

/// The signed polarity of one mention and the words that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PolarityResult {
  /// signed polarity strength
  pub value: f64,
  /// surface form of the scored descriptor
  pub descriptor: String,
  /// surface forms of the intensifiers and shifters that altered the value, in order
  pub contributing_words: Vec<String>,
}

/// Why a mention produced no result. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
  /// neither the mention nor its first verb ancestor has a descriptor child
  #[error("no descriptor found for the mention")]
  NoDescriptor,
  /// the descriptor has no polar lexicon entry and misses are rejected
  #[error("descriptor {0:?} has no polar lexicon entry")]
  LexiconMiss(String),
  /// the mention word (or its sentence) is not in the available parses
  #[error("{0:?} could not be located in its parsed sentence")]
  ParseMismatch(String),
}

/// Tally of a batch run over a mention table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreReport {
  /// mentions that received a polarity
  pub scored: usize,
  /// mentions without a descriptor
  pub no_descriptor: usize,
  /// mentions whose descriptor was rejected as a lexicon miss
  pub lexicon_miss: usize,
  /// mentions that could not be located in the parses
  pub parse_mismatch: usize,
}

impl ScoreReport {
  /// number of mentions seen
  pub fn total(&self) -> usize {
    self.scored + self.no_descriptor + self.lexicon_miss + self.parse_mismatch
  }

  fn record(&mut self, outcome: &Result<(), ResolutionError>) {
    match outcome {
      Ok(()) => self.scored += 1,
      Err(ResolutionError::NoDescriptor) => self.no_descriptor += 1,
      Err(ResolutionError::LexiconMiss(_)) => self.lexicon_miss += 1,
      Err(ResolutionError::ParseMismatch(_)) => self.parse_mismatch += 1,
    }
  }
}

/// Scores aspect mentions against a read-only lexicon
pub struct Resolver<'a> {
  lexicon: &'a Lexicon,
  lemmatizer: &'a dyn Lemmatizer,
  config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
  /// A resolver over the given collaborators
  pub fn new(
    lexicon: &'a Lexicon,
    lemmatizer: &'a dyn Lemmatizer,
    config: &'a ResolverConfig,
  ) -> Self {
    Resolver {
      lexicon,
      lemmatizer,
      config,
    }
  }

  /// The parser's lemma if it assigned one, else the external lemmatizer's
  fn lemma_of(&self, token: &Token) -> Option<String> {
    token
      .lemma()
      .map(str::to_string)
      .or_else(|| self.lemmatizer.lemma(token.text(), token.coarse_tag()))
  }

  fn first_descriptor(&self, tree: &ParseTree, candidates: &[usize], skip: usize) -> Option<usize> {
    candidates.iter().copied().find(|&child| {
      child != skip
        && tree
          .token(child)
          .map(|token| self.config.is_descriptor(token))
          .unwrap_or(false)
    })
  }

  /// Index of the descriptor of the mention token at `mention`, if there is one
  pub fn find_descriptor(&self, tree: &ParseTree, mention: usize) -> Option<usize> {
    if let Some(descriptor) = self.first_descriptor(tree, tree.children(mention), mention) {
      return Some(descriptor);
    }
    let verb = tree.ancestors(mention).find(|&ancestor| {
      tree
        .token(ancestor)
        .map(|token| self.config.is_verb(token))
        .unwrap_or(false)
    })?;
    self.first_descriptor(tree, tree.children(verb), mention)
  }

  /// Signed base polarity of a descriptor token
  fn base_polarity(&self, descriptor: &Token) -> Result<f64, ResolutionError> {
    let lemma = self.lemma_of(descriptor);
    match self.lexicon.resolve(descriptor.text(), lemma.as_deref()).polar() {
      Some(entry) if entry.qualifier == Qualifier::Neg => Ok(-entry.polarity_strength),
      Some(entry) => Ok(entry.polarity_strength),
      None => match self.config.miss_policy {
        MissPolicy::Fallback(value) => Ok(value),
        MissPolicy::Reject => Err(ResolutionError::LexiconMiss(descriptor.text().to_string())),
      },
    }
  }

  /// Score the mention word `word_found` within `tree`
  pub fn resolve_in(
    &self,
    tree: &ParseTree,
    word_found: &str,
  ) -> Result<PolarityResult, ResolutionError> {
    let mention = tree
      .find(word_found)
      .ok_or_else(|| ResolutionError::ParseMismatch(word_found.to_string()))?;
    let descriptor_index = self
      .find_descriptor(tree, mention)
      .ok_or(ResolutionError::NoDescriptor)?;
    let descriptor = tree
      .token(descriptor_index)
      .ok_or(ResolutionError::NoDescriptor)?;

    let mut value = self.base_polarity(descriptor)?;
    let mut contributing_words = Vec::new();
    for &child in tree.children(descriptor_index) {
      let token = match tree.token(child) {
        Some(token) => token,
        None => continue,
      };
      let lemma = self.lemma_of(token);
      match self.lexicon.resolve(token.text(), lemma.as_deref()).modifier() {
        Some(entry) if entry.qualifier == Qualifier::Int => {
          value *= entry.polarity_strength;
          contributing_words.push(token.text().to_string());
        },
        Some(entry) if entry.qualifier == Qualifier::Shi => {
          value *= -1.0;
          contributing_words.push(token.text().to_string());
        },
        _ => {},
      }
    }

    debug!(
      "{:?} -> {:?} {:?} = {}",
      word_found,
      descriptor.text(),
      contributing_words,
      value
    );
    Ok(PolarityResult {
      value,
      descriptor: descriptor.text().to_string(),
      contributing_words,
    })
  }

  /// Score a mention, looking its sentence up in `parses`
  pub fn resolve(
    &self,
    mention: &AspectMention,
    parses: &ParseIndex,
  ) -> Result<PolarityResult, ResolutionError> {
    let tree = parses
      .get(mention.review_number, mention.sentence_index)
      .ok_or_else(|| ResolutionError::ParseMismatch(mention.word_found.clone()))?;
    self.resolve_in(tree, &mention.word_found)
  }

  fn score_one(&self, mention: &mut AspectMention, parses: &ParseIndex) -> Result<(), ResolutionError> {
    mention.clear_derived();
    let result = self.resolve(mention, parses);
    if let Err(ref reason) = result {
      debug!(
        "review {} sentence {} {:?}: {}",
        mention.review_number, mention.sentence_index, mention.word_found, reason
      );
    }
    mention.apply(&result?);
    Ok(())
  }

  /// Score every mention in place, one after the other. Mentions without a result keep
  /// empty derived fields.
  pub fn score_mentions(&self, mentions: &mut [AspectMention], parses: &ParseIndex) -> ScoreReport {
    let mut report = ScoreReport::default();
    for mention in mentions.iter_mut() {
      report.record(&self.score_one(mention, parses));
    }
    report
  }

  /// Same as `score_mentions`, spreading the mentions over the rayon thread pool
  pub fn par_score_mentions(
    &self,
    mentions: &mut [AspectMention],
    parses: &ParseIndex,
  ) -> ScoreReport {
    let outcomes: Vec<Result<(), ResolutionError>> = mentions
      .par_iter_mut()
      .map(|mention| self.score_one(mention, parses))
      .collect();
    let mut report = ScoreReport::default();
    for outcome in &outcomes {
      report.record(outcome);
    }
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lemma::{NoLemmatizer, TableLemmatizer};
  use crate::lexicon::LexiconEntry;

  fn lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.insert("schlecht".into(), LexiconEntry::new(Qualifier::Neg, 0.8));
    lexicon.insert("schön".into(), LexiconEntry::new(Qualifier::Pos, 0.6));
    lexicon.insert("sehr".into(), LexiconEntry::new(Qualifier::Int, 1.5));
    lexicon.insert("nicht".into(), LexiconEntry::new(Qualifier::Shi, 1.0));
    lexicon.insert("leider".into(), LexiconEntry::new(Qualifier::Neg, 0.3));
    lexicon.insert("super".into(), LexiconEntry::new(Qualifier::Int, 2.0));
    lexicon.insert("super".into(), LexiconEntry::new(Qualifier::Pos, 0.7));
    lexicon
  }

  fn assert_close(actual: f64, expected: f64) {
    assert!(
      (actual - expected).abs() < 1e-9,
      "expected {}, got {}",
      expected,
      actual
    );
  }

  // "schlechte Grafik", optionally with "sehr" modifying the adjective
  fn adjective_tree(with_intensifier: bool) -> ParseTree {
    let mut tokens = vec![];
    if with_intensifier {
      tokens.push(Token::new("sehr", "ADV", "ADV").with_head(1));
    }
    let adjective = tokens.len();
    tokens.push(Token::new("schlechte", "ADJ", "ADJA").with_lemma("schlecht").with_head(adjective + 1));
    tokens.push(Token::new("Grafik", "NOUN", "NN"));
    ParseTree::new(tokens).unwrap()
  }

  #[test]
  fn negative_descriptor_flips_the_stored_strength() {
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&adjective_tree(false), "Grafik").unwrap();
    assert_close(result.value, -0.8);
    assert_eq!(result.descriptor, "schlechte");
    assert!(result.contributing_words.is_empty());
  }

  #[test]
  fn intensifier_scales_the_descriptor() {
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&adjective_tree(true), "Grafik").unwrap();
    assert_close(result.value, -1.2);
    assert_eq!(result.contributing_words, vec!["sehr"]);
  }

  #[test]
  fn every_shifter_flips_the_sign_again() {
    let tree = ParseTree::new(vec![
      Token::new("nicht", "PART", "PTKNEG").with_head(2),
      Token::new("nicht", "PART", "PTKNEG").with_head(2),
      Token::new("schöne", "ADJ", "ADJA").with_lemma("schön").with_head(3),
      Token::new("Optik", "NOUN", "NN"),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&tree, "Optik").unwrap();
    assert_close(result.value, 0.6);
    assert_eq!(result.contributing_words, vec!["nicht", "nicht"]);

    let single = ParseTree::new(vec![
      Token::new("nicht", "PART", "PTKNEG").with_head(1),
      Token::new("schöne", "ADJ", "ADJA").with_lemma("schön").with_head(2),
      Token::new("Optik", "NOUN", "NN"),
    ])
    .unwrap();
    assert_close(resolver.resolve_in(&single, "Optik").unwrap().value, -0.6);
  }

  #[test]
  fn mention_without_descriptor_or_verb_yields_nothing() {
    let tree = ParseTree::new(vec![
      Token::new("Die", "DET", "ART").with_head(1),
      Token::new("Grafik", "NOUN", "NN"),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    assert_eq!(resolver.resolve_in(&tree, "Grafik"), Err(ResolutionError::NoDescriptor));
  }

  #[test]
  fn verb_ancestor_children_are_the_fallback() {
    // "Die Grafik sieht leider alt aus"
    let tree = ParseTree::new(vec![
      Token::new("Die", "DET", "ART").with_head(1),
      Token::new("Grafik", "NOUN", "NN").with_head(2),
      Token::new("sieht", "VERB", "VVFIN"),
      Token::new("leider", "ADV", "ADV").with_head(2),
      Token::new("alt", "ADJ", "ADJD").with_head(2),
      Token::new("aus", "ADP", "PTKVZ").with_head(2),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&tree, "Grafik").unwrap();
    assert_eq!(result.descriptor, "leider");
    assert_close(result.value, -0.3);
  }

  #[test]
  fn verb_ancestor_is_found_above_a_noun_parent() {
    // "Der Look der Grafik ist leider alt"
    let tree = ParseTree::new(vec![
      Token::new("Der", "DET", "ART").with_head(1),
      Token::new("Look", "NOUN", "NN").with_head(4),
      Token::new("der", "DET", "ART").with_head(3),
      Token::new("Grafik", "NOUN", "NN").with_head(1),
      Token::new("ist", "AUX", "VAFIN"),
      Token::new("leider", "ADV", "ADV").with_head(4),
      Token::new("alt", "ADJ", "ADJD").with_head(4),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    assert_eq!(resolver.find_descriptor(&tree, 3), Some(5));
    let result = resolver.resolve_in(&tree, "Grafik").unwrap();
    assert_eq!(result.descriptor, "leider");
    assert_close(result.value, -0.3);
  }

  #[test]
  fn only_the_first_verb_ancestor_is_searched() {
    // the nearest verb has no descriptor child; the one above it does
    let tree = ParseTree::new(vec![
      Token::new("meint", "VERB", "VVFIN"),
      Token::new("leider", "ADV", "ADV").with_head(0),
      Token::new("klingt", "VERB", "VVFIN").with_head(0),
      Token::new("Sound", "NOUN", "NN").with_head(2),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    assert_eq!(resolver.resolve_in(&tree, "Sound"), Err(ResolutionError::NoDescriptor));
  }

  #[test]
  fn first_descriptor_child_wins() {
    let tree = ParseTree::new(vec![
      Token::new("schöne", "ADJ", "ADJA").with_lemma("schön").with_head(2),
      Token::new("schlechte", "ADJ", "ADJA").with_lemma("schlecht").with_head(2),
      Token::new("Grafik", "NOUN", "NN"),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&tree, "Grafik").unwrap();
    assert_eq!(result.descriptor, "schöne");
    assert_close(result.value, 0.6);
  }

  #[test]
  fn unknown_descriptor_defaults_to_identity() {
    let tree = ParseTree::new(vec![
      Token::new("mysteriöse", "ADJ", "ADJA").with_head(1),
      Token::new("Atmosphäre", "NOUN", "NN"),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&tree, "Atmosphäre").unwrap();
    assert_close(result.value, 1.0);
    assert_eq!(result.descriptor, "mysteriöse");

    let strict = ResolverConfig::default().with_miss_policy(MissPolicy::Reject);
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &strict);
    assert_eq!(
      resolver.resolve_in(&tree, "Atmosphäre"),
      Err(ResolutionError::LexiconMiss("mysteriöse".into()))
    );
  }

  #[test]
  fn external_lemmatizer_is_used_without_parser_lemmas() {
    let tree = ParseTree::new(vec![
      Token::new("schlechte", "ADJ", "ADJA").with_head(1),
      Token::new("Steuerung", "NOUN", "NN"),
    ])
    .unwrap();
    let mut lemmas = TableLemmatizer::new();
    lemmas.insert("schlechte", "schlecht");
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &lemmas, &config);
    assert_close(resolver.resolve_in(&tree, "Steuerung").unwrap().value, -0.8);
  }

  #[test]
  fn homograph_descriptor_uses_its_polar_row_and_modifier_uses_its_scaling_row() {
    let tree = ParseTree::new(vec![
      Token::new("super", "ADV", "ADV").with_head(1),
      Token::new("super", "ADJ", "ADJA").with_head(2),
      Token::new("Sound", "NOUN", "NN"),
    ])
    .unwrap();
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let result = resolver.resolve_in(&tree, "Sound").unwrap();
    assert_close(result.value, 1.4);
    assert_eq!(result.contributing_words, vec!["super"]);
  }

  #[test]
  fn word_missing_from_the_parse_is_a_mismatch() {
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    assert_eq!(
      resolver.resolve_in(&adjective_tree(false), "Sound"),
      Err(ResolutionError::ParseMismatch("Sound".into()))
    );
  }

  #[test]
  fn batch_scoring_is_repeatable_and_counts_outcomes() {
    let mut parses = ParseIndex::new();
    parses.insert(0, 0, adjective_tree(true));
    parses.insert(1, 0, adjective_tree(false));
    let mut mentions = vec![
      AspectMention::new(0, 0, 2, "Grafik", "Grafik"),
      AspectMention::new(1, 0, 1, "Grafik", "Grafik"),
      AspectMention::new(1, 0, 0, "Sound", "Sound"),
      AspectMention::new(5, 3, 0, "Grafik", "Grafik"),
    ];
    let (lexicon, config) = (lexicon(), ResolverConfig::default());
    let resolver = Resolver::new(&lexicon, &NoLemmatizer, &config);
    let report = resolver.score_mentions(&mut mentions, &parses);
    assert_eq!(report.scored, 2);
    assert_eq!(report.parse_mismatch, 2);
    assert_eq!(report.total(), 4);
    assert_eq!(mentions[0].intensifier_words, vec!["sehr"]);
    assert!(!mentions[2].is_scored());

    let first_pass = mentions.clone();
    let again = resolver.par_score_mentions(&mut mentions, &parses);
    assert_eq!(again, report);
    assert_eq!(mentions, first_pass);
  }
}
