//! Settings of the polarity resolver, built once and shared by reference
use crate::parse::Token;

/// What to do with a descriptor the lexicon has no polar entry for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissPolicy {
  /// score the descriptor with this base polarity
  Fallback(f64),
  /// produce no result and report `ResolutionError::LexiconMiss`
  Reject,
}

impl Default for MissPolicy {
  /// `1`, the multiplicative identity: intensifiers and shifters still act on it
  fn default() -> MissPolicy {
    MissPolicy::Fallback(1.0)
  }
}

/// Tag sets steering the dependency walk. Tags are compared exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
  /// fine tags of attributive adjectives (STTS `ADJA`)
  pub attributive_fine_tags: Vec<String>,
  /// coarse tag an attributive adjective must also carry (`ADJ`); empty accepts any
  pub attributive_coarse_tags: Vec<String>,
  /// coarse tags of adverbs (`ADV`)
  pub adverb_coarse_tags: Vec<String>,
  /// coarse tags of the verb ancestors searched when the mention has no descriptor
  pub verb_coarse_tags: Vec<String>,
  /// policy for descriptors without a polar lexicon entry
  pub miss_policy: MissPolicy,
}

fn owned(tags: &[&str]) -> Vec<String> {
  tags.iter().map(|tag| tag.to_string()).collect()
}

impl Default for ResolverConfig {
  fn default() -> ResolverConfig {
    ResolverConfig {
      attributive_fine_tags: owned(&["ADJA"]),
      attributive_coarse_tags: owned(&["ADJ"]),
      adverb_coarse_tags: owned(&["ADV"]),
      verb_coarse_tags: owned(&["AUX", "VERB"]),
      miss_policy: MissPolicy::default(),
    }
  }
}

impl ResolverConfig {
  /// Builder-style override of the miss policy
  pub fn with_miss_policy(mut self, miss_policy: MissPolicy) -> Self {
    self.miss_policy = miss_policy;
    self
  }

  /// An attributive adjective or an adverb
  pub fn is_descriptor(&self, token: &Token) -> bool {
    let attributive = contains(&self.attributive_fine_tags, token.fine_tag())
      && (self.attributive_coarse_tags.is_empty()
        || contains(&self.attributive_coarse_tags, token.coarse_tag()));
    attributive || contains(&self.adverb_coarse_tags, token.coarse_tag())
  }

  /// An auxiliary or main verb
  pub fn is_verb(&self, token: &Token) -> bool {
    contains(&self.verb_coarse_tags, token.coarse_tag())
  }
}

fn contains(tags: &[String], tag: &str) -> bool {
  tags.iter().any(|known| known == tag)
}
