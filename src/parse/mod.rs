//! Dependency parses of single sentences.
//!
//! A `ParseTree` owns the tokens of one sentence in surface order; parent and child
//! links are plain indices into that arena, so navigating the tree never owns or
//! clones a token.
pub mod conllu;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A single token of a parsed sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  text: String,
  lemma: Option<String>,
  coarse_tag: String,
  fine_tag: String,
  head: Option<usize>,
}

impl Token {
  /// A root token (no head) with the given surface text and tags
  pub fn new(text: &str, coarse_tag: &str, fine_tag: &str) -> Self {
    Token {
      text: text.to_string(),
      lemma: None,
      coarse_tag: coarse_tag.to_string(),
      fine_tag: fine_tag.to_string(),
      head: None,
    }
  }

  /// Attach the token to the head at 0-based position `head`
  pub fn with_head(mut self, head: usize) -> Self {
    self.head = Some(head);
    self
  }

  /// Record the lemma supplied by the parser
  pub fn with_lemma(mut self, lemma: &str) -> Self {
    self.lemma = Some(lemma.to_string());
    self
  }

  /// surface text
  pub fn text(&self) -> &str {
    &self.text
  }
  /// lemma assigned by the parser, if any
  pub fn lemma(&self) -> Option<&str> {
    self.lemma.as_deref()
  }
  /// coarse (universal) part-of-speech tag, e.g. `ADJ`
  pub fn coarse_tag(&self) -> &str {
    &self.coarse_tag
  }
  /// fine-grained (STTS) tag, e.g. `ADJA`
  pub fn fine_tag(&self) -> &str {
    &self.fine_tag
  }
  /// 0-based index of the head token, `None` for the root
  pub fn head(&self) -> Option<usize> {
    self.head
  }
}

/// The dependency tree of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
  tokens: Vec<Token>,
  children: Vec<Vec<usize>>,
}

impl ParseTree {
  /// Build the tree, checking that every head points inside the sentence
  pub fn new(tokens: Vec<Token>) -> Result<Self> {
    let len = tokens.len();
    let mut children = vec![Vec::new(); len];
    for (index, token) in tokens.iter().enumerate() {
      if let Some(head) = token.head {
        if head >= len || head == index {
          return Err(Error::InvalidHead {
            token: index,
            head,
            len,
          });
        }
        children[head].push(index);
      }
    }
    // indices were pushed in increasing order, so every child list is left-to-right
    Ok(ParseTree { tokens, children })
  }

  /// number of tokens
  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  /// true for an empty sentence
  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// The token at `index`
  pub fn token(&self, index: usize) -> Option<&Token> {
    self.tokens.get(index)
  }

  /// All tokens in surface order
  pub fn iter(&self) -> impl Iterator<Item = &Token> {
    self.tokens.iter()
  }

  /// Index of the head of `index`, if any
  pub fn parent(&self, index: usize) -> Option<usize> {
    self.tokens.get(index).and_then(Token::head)
  }

  /// Direct dependents of `index`, left to right
  pub fn children(&self, index: usize) -> &[usize] {
    self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
  }

  /// The chain of heads above `index`, nearest first
  pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
    Ancestors {
      tree: self,
      current: index,
      remaining: self.len(),
    }
  }

  /// Index of the first token (left to right) whose surface text equals `text`
  pub fn find(&self, text: &str) -> Option<usize> {
    self.tokens.iter().position(|token| token.text == text)
  }

  /// The sentence text, tokens joined by single spaces
  pub fn text(&self) -> String {
    self
      .tokens
      .iter()
      .map(Token::text)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Iterator over the ancestors of a token. Stops after as many steps as the sentence
/// has tokens, so malformed (cyclic) head chains cannot loop forever.
pub struct Ancestors<'t> {
  tree: &'t ParseTree,
  current: usize,
  remaining: usize,
}

impl<'t> Iterator for Ancestors<'t> {
  type Item = usize;
  fn next(&mut self) -> Option<usize> {
    if self.remaining == 0 {
      return None;
    }
    self.remaining -= 1;
    let parent = self.tree.parent(self.current)?;
    self.current = parent;
    Some(parent)
  }
}

/// A parsed sentence as read from a parse file
#[derive(Debug, Clone)]
pub struct ParsedSentence {
  /// the `sent_id` comment, if present
  pub sent_id: Option<String>,
  /// the `text` comment, if present
  pub text: Option<String>,
  /// the dependency tree
  pub tree: ParseTree,
}

/// Split a sentence id of the form `<review>-<sentence>` (or with `_`, `/`, `:`) into
/// the review number and the sentence index within that review
pub fn split_sentence_id(id: &str) -> Option<(usize, usize)> {
  let (review, sentence) = id.trim().rsplit_once(|c: char| matches!(c, '-' | '_' | '/' | ':'))?;
  let review = review
    .rsplit(|c: char| !c.is_ascii_digit())
    .next()
    .unwrap_or(review);
  Some((review.parse().ok()?, sentence.parse().ok()?))
}

/// Parses keyed by `(review number, sentence index)`
#[derive(Debug, Clone, Default)]
pub struct ParseIndex {
  trees: HashMap<(usize, usize), ParseTree>,
}

impl ParseIndex {
  /// empty index
  pub fn new() -> Self {
    ParseIndex::default()
  }

  /// Index sentences by their `sent_id`; sentences without a usable id are skipped.
  /// When an id repeats, the first sentence is kept.
  pub fn from_sentences(sentences: Vec<ParsedSentence>) -> Self {
    let mut index = ParseIndex::new();
    for sentence in sentences {
      match sentence.sent_id.as_deref().and_then(split_sentence_id) {
        Some((review, position)) => {
          if index.trees.contains_key(&(review, position)) {
            debug!("duplicate parse for sentence {}-{}", review, position);
          } else {
            index.insert(review, position, sentence.tree);
          }
        },
        None => warn!(
          "parsed sentence without a usable sent_id ({:?}), skipping",
          sentence.sent_id
        ),
      }
    }
    index
  }

  /// Register the tree of sentence `sentence` of review `review`
  pub fn insert(&mut self, review: usize, sentence: usize, tree: ParseTree) {
    self.trees.insert((review, sentence), tree);
  }

  /// The tree of sentence `sentence` of review `review`
  pub fn get(&self, review: usize, sentence: usize) -> Option<&ParseTree> {
    self.trees.get(&(review, sentence))
  }

  /// number of indexed sentences
  pub fn len(&self) -> usize {
    self.trees.len()
  }

  /// true when nothing is indexed
  pub fn is_empty(&self) -> bool {
    self.trees.is_empty()
  }
}
