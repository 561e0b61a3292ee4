//! Provides functionality for tokenizing German review text into sentences and words
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
  static ref ABBREVIATIONS: Regex = Regex::new(
    r"(?i)^(?:z\.\s?b|d\.\s?h|u\.\s?a|u\.\s?ä|o\.\s?ä|bzw|usw|bzgl|bspw|ca|nr|dr|prof|vgl|etc|evtl|ggf|inkl|sog|max|min|mio|mrd|jh|str|abs|mind|zzgl)$"
  )
  .unwrap();
}

/// Stores auxiliary resources required by the tokenizer so that they need to be initialized only
/// once
pub struct Tokenizer {
  /// regular expression for abbreviations that end in a dot without ending the sentence
  pub abbreviations: Regex,
}

impl Default for Tokenizer {
  fn default() -> Tokenizer {
    Tokenizer {
      abbreviations: ABBREVIATIONS.clone(),
    }
  }
}

fn is_closing(c: char) -> bool {
  matches!(
    c,
    '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '»' | '«' | '“' | '”' | '…'
  )
}

impl Tokenizer {
  /// Does the text left of a dot end in an abbreviation, an initial or an ordinal number?
  fn abbreviation_check(&self, left: &str) -> bool {
    let last_word = left
      .rsplit(char::is_whitespace)
      .next()
      .unwrap_or("")
      .trim_start_matches(|c: char| !c.is_alphanumeric());
    if last_word.is_empty() {
      return false;
    }
    // "J. R. R. Tolkien", "am 3. Mai"
    (last_word.chars().count() == 1 && last_word.chars().all(char::is_alphabetic))
      || last_word.chars().all(|c| c.is_ascii_digit())
      || self.abbreviations.is_match(last_word)
  }

  /// Splits a text into sentences. A sentence ends with `.`, `!` or `?` (plus any run of
  /// closing punctuation and quotes) followed by whitespace or the end of the text, unless the
  /// next word starts in lower case or the dot closes an abbreviation.
  pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
      if !matches!(c, '.' | '!' | '?' | '…') {
        continue;
      }
      let mut end = position + c.len_utf8();
      while let Some(&(next_position, next)) = chars.peek() {
        if !is_closing(next) {
          break;
        }
        end = next_position + next.len_utf8();
        chars.next();
      }
      match chars.peek() {
        Some(&(_, next)) if !next.is_whitespace() => continue,
        _ => {},
      }
      if let Some(next_word_char) = text[end..].trim_start().chars().next() {
        if next_word_char.is_lowercase() {
          continue;
        }
      }
      if c == '.' && end == position + 1 && self.abbreviation_check(&text[start..position]) {
        continue;
      }
      push_sentence(&mut sentences, &text[start..end]);
      start = end;
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
  }

  /// Returns the words of a sentence: runs of alphanumeric characters, where a hyphen between
  /// two alphanumeric characters stays inside the word ("Open-World")
  pub fn words<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = sentence.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
      if c.is_alphanumeric() {
        if start.is_none() {
          start = Some(position);
        }
        continue;
      }
      if c == '-' && start.is_some() {
        if let Some(&(_, next)) = chars.peek() {
          if next.is_alphanumeric() {
            continue;
          }
        }
      }
      if let Some(word_start) = start.take() {
        words.push(&sentence[word_start..position]);
      }
    }
    if let Some(word_start) = start {
      words.push(&sentence[word_start..]);
    }
    words
  }

  /// Sentences of `text`, each split into owned words
  pub fn tokenize(&self, text: &str) -> Vec<Vec<String>> {
    self
      .sentences(text)
      .into_iter()
      .map(|sentence| self.words(sentence).into_iter().map(String::from).collect::<Vec<_>>())
      .filter(|words: &Vec<String>| !words.is_empty())
      .collect()
  }
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
  let trimmed = candidate.trim();
  if trimmed.chars().any(char::is_alphanumeric) {
    sentences.push(trimmed);
  }
}
