//! Reader for CoNLL-U dependency parses, the exchange format written by most
//! dependency parsers (spaCy, Stanza, UDPipe)
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::info;

use super::{ParseTree, ParsedSentence, Token};
use crate::error::{Error, Result};

const COLUMNS: usize = 10;

/// Read every sentence of a CoNLL-U file
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<ParsedSentence>> {
  let sentences = read(File::open(path.as_ref())?)?;
  info!(
    "read {} parsed sentences from {}",
    sentences.len(),
    path.as_ref().display()
  );
  Ok(sentences)
}

#[derive(Default)]
struct Pending {
  sent_id: Option<String>,
  text: Option<String>,
  tokens: Vec<Token>,
  first_line: usize,
}

impl Pending {
  fn finish(self, line: usize) -> Result<ParsedSentence> {
    let tree = ParseTree::new(self.tokens).map_err(|e| Error::Conllu {
      line: self.first_line.max(line),
      message: e.to_string(),
    })?;
    Ok(ParsedSentence {
      sent_id: self.sent_id,
      text: self.text,
      tree,
    })
  }

  fn is_empty(&self) -> bool {
    self.tokens.is_empty() && self.sent_id.is_none() && self.text.is_none()
  }
}

/// Read every sentence of CoNLL-U input. Multiword token ranges (`3-4`) and empty
/// nodes (`5.1`) are skipped; a `_` lemma counts as missing.
pub fn read<R: Read>(reader: R) -> Result<Vec<ParsedSentence>> {
  let mut sentences = Vec::new();
  let mut pending = Pending::default();
  let mut line_number = 0;

  for line in BufReader::new(reader).lines() {
    line_number += 1;
    let line = line?;
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
      if !pending.is_empty() {
        sentences.push(std::mem::take(&mut pending).finish(line_number)?);
      }
      continue;
    }
    if pending.is_empty() {
      pending.first_line = line_number;
    }
    if let Some(comment) = line.strip_prefix('#') {
      if let Some((key, value)) = comment.split_once('=') {
        match key.trim() {
          "sent_id" => pending.sent_id = Some(value.trim().to_string()),
          "text" => pending.text = Some(value.trim().to_string()),
          _ => {},
        }
      }
      continue;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != COLUMNS {
      return Err(Error::Conllu {
        line: line_number,
        message: format!("expected {} columns, found {}", COLUMNS, fields.len()),
      });
    }
    let id = fields[0];
    if id.contains('-') || id.contains('.') {
      continue;
    }
    let id: usize = id.parse().map_err(|_| Error::Conllu {
      line: line_number,
      message: format!("bad token id {:?}", id),
    })?;
    if id != pending.tokens.len() + 1 {
      return Err(Error::Conllu {
        line: line_number,
        message: format!(
          "token id {} out of sequence, expected {}",
          id,
          pending.tokens.len() + 1
        ),
      });
    }

    let mut token = Token::new(fields[1], fields[3], fields[4]);
    if fields[2] != "_" && !fields[2].is_empty() {
      token = token.with_lemma(fields[2]);
    }
    if fields[6] != "_" {
      let head: usize = fields[6].parse().map_err(|_| Error::Conllu {
        line: line_number,
        message: format!("bad head {:?}", fields[6]),
      })?;
      // HEAD is 1-based, 0 marks the root
      if let Some(head) = head.checked_sub(1) {
        token = token.with_head(head);
      }
    }
    pending.tokens.push(token);
  }
  if !pending.is_empty() {
    sentences.push(pending.finish(line_number)?);
  }
  Ok(sentences)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = "# sent_id = 0-1\n\
# text = Die Grafik ist schön.\n\
1\tDie\tder\tDET\tART\t_\t2\tnk\t_\t_\n\
2\tGrafik\tGrafik\tNOUN\tNN\t_\t3\tsb\t_\t_\n\
3\tist\tsein\tAUX\tVAFIN\t_\t0\tROOT\t_\t_\n\
4\tschön\tschön\tADJ\tADJD\t_\t3\tpd\t_\tSpaceAfter=No\n\
5\t.\t_\tPUNCT\t$.\t_\t3\tpunct\t_\t_\n\
\n\
# sent_id = 0-2\n\
1-2\tzum\t_\t_\t_\t_\t_\t_\t_\t_\n\
1\tzu\tzu\tADP\tAPPR\t_\t0\tROOT\t_\t_\n\
2\tdem\tder\tDET\tART\t_\t1\tnk\t_\t_\n";

  #[test]
  fn reads_sentences_with_ids_and_heads() {
    let sentences = read(SAMPLE.as_bytes()).unwrap();
    assert_eq!(sentences.len(), 2);
    let first = &sentences[0];
    assert_eq!(first.sent_id.as_deref(), Some("0-1"));
    assert_eq!(first.text.as_deref(), Some("Die Grafik ist schön."));
    assert_eq!(first.tree.len(), 5);
    assert_eq!(first.tree.parent(1), Some(2));
    assert_eq!(first.tree.parent(2), None);
    assert_eq!(first.tree.children(2), &[1, 3, 4]);
    let grafik = first.tree.token(1).unwrap();
    assert_eq!(grafik.coarse_tag(), "NOUN");
    assert_eq!(grafik.fine_tag(), "NN");
    assert_eq!(first.tree.token(4).unwrap().lemma(), None);
  }

  #[test]
  fn multiword_ranges_are_skipped() {
    let sentences = read(SAMPLE.as_bytes()).unwrap();
    assert_eq!(sentences[1].tree.len(), 2);
    assert_eq!(sentences[1].tree.token(0).unwrap().text(), "zu");
  }

  #[test]
  fn short_rows_report_their_line() {
    let broken = "# sent_id = 1-0\n1\tGrafik\tGrafik\tNOUN\n";
    match read(broken.as_bytes()) {
      Err(Error::Conllu { line, .. }) => assert_eq!(line, 2),
      other => panic!("expected a CoNLL-U error, got {:?}", other),
    }
  }

  #[test]
  fn heads_past_the_sentence_are_errors() {
    let broken = "1\tGrafik\tGrafik\tNOUN\tNN\t_\t7\tsb\t_\t_\n";
    assert!(matches!(read(broken.as_bytes()), Err(Error::Conllu { .. })));
    let negative = "1\tGrafik\tGrafik\tNOUN\tNN\t_\t-1\tsb\t_\t_\n";
    assert!(matches!(read(negative.as_bytes()), Err(Error::Conllu { .. })));
  }

  #[test]
  fn zero_padded_root_heads_are_roots() {
    let padded = "1\tGrafik\tGrafik\tNOUN\tNN\t_\t00\tROOT\t_\t_\n\
2\tschön\tschön\tADJ\tADJD\t_\t01\tpd\t_\t_\n";
    let sentences = read(padded.as_bytes()).unwrap();
    assert_eq!(sentences[0].tree.parent(0), None);
    assert_eq!(sentences[0].tree.parent(1), Some(0));
  }
}
