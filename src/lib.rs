//! # rezension
//! Aspect-based sentiment analysis for German video game reviews.
//!
//! Reviews are normalized and tokenized, aspect keywords (graphics, sound, controls,
//! atmosphere) are located, and every mention is scored by walking the dependency parse of
//! its sentence against a polarity lexicon. Scores are averaged per review and aspect and
//! can be mapped onto the reviewers' own star ratings.

#![deny(
  missing_docs,
  trivial_casts,
  trivial_numeric_casts,
  unused_import_braces,
  unused_qualifications
)]

pub mod util;

pub mod aggregate;
pub mod aspects;
pub mod classify;
pub mod config;
pub mod error;
pub mod lemma;
pub mod lexicon;
pub mod mention;
pub mod parse;
pub mod preprocess;
pub mod resolver;
pub mod stats;
pub mod stopwords;
pub mod tokenizer;

pub use error::{Error, Result};
