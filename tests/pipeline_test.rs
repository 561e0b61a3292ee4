//! End-to-end run over the review mini-corpus: preprocess, annotate, score, aggregate
use rezension::aggregate;
use rezension::aspects::AspectKeywords;
use rezension::config::ResolverConfig;
use rezension::lemma::TableLemmatizer;
use rezension::lexicon::Lexicon;
use rezension::mention::{self, AspectMention};
use rezension::parse::{conllu, ParseIndex};
use rezension::preprocess::{self, NormalizeOptions, Normalizer};
use rezension::resolver::Resolver;
use rezension::stats::AspectStats;
use rezension::util::test::{resource, RESOURCE_REVIEWS};

fn close(left: Option<f64>, right: f64) -> bool {
  left.map(|left| (left - right).abs() < 1e-9).unwrap_or(false)
}

#[test]
fn resource_corpus_is_found() {
  assert_eq!(*RESOURCE_REVIEWS, vec!["gothic", "witcher"]);
  let files = preprocess::review_files(resource("reviews")).unwrap();
  assert_eq!(files.len(), RESOURCE_REVIEWS.len());
  assert!(preprocess::review_files(resource("missing")).is_err());
}

#[test]
fn full_pipeline() {
  let workdir = tempfile::tempdir().unwrap();

  // preprocess
  let files = preprocess::review_files(resource("reviews")).unwrap();
  let normalizer = Normalizer::new(NormalizeOptions::default());
  let reviews = normalizer.preprocess(&files);
  assert_eq!(reviews.len(), 3, "the blank review is skipped");
  assert_eq!(reviews[0].title, "Gothic");
  assert_eq!(
    reviews[0].text_normalized,
    "Die sehr schöne Grafik begeistert. Der Sound ist nicht gut."
  );
  assert_eq!(reviews[2].review_number, 2);
  let reviews_path = workdir.path().join("data_preprocessed.csv");
  preprocess::write_reviews(&reviews_path, &reviews).unwrap();
  let reviews = preprocess::read_reviews(&reviews_path).unwrap();

  // annotate
  let keywords = AspectKeywords::default();
  let mentions: Vec<AspectMention> = reviews
    .iter()
    .flat_map(|review| keywords.locate(review.review_number, &review.tokens))
    .collect();
  let located: Vec<(usize, usize, usize, &str)> = mentions
    .iter()
    .map(|m| (m.review_number, m.sentence_index, m.word_index, m.aspect.as_str()))
    .collect();
  assert_eq!(
    located,
    vec![
      (0, 0, 3, "Grafik"),
      (0, 1, 1, "Sound"),
      (1, 0, 1, "Steuerung"),
      (2, 1, 1, "Grafik"),
      (2, 0, 2, "Atmosphäre"),
    ]
  );
  let mentions_path = workdir.path().join("data_aspects_tokens.csv");
  mention::write_mentions(&mentions_path, &mentions).unwrap();

  // score
  let lexicon = Lexicon::from_csv_path(resource("sentiment_lexicon.csv")).unwrap();
  let lemmatizer = TableLemmatizer::from_tsv_path(resource("lemmas.tsv")).unwrap();
  let config = ResolverConfig::default();
  let parses = ParseIndex::from_sentences(conllu::read_path(resource("parses.conllu")).unwrap());
  let mut mentions = mention::read_mentions(&mentions_path).unwrap();
  let report = Resolver::new(&lexicon, &lemmatizer, &config).par_score_mentions(&mut mentions, &parses);
  assert_eq!(report.scored, 4);
  assert_eq!(report.no_descriptor, 1);
  assert_eq!(report.total(), mentions.len());

  assert!(close(mentions[0].polarity_strength, 0.9));
  assert_eq!(mentions[0].sentiment_words, vec!["schöne"]);
  assert_eq!(mentions[0].intensifier_words, vec!["sehr"]);
  assert!(close(mentions[1].polarity_strength, -0.4));
  assert_eq!(mentions[1].intensifier_words, vec!["nicht"]);
  assert!(close(mentions[2].polarity_strength, -0.8));
  assert_eq!(mentions[3].polarity_strength, None);
  assert!(mentions[3].sentiment_words.is_empty());
  assert!(close(mentions[4].polarity_strength, 1.0), "unknown descriptors score 1");
  mention::write_mentions(&mentions_path, &mentions).unwrap();

  // aggregate
  let mentions = mention::read_mentions(&mentions_path).unwrap();
  let polarities = aggregate::summarize(&mentions, &reviews);
  let summary: Vec<(usize, &str, Option<u8>)> = polarities
    .iter()
    .map(|p| (p.review_number, p.aspect.as_str(), p.true_label))
    .collect();
  assert_eq!(
    summary,
    vec![
      (0, "Grafik", Some(5)),
      (0, "Sound", Some(1)),
      (1, "Steuerung", Some(0)),
      (2, "Atmosphäre", Some(4)),
    ]
  );
  let polarities_path = workdir.path().join("review_aspect_polarity.csv");
  aggregate::write_polarities(&polarities_path, &polarities).unwrap();
  assert_eq!(aggregate::read_polarities(&polarities_path).unwrap(), polarities);

  // stats
  let stats = AspectStats::from_mentions(&mentions);
  assert_eq!(stats.total_mentions(), 5);
  assert_eq!(stats.get("Grafik").map(|counts| counts.scored), Some(1));
}

#[test]
fn custom_keyword_dictionary() {
  let keywords = AspectKeywords::from_json_path(resource("aspectDict.json")).unwrap();
  let labels: Vec<&str> = keywords.iter().map(|(label, _)| label).collect();
  assert_eq!(labels, vec!["Story", "Grafik"]);
  let sentences = vec![vec!["Handlung".to_string(), "und".into(), "Optik".into()]];
  let found: Vec<String> = keywords
    .locate(7, &sentences)
    .into_iter()
    .map(|m| m.aspect)
    .collect();
  assert_eq!(found, vec!["Story", "Grafik"]);
}
