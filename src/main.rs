use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rezension::aggregate::{self, AspectPolarity};
use rezension::aspects::AspectKeywords;
use rezension::classify::{self, Sample, Sentiment, SentimentModel};
use rezension::config::{MissPolicy, ResolverConfig};
use rezension::lemma::{Lemmatizer, NoLemmatizer, TableLemmatizer};
use rezension::lexicon::Lexicon;
use rezension::mention::{self, AspectMention};
use rezension::parse::{conllu, ParseIndex};
use rezension::preprocess::{self, NormalizeOptions, Normalizer};
use rezension::resolver::Resolver;
use rezension::stats::AspectStats;

const PREPROCESSED: &str = "data_preprocessed.csv";
const MENTIONS: &str = "data_aspects_tokens.csv";
const POLARITIES: &str = "review_aspect_polarity.csv";

#[derive(Parser)]
#[command(about = "Aspect-based sentiment analysis of German game reviews")]
struct Args {
  #[arg(long, global = true, default_value = "data", help = "Directory holding the pipeline tables")]
  data_dir: PathBuf,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Normalize and tokenize scraped review files
  Preprocess(PreprocessArgs),
  /// Locate aspect mentions in the preprocessed reviews
  Annotate(AnnotateArgs),
  /// Score every aspect mention against its dependency parse
  Score(ScoreArgs),
  /// Average mention polarities per review and aspect
  Aggregate,
  /// Fit and evaluate the polarity to sentiment mapping
  Train(TrainArgs),
  /// Print mention and descriptor counts per aspect
  Stats(StatsArgs),
}

#[derive(ClapArgs)]
struct PreprocessArgs {
  #[arg(long, help = "Directory searched recursively for review JSON files")]
  input: PathBuf,
  #[arg(long)]
  lower: bool,
  #[arg(long)]
  remove_non_alphanumeric: bool,
  #[arg(long)]
  substitute_special: bool,
  #[arg(long)]
  remove_stopwords: bool,
  #[arg(long, help = "Skip reviews that are detected as not German")]
  require_german: bool,
}

#[derive(ClapArgs)]
struct AnnotateArgs {
  #[arg(long, help = "JSON object mapping aspect labels to keyword lists")]
  keywords: Option<PathBuf>,
}

#[derive(ClapArgs)]
struct ScoreArgs {
  #[arg(long, help = "CoNLL-U parses with sent_id <review>-<sentence>")]
  parses: PathBuf,
  #[arg(long, help = "Lexicon CSV (word, qualifier, polarity_strength, pos)")]
  lexicon: Option<PathBuf>,
  #[arg(long, num_args = 1.., conflicts_with = "lexicon", help = "SentiWS list files")]
  sentiws: Vec<PathBuf>,
  #[arg(long, help = "Tab separated form/lemma table")]
  lemmas: Option<PathBuf>,
  #[arg(long, help = "Leave descriptors without a polar lexicon entry unscored")]
  reject_misses: bool,
}

#[derive(ClapArgs)]
struct TrainArgs {
  #[arg(long, default_value_t = 2000)]
  iterations: usize,
  #[arg(long, default_value_t = 0.66)]
  train_fraction: f64,
  #[arg(long, help = "Only use the polarities of this aspect")]
  aspect: Option<String>,
}

#[derive(ClapArgs)]
struct StatsArgs {
  #[arg(long, default_value_t = 10)]
  top: usize,
}

fn preprocess(data_dir: &Path, args: PreprocessArgs) -> anyhow::Result<()> {
  let files = preprocess::review_files(&args.input)?;
  let normalizer = Normalizer::new(NormalizeOptions {
    lower: args.lower,
    remove_non_alphanumeric: args.remove_non_alphanumeric,
    substitute_special: args.substitute_special,
    remove_stopwords: args.remove_stopwords,
    require_german: args.require_german,
  });
  let reviews = normalizer.preprocess(&files);
  preprocess::write_reviews(data_dir.join(PREPROCESSED), &reviews)?;
  Ok(())
}

fn annotate(data_dir: &Path, args: AnnotateArgs) -> anyhow::Result<()> {
  let keywords = match args.keywords {
    Some(path) => AspectKeywords::from_json_path(path)?,
    None => AspectKeywords::default(),
  };
  let reviews = preprocess::read_reviews(data_dir.join(PREPROCESSED))
    .context("run `preprocess` first")?;
  let mentions: Vec<AspectMention> = reviews
    .iter()
    .flat_map(|review| keywords.locate(review.review_number, &review.tokens))
    .collect();
  info!("located {} aspect mentions in {} reviews", mentions.len(), reviews.len());
  mention::write_mentions(data_dir.join(MENTIONS), &mentions)?;
  Ok(())
}

fn score(data_dir: &Path, args: ScoreArgs) -> anyhow::Result<()> {
  let lexicon = if !args.sentiws.is_empty() {
    Lexicon::from_sentiws_paths(&args.sentiws)?
  } else {
    let path = args
      .lexicon
      .unwrap_or_else(|| data_dir.join("sentiment_lexicon.csv"));
    Lexicon::from_csv_path(&path)
      .with_context(|| format!("loading lexicon {}", path.display()))?
  };
  let lemmatizer: Box<dyn Lemmatizer> = match (args.lemmas, args.sentiws.is_empty()) {
    (Some(path), _) => Box::new(TableLemmatizer::from_tsv_path(path)?),
    (None, false) => Box::new(TableLemmatizer::from_sentiws_paths(&args.sentiws)?),
    (None, true) => Box::new(NoLemmatizer),
  };
  let config = if args.reject_misses {
    ResolverConfig::default().with_miss_policy(MissPolicy::Reject)
  } else {
    ResolverConfig::default()
  };

  let sentences = conllu::read_path(&args.parses)
    .with_context(|| format!("reading parses {}", args.parses.display()))?;
  let parses = ParseIndex::from_sentences(sentences);
  info!("indexed {} parsed sentences", parses.len());

  let table = data_dir.join(MENTIONS);
  let mut mentions = mention::read_mentions(&table).context("run `annotate` first")?;
  let resolver = Resolver::new(&lexicon, lemmatizer.as_ref(), &config);
  let report = resolver.par_score_mentions(&mut mentions, &parses);
  info!(
    "scored {} of {} mentions ({} without descriptor, {} lexicon misses, {} not in parses)",
    report.scored,
    report.total(),
    report.no_descriptor,
    report.lexicon_miss,
    report.parse_mismatch
  );
  mention::write_mentions(&table, &mentions)?;
  Ok(())
}

fn aggregate(data_dir: &Path) -> anyhow::Result<()> {
  let reviews = preprocess::read_reviews(data_dir.join(PREPROCESSED))?;
  let mentions = mention::read_mentions(data_dir.join(MENTIONS))?;
  let polarities = aggregate::summarize(&mentions, &reviews);
  aggregate::write_polarities(data_dir.join(POLARITIES), &polarities)?;
  Ok(())
}

fn samples(polarities: &[AspectPolarity], aspect: Option<&str>) -> Vec<Sample> {
  polarities
    .iter()
    .filter(|polarity| aspect.map(|aspect| polarity.aspect == aspect).unwrap_or(true))
    .filter_map(|polarity| {
      let label = polarity.true_label.and_then(Sentiment::from_stars)?;
      Some((polarity.polarity, label))
    })
    .collect()
}

fn train(data_dir: &Path, args: TrainArgs) -> anyhow::Result<()> {
  if !(0.0..=1.0).contains(&args.train_fraction) {
    anyhow::bail!("--train-fraction must lie within [0, 1]");
  }
  let polarities = aggregate::read_polarities(data_dir.join(POLARITIES))
    .context("run `aggregate` first")?;
  let samples = samples(&polarities, args.aspect.as_deref());
  let (train, test) = classify::balanced_split(&samples, args.train_fraction);
  info!(
    "{} labelled polarities, {} for training, {} for testing",
    samples.len(),
    train.len(),
    test.len()
  );
  if train.is_empty() || test.is_empty() {
    anyhow::bail!("not enough labelled polarities to train and evaluate");
  }
  let mut model = SentimentModel::new().with_iterations(args.iterations);
  model.fit(&train)?;
  let confusion = classify::evaluate(&model, &test)?;
  println!("accuracy: {:.3}", confusion.accuracy());
  print!("{}", confusion);
  Ok(())
}

fn stats(data_dir: &Path, args: StatsArgs) -> anyhow::Result<()> {
  let mentions = mention::read_mentions(data_dir.join(MENTIONS))?;
  print!("{}", AspectStats::from_mentions(&mentions).with_top(args.top));
  Ok(())
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  std::fs::create_dir_all(&args.data_dir)
    .with_context(|| format!("creating {}", args.data_dir.display()))?;

  use Command::*;
  match args.command {
    Preprocess(margs) => preprocess(&args.data_dir, margs),
    Annotate(margs) => annotate(&args.data_dir, margs),
    Score(margs) => score(&args.data_dir, margs),
    Aggregate => aggregate(&args.data_dir),
    Train(margs) => train(&args.data_dir, margs),
    Stats(margs) => stats(&args.data_dir, margs),
  }
}
