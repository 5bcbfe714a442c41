mod preprocess;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use ulasan_core::AppConfig;
use ulasan_sentiment::Lexicon;

#[derive(Debug, Parser)]
#[command(name = "ulasan-cli")]
#[command(about = "Scrape reviews, clean them and score their sentiment")]
struct Cli {
    /// Lexicon YAML to use instead of `ULASAN_LEXICON_PATH` or the built-in list
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clean, deduplicate and score a CSV of reviews
    Preprocess {
        /// Scraped CSV to read
        #[arg(long)]
        input: PathBuf,

        /// Where to write the scored CSV (default: `<input>-processed.csv`)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Column holding the review text
        #[arg(long, default_value = ulasan_sentiment::DEFAULT_TEXT_FIELD)]
        text_col: String,

        /// Keep stopwords in `clean_text`
        #[arg(long)]
        no_stopwords: bool,

        /// Keep rows whose cleaned text repeats an earlier row
        #[arg(long)]
        no_dedup: bool,

        /// Keep rows whose text is empty before or after cleaning
        #[arg(long)]
        keep_empty: bool,
    },
    /// Run tweet-harvest and store the resulting CSV
    Scrape {
        /// Search query passed to the harvester
        #[arg(long)]
        keyword: String,

        /// Twitter auth token
        #[arg(long, env = "TWITTER_AUTH_TOKEN", hide_env_values = true)]
        token: String,

        /// Maximum number of tweets
        #[arg(long, default_value_t = 500)]
        limit: u32,

        #[arg(long, value_enum, default_value_t = TabArg::Latest)]
        tab: TabArg,

        /// Base output file name; the job id is prefixed
        #[arg(long, default_value = "data.csv")]
        filename: String,
    },
    /// Score one piece of text
    Predict {
        text: String,

        /// Normalize only; keep stopwords
        #[arg(long)]
        raw: bool,
    },
    /// Score several texts and print the label distribution
    Analyze {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TabArg {
    Latest,
    Top,
}

impl From<TabArg> for ulasan_scraper::Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Latest => ulasan_scraper::Tab::Latest,
            TabArg::Top => ulasan_scraper::Tab::Top,
        }
    }
}

/// Resolve the lexicon: explicit flag, then config path, then built-in.
fn load_lexicon(flag: Option<&PathBuf>, config: &AppConfig) -> anyhow::Result<Lexicon> {
    let file = match flag.or(config.lexicon_path.as_ref()) {
        Some(path) => ulasan_core::load_lexicon(path)?,
        None => ulasan_core::builtin_lexicon()?,
    };
    Ok(Lexicon::from(file))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = ulasan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let lexicon = load_lexicon(cli.lexicon.as_ref(), &config)?;

    match cli.command {
        Commands::Preprocess {
            input,
            output,
            text_col,
            no_stopwords,
            no_dedup,
            keep_empty,
        } => {
            let options = ulasan_sentiment::PipelineOptions {
                text_field: text_col,
                use_stopwords: !no_stopwords,
                dedup: !no_dedup,
                drop_empty: !keep_empty,
                preview_limit: config.preview_limit,
            };
            let report =
                preprocess::run_preprocess(&input, output.as_deref(), &lexicon, options).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Scrape {
            keyword,
            token,
            limit,
            tab,
            filename,
        } => {
            let request = ulasan_scraper::ScrapeRequest {
                token,
                filename,
                search_keyword: keyword,
                limit,
                tab: tab.into(),
            };
            scrape::run_scrape(&config, request).await?;
        }
        Commands::Predict { text, raw } => {
            let out = ulasan_sentiment::predict(&text, &lexicon, !raw);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Analyze { texts } => {
            let analysis = ulasan_sentiment::analyze_texts(&texts, &lexicon);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }

    Ok(())
}
