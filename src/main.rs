use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pricematch::{
    build_search_query, AttributeSet, CatalogQuery, EmbeddingProvider, EngineConfig,
    ExtractedAttributes, HashingEmbedder, InMemoryCatalog, LiveComparison, LiveListing, LiveQuery,
    MatchingCriteria, OpenAiConfig, OpenAiEmbedder, PriceBasis, PriceFilter, RankingEngine,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Product matching and price ranking
#[derive(Parser, Debug)]
#[command(name = "pricematch")]
#[command(about = "Rank catalog products and live listings by relevance and price", long_about = None)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank a catalog against product attributes
    Match {
        /// Product attributes (JSON)
        #[arg(short, long)]
        attributes: PathBuf,

        /// Catalog products (JSON array)
        #[arg(long)]
        catalog: PathBuf,

        #[arg(long)]
        max_results: Option<usize>,

        /// Only rank products of this category
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price_weight: Option<f32>,

        #[arg(long)]
        similarity_weight: Option<f32>,

        #[arg(long, requires = "max_price")]
        min_price: Option<f64>,

        #[arg(long, requires = "min_price")]
        max_price: Option<f64>,

        #[arg(long, value_enum, default_value_t = EmbedderKind::Hashing)]
        embedder: EmbedderKind,
    },

    /// Score already-fetched live listings
    Live {
        /// Product attributes (JSON)
        #[arg(short, long)]
        attributes: PathBuf,

        /// Listings (JSON array)
        #[arg(long)]
        listings: PathBuf,

        #[arg(long, default_value_t = 10)]
        max_results: usize,

        /// Override the configured minimum match score
        #[arg(long)]
        min_score: Option<f32>,

        #[arg(long)]
        no_title: bool,

        #[arg(long)]
        no_brand: bool,

        #[arg(long)]
        no_color: bool,

        #[arg(long)]
        no_size: bool,

        #[arg(long)]
        no_specifications: bool,

        /// Compare multi-packs on price per item
        #[arg(long)]
        unit_price: bool,

        /// Weight of price competitiveness in the final order
        #[arg(long, default_value_t = 0.0)]
        price_weight: f32,

        /// Include price statistics
        #[arg(long)]
        stats: bool,
    },

    /// Print the shopping search query for product attributes
    Query {
        #[arg(short, long)]
        attributes: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Offline feature hashing
    Hashing,
    /// OpenAI-compatible endpoint, key from OPENAI_API_KEY
    Openai,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match args.command {
        Command::Match {
            attributes,
            catalog,
            max_results,
            category,
            price_weight,
            similarity_weight,
            min_price,
            max_price,
            embedder,
        } => {
            let attrs = load_attributes(&attributes)?;
            let catalog = InMemoryCatalog::load(&catalog)
                .with_context(|| format!("failed to load catalog from {}", catalog.display()))?;
            info!("Catalog loaded: {} products", catalog.len());

            let engine = RankingEngine::builder()
                .config(config)
                .embedder(build_embedder(embedder)?)
                .catalog(Arc::new(catalog))
                .build()?;

            let defaults = engine.catalog_query();
            let price_range = match (min_price, max_price) {
                (Some(min), Some(max)) => Some(PriceFilter::new(min, max)?),
                _ => None,
            };
            let query = CatalogQuery {
                max_results: max_results.unwrap_or(defaults.max_results),
                category_filter: category,
                price_weight: price_weight.unwrap_or(defaults.price_weight),
                similarity_weight: similarity_weight.unwrap_or(defaults.similarity_weight),
                price_range,
            };

            let results = engine.rank_against_catalog(&attrs, &query).await?;
            info!("Embedding cache: {:?}", engine.embedding_stats());
            print_json(&results)?;
        }

        Command::Live {
            attributes,
            listings,
            max_results,
            min_score,
            no_title,
            no_brand,
            no_color,
            no_size,
            no_specifications,
            unit_price,
            price_weight,
            stats,
        } => {
            let attrs = load_attributes(&attributes)?;
            let listings: Vec<LiveListing> = load_json(&listings)?;
            let engine = RankingEngine::builder().config(config).build()?;

            let query = LiveQuery {
                matching_criteria: MatchingCriteria {
                    title_matching: !no_title,
                    brand_matching: !no_brand,
                    color_matching: !no_color,
                    size_matching: !no_size,
                    specifications_matching: !no_specifications,
                },
                max_results,
                min_match_score: min_score,
                price_basis: if unit_price {
                    PriceBasis::Unit
                } else {
                    PriceBasis::Listed
                },
                price_weight,
                include_price_stats: stats,
                ..Default::default()
            };

            let products = engine.score_live_listings(&attrs, listings, &query)?;
            let price_stats = if stats {
                engine.price_comparison_summary(&products)
            } else {
                None
            };
            print_json(&LiveComparison {
                total_found: products.len(),
                products,
                price_stats,
                search_query: build_search_query(&attrs),
            })?;
        }

        Command::Query { attributes } => {
            let attrs = load_attributes(&attributes)?;
            println!("{}", build_search_query(&attrs));
        }
    }

    Ok(())
}

fn build_embedder(kind: EmbedderKind) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(match kind {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::default()),
        EmbedderKind::Openai => {
            let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
            Arc::new(OpenAiEmbedder::new(&api_key, &OpenAiConfig::default())?)
        }
    })
}

fn load_attributes(path: &Path) -> anyhow::Result<AttributeSet> {
    let raw: ExtractedAttributes = load_json(path)?;
    Ok(raw.into_attribute_set()?)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
