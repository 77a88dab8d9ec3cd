//! Scout CLI
//!
//! Runs the research pipeline end to end: generate (or accept) search
//! queries, search the web, summarize each unique source, and print the
//! formatted context plus a token-cost report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use scout_agents::{
    ChatClient, LlmProvider, PipelineConfig, QueryWriter, TavilyClient, WebSearchPipeline,
};
use scout_core::{calculate_token_cost, PipelineState, PipelineStep, SearchQuery};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Scout - web research building blocks for LLM agents
#[derive(Parser)]
#[command(name = "scout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a topic: search, summarize, and print the source context
    Research {
        /// Research topic
        topic: String,

        /// Search query (repeatable; generated from the topic if omitted)
        #[arg(short, long = "query")]
        queries: Vec<String>,

        /// Number of queries to generate when none are given
        #[arg(short, long, default_value = "3")]
        num_queries: usize,

        /// Search category (general|news|finance)
        #[arg(short, long)]
        category: Option<String>,

        /// Search depth (basic|advanced)
        #[arg(long)]
        depth: Option<String>,

        /// Days back for news searches
        #[arg(long)]
        days_back: Option<u32>,

        /// Maximum results per query
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Token budget per source when formatting
        #[arg(long)]
        max_tokens_per_source: Option<usize>,

        /// Save the formatted context to this directory as markdown
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Research {
            topic,
            queries,
            num_queries,
            category,
            depth,
            days_back,
            max_results,
            max_tokens_per_source,
            save_to,
        } => {
            let mut config = PipelineConfig::from_env()?;
            if let Some(category) = category {
                config.search_category = category.parse()?;
            }
            if let Some(depth) = depth {
                config.search_depth = depth.parse()?;
            }
            if let Some(days_back) = days_back {
                config.days_back = days_back;
            }
            if let Some(max_results) = max_results {
                config.max_results_per_query = max_results;
            }
            if let Some(max_tokens) = max_tokens_per_source {
                config.max_tokens_per_source = max_tokens;
            }
            config.validate()?;

            let search = TavilyClient::new(
                std::env::var("TAVILY_API_KEY").context("TAVILY_API_KEY is not set")?,
            );
            let llm = llm_from_env()?;

            let mut state = PipelineState::new(&topic);

            if queries.is_empty() {
                info!(num_queries, "generating search queries");
                let writer = QueryWriter::new(llm.clone());
                let generated = writer.generate_queries(&topic, num_queries).await?;
                state
                    .token_usage
                    .record(writer.model_name(), generated.usage);
                state.steps.push(PipelineStep::QueryWriter);
                state.search_queries = generated.search_queries;
            } else {
                state.search_queries = queries.into_iter().map(SearchQuery::new).collect();
            }

            for query in &state.search_queries {
                info!(query = %query.search_query, aspect = query.aspect.as_deref(), "search query");
            }

            let pipeline = WebSearchPipeline::new(search, llm, config);
            let state = pipeline.run(state).await?;

            let source_str = state
                .source_str
                .as_deref()
                .unwrap_or("Sources:");
            println!("{source_str}");

            println!();
            println!("Token usage:");
            for (model, usage) in state.token_usage.iter() {
                println!(
                    "  {model}: {} input / {} output",
                    usage.input_tokens, usage.output_tokens
                );
            }
            println!(
                "Estimated cost: ${:.4}",
                calculate_token_cost(&state.token_usage)
            );

            if let Some(dir) = save_to {
                let path = save_response(source_str, &dir)?;
                info!(path = %path.display(), "saved response");
            }
        }
    }

    Ok(())
}

/// Build the LLM client from `SCOUT_LLM_*` environment variables.
fn llm_from_env() -> Result<ChatClient> {
    let provider: LlmProvider = std::env::var("SCOUT_LLM_PROVIDER")
        .unwrap_or_else(|_| "groq".to_string())
        .parse()?;
    let model = std::env::var("SCOUT_LLM_MODEL")
        .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());
    let api_key = std::env::var("SCOUT_LLM_API_KEY").context("SCOUT_LLM_API_KEY is not set")?;

    let mut client = ChatClient::new(provider, model, api_key);
    if let Ok(base_url) = std::env::var("SCOUT_LLM_BASE_URL") {
        client = client.with_base_url(base_url);
    }
    Ok(client)
}

/// Write `response` to `dir` as a timestamped markdown file.
fn save_response(response: &str, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let timestamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
    let path = dir.join(format!("response-{timestamp}.md"));
    std::fs::write(&path, response)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
