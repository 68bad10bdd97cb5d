use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use shared::{
    deduplicate, default_sources, normalize_all, ClassifierRules, Config, DealExtractor, DealRules,
    DigestAssembler, DigestFile, DigestRenderer, FallbackRules, FeedFetcher, Geography,
    RuleBasedSummarizer, Section, SectionClassifier, SummaryGenerator,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collect-digest")]
#[command(about = "Collect health-market news from feeds and build the weekly Radar Saúde digest")]
struct Args {
    /// Number of days to look back for articles
    #[arg(short, long, default_value = "7")]
    days: i64,

    /// Directory for the rendered newsletter and digest snapshot
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore OPENAI_API_KEY and use rule-based summaries only
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if args.offline {
        config.openai_api_key = None;
    }
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());

    let now = Utc::now();
    let since = now - Duration::days(args.days);

    println!("\n📡 Fetching feeds...");
    let sources = default_sources();
    let fetcher = FeedFetcher::new()?;
    let raw_entries = fetcher.fetch_all(&sources, since).await;
    println!(
        "✓ Retrieved {} entries from {} sources",
        raw_entries.len(),
        sources.len()
    );

    let articles = deduplicate(normalize_all(&raw_entries, now));
    info!(
        entries = raw_entries.len(),
        articles = articles.len(),
        days = args.days,
        "articles normalized"
    );
    println!("✓ {} unique articles after normalization", articles.len());

    if articles.is_empty() {
        println!("No articles found in the past {} days.", args.days);
    }

    let summaries = SummaryGenerator::from_config(
        &config,
        RuleBasedSummarizer::new(FallbackRules::default()),
    )?;
    if summaries.is_offline() {
        println!("\n🧾 Summarizing with keyword rules (no OPENAI_API_KEY)...");
    } else {
        println!("\n🤖 Summarizing articles with {}...", config.openai_model);
        println!("  (This may take a minute...)");
    }

    let assembler = DigestAssembler::new(
        SectionClassifier::new(&ClassifierRules::default()),
        summaries,
        DealExtractor::new(DealRules::default()),
    );
    let digest = assembler.assemble_at(articles, now).await;

    for section in Section::ALL {
        println!("  {:<18} {}", section.slug(), digest.section(section).len());
    }
    println!(
        "  deals: {} {}, {} {}",
        Geography::DomesticOrRegional.label(),
        digest.domestic_deals().len(),
        Geography::Global.label(),
        digest.global_deals().len()
    );

    println!("\n📝 Rendering newsletter...");
    let markdown = DigestRenderer::render_markdown(&digest);
    let md_path = DigestRenderer::save_markdown(&markdown, &output_dir, now)
        .context("Failed to save newsletter")?;

    let snapshot_name = format!("digest-{}.json", now.format("%Y-%m-%d"));
    let json_path = shared::save_digest(&DigestFile::new(digest), &output_dir, &snapshot_name)
        .context("Failed to save digest snapshot")?;

    info!(newsletter = %md_path.display(), snapshot = %json_path.display(), "digest written");

    println!("\n✅ Newsletter saved to: {}", md_path.display());
    println!("   Digest snapshot: {}", json_path.display());

    Ok(())
}
