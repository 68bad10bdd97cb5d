use anyhow::{Context, Result};
use clap::Parser;
use shared::{Config, Mailer};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "send-digest")]
#[command(about = "Email a rendered Radar Saúde newsletter to a list of recipients")]
struct Args {
    /// Path to the newsletter Markdown file (if not provided, will list available files)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Recipient address (repeat for several)
    #[arg(short, long = "to", required = true)]
    to: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let newsletter = match args.file {
        Some(path) => path,
        None => {
            let config = Config::from_env()?;
            select_newsletter(&config.output_dir)?
        }
    };

    // Missing SMTP settings are fatal here, at the point of sending
    let mailer = Mailer::from_env()?;

    println!("📨 Sending {} to {} recipient(s)...", newsletter.display(), args.to.len());
    mailer
        .send(&newsletter, &args.to)
        .with_context(|| format!("Failed to send {}", newsletter.display()))?;

    println!("\n✅ Done! Newsletter delivered.");

    Ok(())
}

fn select_newsletter(output_dir: &Path) -> Result<PathBuf> {
    if !output_dir.exists() {
        anyhow::bail!(
            "Output directory {} does not exist. Run collect-digest first.",
            output_dir.display()
        );
    }

    // Find all rendered newsletters in the output directory
    let mut newsletters: Vec<PathBuf> = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read {}", output_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let is_markdown = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "md")
                .unwrap_or(false);
            let is_newsletter = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("newsletter-"))
                .unwrap_or(false);
            is_markdown && is_newsletter
        })
        .collect();

    if newsletters.is_empty() {
        anyhow::bail!("No newsletter files found in {}", output_dir.display());
    }

    // Sort by modification time (newest first)
    newsletters.sort_by_key(|path| {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(std::cmp::Reverse)
    });

    println!("Available newsletters:\n");
    for (i, file) in newsletters.iter().enumerate() {
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {}) {}", i + 1, filename);
    }

    print!("\nSelect file (1-{}): ", newsletters.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let selection: usize = input
        .trim()
        .parse()
        .context("Invalid selection. Please enter a number.")?;

    if selection < 1 || selection > newsletters.len() {
        anyhow::bail!(
            "Selection out of range. Please choose 1-{}",
            newsletters.len()
        );
    }

    Ok(newsletters[selection - 1].clone())
}
