use anyhow::{Context, Result};
use chrono::DateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::DigestFile;

/// Save a digest snapshot as pretty JSON in `output_dir`
pub fn save_digest(data: &DigestFile, output_dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    let filepath = output_dir.join(filename);

    let json = serde_json::to_string_pretty(data).context("Failed to serialize digest")?;

    fs::write(&filepath, json).context("Failed to write digest file")?;

    Ok(filepath)
}

/// Load a digest snapshot from a JSON file
pub fn load_digest(filepath: &Path) -> Result<DigestFile> {
    if !filepath.exists() {
        anyhow::bail!("Digest file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read digest file: {}", filepath.display()))?;

    let data: DigestFile = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse digest JSON from {}. The file may be corrupted or not a digest file.",
            filepath.display()
        )
    })?;

    if data.version != "1.0" {
        anyhow::bail!(
            "Unsupported digest file version: {}. Expected 1.0. Please regenerate it with collect-digest.",
            data.version
        );
    }

    Ok(data)
}

/// All digest snapshots in `output_dir`, newest first
pub fn list_digest_files(output_dir: &Path) -> Result<Vec<(PathBuf, DigestFile)>> {
    let mut files = Vec::new();

    if output_dir.exists() {
        for entry in fs::read_dir(output_dir).context("Failed to read output directory")? {
            let path = entry?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_digest(&path) {
                    Ok(data) => files.push((path, data)),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable digest file"),
                }
            }
        }
    }

    files.sort_by(|a, b| {
        let time_a = DateTime::parse_from_rfc3339(&a.1.created_at).ok();
        let time_b = DateTime::parse_from_rfc3339(&b.1.created_at).ok();
        time_b.cmp(&time_a)
    });

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SectionClassifier;
    use crate::deals::DealExtractor;
    use crate::digest::DigestAssembler;
    use crate::summarizer::{RuleBasedSummarizer, SummaryGenerator};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("radar-io-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    async fn sample() -> DigestFile {
        let digest = DigestAssembler::new(
            SectionClassifier::default(),
            SummaryGenerator::offline(RuleBasedSummarizer::default()),
            DealExtractor::default(),
        )
        .assemble(Vec::new())
        .await;
        DigestFile::new(digest)
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = temp_dir("save");
        let data = sample().await;
        let path = save_digest(&data, &dir, "digest-test.json").unwrap();
        let loaded = load_digest(&path).unwrap();
        assert_eq!(loaded.digest, data.digest);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_digest(Path::new("/nonexistent/digest.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_list_skips_bad_files_and_wrong_versions() {
        let dir = temp_dir("list");
        let mut data = sample().await;
        save_digest(&data, &dir, "good.json").unwrap();
        data.version = "0.9".to_string();
        save_digest(&data, &dir, "old.json").unwrap();
        fs::write(dir.join("broken.json"), "{not json").unwrap();
        fs::write(dir.join("notes.md"), "ignored").unwrap();

        let files = list_digest_files(&dir).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("good.json"));
        let _ = fs::remove_dir_all(&dir);
    }
}
