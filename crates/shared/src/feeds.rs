use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::normalizer::{RawEntry, RawTimestamp};

/// A syndicated feed and the publisher name its articles are credited to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Curated health-market feeds, domestic first
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("Valor Econômico", "https://valor.globo.com/rss/valor/empresas/"),
        FeedSource::new(
            "Folha",
            "https://feeds.folha.uol.com.br/equilibrioesaude/rss091.xml",
        ),
        FeedSource::new("O Globo", "https://oglobo.globo.com/rss/saude/"),
        FeedSource::new(
            "Estadão",
            "https://www.estadao.com.br/arc/outboundfeeds/feeds/rss/sections/saude/",
        ),
        FeedSource::new("NeoFeed", "https://neofeed.com.br/feed/"),
        FeedSource::new("Brazil Journal", "https://braziljournal.com/feed/"),
        FeedSource::new("Saúde Digital News", "https://saudedigitalnews.com.br/feed/"),
        FeedSource::new("Medicina S/A", "https://medicinasa.com.br/feed/"),
        FeedSource::new("TechCrunch", "https://techcrunch.com/category/health/feed/"),
        FeedSource::new("Fierce Healthcare", "https://www.fiercehealthcare.com/rss/xml"),
    ]
}

pub struct FeedFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl FeedFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; RadarSaude/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(4));

        Ok(Self { client, semaphore })
    }

    /// Fetch one source and return its entries published after `since`
    pub async fn fetch_source(
        &self,
        source: &FeedSource,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawEntry>> {
        let _permit = self.semaphore.acquire().await?;

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        parse_feed(&source.name, &bytes, since)
    }

    /// Fetch every source concurrently. A failing source is logged and
    /// contributes nothing; output keeps source order.
    pub async fn fetch_all(&self, sources: &[FeedSource], since: DateTime<Utc>) -> Vec<RawEntry> {
        let per_source: Vec<Vec<RawEntry>> = stream::iter(sources)
            .map(|source| async move {
                match self.fetch_source(source, since).await {
                    Ok(entries) => {
                        info!(source = %source.name, entries = entries.len(), "feed fetched");
                        entries
                    }
                    Err(e) => {
                        warn!(source = %source.name, url = %source.url, error = %e, "feed failed, skipping");
                        Vec::new()
                    }
                }
            })
            .buffered(sources.len().max(1))
            .collect()
            .await;

        per_source.into_iter().flatten().collect()
    }
}

/// Parse an RSS/Atom/JSON feed body into raw entries credited to `source_name`.
/// Entries with a known publication time before `since` are skipped.
pub fn parse_feed(source_name: &str, body: &[u8], since: DateTime<Utc>) -> Result<Vec<RawEntry>> {
    let feed = feed_rs::parser::parse(body).context("Failed to parse RSS/Atom feed")?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let published = entry.published.or(entry.updated);
            if matches!(published, Some(date) if date < since) {
                return None;
            }

            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));

            Some(RawEntry {
                source: source_name.to_string(),
                title: entry.title.map(|t| t.content),
                link: entry.links.first().map(|l| l.href.clone()),
                summary,
                published: published.map(RawTimestamp::Parsed),
            })
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Saúde</title>
    <link>https://folha.example</link>
    <description>Notícias</description>
    <item>
      <title>Hospital amplia telemedicina</title>
      <link>https://folha.example/1</link>
      <description>&lt;p&gt;Atendimento remoto&lt;/p&gt;</description>
      <pubDate>Wed, 22 Oct 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Matéria antiga</title>
      <link>https://folha.example/2</link>
      <pubDate>Mon, 01 Sep 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Sem data</title>
      <link>https://folha.example/3</link>
    </item>
  </channel>
</rss>"#;

    fn since() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rss_filters_old_entries() {
        let entries = parse_feed("Folha", RSS.as_bytes(), since()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.source, "Folha");
        assert_eq!(first.title.as_deref(), Some("Hospital amplia telemedicina"));
        assert_eq!(first.link.as_deref(), Some("https://folha.example/1"));
        assert_eq!(
            first.published,
            Some(RawTimestamp::Parsed(
                Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap()
            ))
        );

        assert_eq!(entries[1].title.as_deref(), Some("Sem data"));
        assert!(entries[1].published.is_none());
    }

    /// Serves `RSS` on `/rss` and plain text elsewhere until the test ends
    async fn serve_feeds() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let body = if request.starts_with("GET /rss ") {
                        RSS
                    } else {
                        "not a feed"
                    };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failing_sources_and_keeps_order() {
        let base = serve_feeds().await;
        let sources = vec![
            FeedSource::new("Folha", format!("{}/rss", base)),
            FeedSource::new("Fora do ar", "http://127.0.0.1:1/"),
            FeedSource::new("Lixo", format!("{}/junk", base)),
            FeedSource::new("O Globo", format!("{}/rss", base)),
        ];

        let entries = FeedFetcher::new().unwrap().fetch_all(&sources, since()).await;

        let got: Vec<(&str, Option<&str>)> = entries
            .iter()
            .map(|e| (e.source.as_str(), e.title.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Folha", Some("Hospital amplia telemedicina")),
                ("Folha", Some("Sem data")),
                ("O Globo", Some("Hospital amplia telemedicina")),
                ("O Globo", Some("Sem data")),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_source_reports_unparsable_body() {
        let base = serve_feeds().await;
        let source = FeedSource::new("Lixo", format!("{}/junk", base));
        assert!(FeedFetcher::new()
            .unwrap()
            .fetch_source(&source, since())
            .await
            .is_err());
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_feed("X", b"not a feed", since()).is_err());
    }

    #[test]
    fn test_default_sources_have_names_and_urls() {
        let sources = default_sources();
        assert!(!sources.is_empty());
        assert!(sources
            .iter()
            .all(|s| !s.name.is_empty() && s.url.starts_with("https://")));
    }
}
