use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newsletter section an article is routed to. Exactly one per article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    DomesticPanorama,
    GlobalPanorama,
    DigitalHealth,
    HealthTech,
    Deal,
    PartnerSpotlight,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::DomesticPanorama,
        Section::GlobalPanorama,
        Section::DigitalHealth,
        Section::HealthTech,
        Section::Deal,
        Section::PartnerSpotlight,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::DomesticPanorama => "domestic-panorama",
            Section::GlobalPanorama => "global-panorama",
            Section::DigitalHealth => "digital-health",
            Section::HealthTech => "health-tech",
            Section::Deal => "deal",
            Section::PartnerSpotlight => "partner-spotlight",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A normalized news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Human-readable publisher name, e.g. "Folha"
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub excerpt: String,
    pub section: Option<Section>,
    pub summary: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
        url: impl Into<String>,
        excerpt: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            published_at,
            url: url.into(),
            excerpt: excerpt.into(),
            section: None,
            summary: None,
        }
    }

    /// Lower-cased `title + " " + excerpt`, the text every keyword rule matches against.
    pub fn matching_text(&self) -> String {
        matching_text(&self.title, &self.excerpt)
    }
}

pub fn matching_text(title: &str, excerpt: &str) -> String {
    format!("{} {}", title, excerpt).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Geography {
    DomesticOrRegional,
    Global,
}

impl Geography {
    pub fn label(&self) -> &'static str {
        match self {
            Geography::DomesticOrRegional => "Brasil/Latam",
            Geography::Global => "Global",
        }
    }
}

/// Deal record derived from a `deal` article. Target, acquirer and amount
/// are placeholders since nothing extracts entities from the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub target: String,
    pub acquirer: String,
    pub amount: String,
    pub thesis: String,
    pub geography: Geography,
}

/// The finished newsletter structure handed to rendering.
///
/// Built once by `DigestAssembler` and only readable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    period_label: String,
    top_bullets: Vec<String>,
    domestic_panorama: Vec<Article>,
    global_panorama: Vec<Article>,
    digital_health: Vec<Article>,
    health_tech: Vec<Article>,
    deal_articles: Vec<Article>,
    partner_spotlight: Vec<Article>,
    domestic_deals: Vec<Deal>,
    global_deals: Vec<Deal>,
    partner_blocks: Vec<String>,
    agenda: Vec<String>,
    closing: String,
}

/// Field-by-field input to `Digest::new`
#[derive(Debug, Default)]
pub(crate) struct DigestParts {
    pub period_label: String,
    pub top_bullets: Vec<String>,
    pub domestic_panorama: Vec<Article>,
    pub global_panorama: Vec<Article>,
    pub digital_health: Vec<Article>,
    pub health_tech: Vec<Article>,
    pub deal_articles: Vec<Article>,
    pub partner_spotlight: Vec<Article>,
    pub domestic_deals: Vec<Deal>,
    pub global_deals: Vec<Deal>,
    pub partner_blocks: Vec<String>,
    pub agenda: Vec<String>,
    pub closing: String,
}

impl Digest {
    pub(crate) fn new(parts: DigestParts) -> Self {
        Self {
            period_label: parts.period_label,
            top_bullets: parts.top_bullets,
            domestic_panorama: parts.domestic_panorama,
            global_panorama: parts.global_panorama,
            digital_health: parts.digital_health,
            health_tech: parts.health_tech,
            deal_articles: parts.deal_articles,
            partner_spotlight: parts.partner_spotlight,
            domestic_deals: parts.domestic_deals,
            global_deals: parts.global_deals,
            partner_blocks: parts.partner_blocks,
            agenda: parts.agenda,
            closing: parts.closing,
        }
    }

    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    pub fn top_bullets(&self) -> &[String] {
        &self.top_bullets
    }

    pub fn section(&self, section: Section) -> &[Article] {
        match section {
            Section::DomesticPanorama => &self.domestic_panorama,
            Section::GlobalPanorama => &self.global_panorama,
            Section::DigitalHealth => &self.digital_health,
            Section::HealthTech => &self.health_tech,
            Section::Deal => &self.deal_articles,
            Section::PartnerSpotlight => &self.partner_spotlight,
        }
    }

    pub fn domestic_deals(&self) -> &[Deal] {
        &self.domestic_deals
    }

    pub fn global_deals(&self) -> &[Deal] {
        &self.global_deals
    }

    pub fn partner_blocks(&self) -> &[String] {
        &self.partner_blocks
    }

    pub fn agenda(&self) -> &[String] {
        &self.agenda
    }

    pub fn closing(&self) -> &str {
        &self.closing
    }

    /// Every article across all section lists
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        Section::ALL
            .into_iter()
            .flat_map(move |section| self.section(section).iter())
    }
}

/// Snapshot of one digest run, as written to disk
#[derive(Debug, Serialize, Deserialize)]
pub struct DigestFile {
    pub version: String,
    pub created_at: String,
    pub digest: Digest,
}

impl DigestFile {
    pub fn new(digest: Digest) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Section::PartnerSpotlight).unwrap();
        assert_eq!(json, "\"partner-spotlight\"");
        assert_eq!(Section::DomesticPanorama.to_string(), "domestic-panorama");
    }

    #[test]
    fn test_matching_text_is_lowercased_title_and_excerpt() {
        let article = Article::new("Rodada SÉRIE A", "Folha", Utc::now(), "https://x", "Texto");
        assert_eq!(article.matching_text(), "rodada série a texto");
    }

    #[test]
    fn test_geography_labels() {
        assert_eq!(Geography::Global.label(), "Global");
        assert_eq!(Geography::DomesticOrRegional.label(), "Brasil/Latam");
    }
}
