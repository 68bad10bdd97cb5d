use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::classifier::SectionClassifier;
use crate::deals::DealExtractor;
use crate::models::{Article, Digest, DigestParts, Section};
use crate::summarizer::SummaryGenerator;

/// Cap on every section list and both deal lists
pub const MAX_SECTION_ITEMS: usize = 5;
pub const MAX_TOP_BULLETS: usize = 3;
const MAX_PARTNER_BLOCKS: usize = 2;
const PERIOD_DAYS: i64 = 7;

const DEAL_BULLET: &str =
    "Deals em saúde: consolidação e capital entrando em coordenação de cuidado.";

const PARTNER_PLACEHOLDER: &str = "Conexa em destaque esta semana: [preencher manualmente desempenho, novos contratos, indicadores de resolutividade, participação em eventos].";

const AGENDA: [&str; 2] = [
    "Próxima semana: acompanhar movimentação regulatória da ANS sobre custo assistencial e telemedicina.",
    "Eventos setoriais: acompanhar debates de atenção primária corporativa e coordenação de cuidado.",
];

const CLOSING: &str = "Custos assistenciais continuam pressionando operadoras e empregadores. \
Modelos digitais de coordenação de cuidado e pronto atendimento virtual \
estão migrando de promessa para estratégia financeira.";

/// Articles routed by section, in arrival order
#[derive(Debug, Default)]
struct SectionBuckets {
    domestic_panorama: Vec<Article>,
    global_panorama: Vec<Article>,
    digital_health: Vec<Article>,
    health_tech: Vec<Article>,
    deal: Vec<Article>,
    partner_spotlight: Vec<Article>,
}

impl SectionBuckets {
    fn push(&mut self, section: Section, article: Article) {
        let bucket = match section {
            Section::DomesticPanorama => &mut self.domestic_panorama,
            Section::GlobalPanorama => &mut self.global_panorama,
            Section::DigitalHealth => &mut self.digital_health,
            Section::HealthTech => &mut self.health_tech,
            Section::Deal => &mut self.deal,
            Section::PartnerSpotlight => &mut self.partner_spotlight,
        };
        bucket.push(article);
    }
}

/// Runs classification, summarization and deal extraction over one batch
/// and builds the `Digest`.
pub struct DigestAssembler {
    classifier: SectionClassifier,
    summaries: SummaryGenerator,
    deals: DealExtractor,
}

impl DigestAssembler {
    pub fn new(
        classifier: SectionClassifier,
        summaries: SummaryGenerator,
        deals: DealExtractor,
    ) -> Self {
        Self {
            classifier,
            summaries,
            deals,
        }
    }

    pub async fn assemble(&self, articles: Vec<Article>) -> Digest {
        self.assemble_at(articles, Utc::now()).await
    }

    /// Same as `assemble` with an explicit clock for the period label.
    ///
    /// Per-article summary failures are absorbed by the summarizer, so this
    /// always yields a complete digest. Dropping the future discards all
    /// partial work.
    pub async fn assemble_at(&self, articles: Vec<Article>, now: DateTime<Utc>) -> Digest {
        let sections: Vec<Section> = articles
            .iter()
            .map(|a| self.classifier.classify(a))
            .collect();

        let inputs: Vec<(String, String)> = articles
            .iter()
            .map(|a| (a.title.clone(), a.excerpt.clone()))
            .collect();
        let summaries = self.summaries.summarize_batch(&inputs).await;
        let fallback_count = summaries.iter().filter(|s| s.is_fallback()).count();

        let mut buckets = SectionBuckets::default();
        for ((mut article, section), summary) in articles.into_iter().zip(sections).zip(summaries) {
            article.section = Some(section);
            article.summary = Some(summary.into_text());
            buckets.push(section, article);
        }

        let deal_lists = self.deals.extract(&buckets.deal);

        let top_bullets = top_bullets(&buckets);
        let partner_blocks = partner_blocks(&buckets.partner_spotlight);

        info!(
            domestic = buckets.domestic_panorama.len(),
            global = buckets.global_panorama.len(),
            digital_health = buckets.digital_health.len(),
            health_tech = buckets.health_tech.len(),
            deals = buckets.deal.len(),
            partner = buckets.partner_spotlight.len(),
            fallback_summaries = fallback_count,
            "digest assembled"
        );

        Digest::new(DigestParts {
            period_label: period_label(now),
            top_bullets,
            domestic_panorama: truncated(buckets.domestic_panorama),
            global_panorama: truncated(buckets.global_panorama),
            digital_health: truncated(buckets.digital_health),
            health_tech: truncated(buckets.health_tech),
            deal_articles: truncated(buckets.deal),
            partner_spotlight: truncated(buckets.partner_spotlight),
            domestic_deals: truncated(deal_lists.domestic),
            global_deals: truncated(deal_lists.global),
            partner_blocks,
            agenda: AGENDA.iter().map(|s| s.to_string()).collect(),
            closing: CLOSING.to_string(),
        })
    }
}

/// "Semana de DD/MM/YYYY a DD/MM/YYYY" for the 7 days ending at `now`
pub fn period_label(now: DateTime<Utc>) -> String {
    let start = now - Duration::days(PERIOD_DAYS);
    format!(
        "Semana de {} a {}",
        start.format("%d/%m/%Y"),
        now.format("%d/%m/%Y")
    )
}

fn top_bullets(buckets: &SectionBuckets) -> Vec<String> {
    let mut bullets = Vec::with_capacity(MAX_TOP_BULLETS);

    if let Some(first) = buckets.domestic_panorama.first() {
        bullets.push(article_bullet(first));
    }
    if let Some(first) = buckets.digital_health.first() {
        bullets.push(article_bullet(first));
    }
    if !buckets.deal.is_empty() {
        bullets.push(DEAL_BULLET.to_string());
    }

    bullets
}

fn article_bullet(article: &Article) -> String {
    format!(
        "{} – {}",
        article.title,
        article.summary.as_deref().unwrap_or_default()
    )
}

fn partner_blocks(partner_articles: &[Article]) -> Vec<String> {
    if partner_articles.is_empty() {
        return vec![PARTNER_PLACEHOLDER.to_string()];
    }

    partner_articles
        .iter()
        .take(MAX_PARTNER_BLOCKS)
        .map(|a| {
            format!(
                "{} ({})\n- {}\n- Link: {}",
                a.title,
                a.source,
                a.summary.as_deref().unwrap_or_default(),
                a.url
            )
        })
        .collect()
}

fn truncated<T>(mut items: Vec<T>) -> Vec<T> {
    items.truncate(MAX_SECTION_ITEMS);
    items
}
