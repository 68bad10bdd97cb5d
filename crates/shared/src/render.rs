use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Article, Deal, Digest, Section};

const RULE: &str = "--------------------------------------------------";

pub struct DigestRenderer;

impl DigestRenderer {
    fn dated_item(article: &Article) -> String {
        format!(
            "• {} – {}, {}\n  - {}\n",
            article.title,
            article.source,
            article.published_at.format("%d/%m/%Y"),
            article.summary.as_deref().unwrap_or_default()
        )
    }

    fn linked_item(article: &Article) -> String {
        format!(
            "• {} – {}\n  - {}\n  - Link: {}\n",
            article.title,
            article.source,
            article.summary.as_deref().unwrap_or_default(),
            article.url
        )
    }

    fn deal_item(deal: &Deal) -> String {
        format!(
            "- Alvo: {} | Comprador/Investidor: {} | Valor: {}\n  Tese: {}\n",
            deal.target, deal.acquirer, deal.amount, deal.thesis
        )
    }

    /// Render the digest into the newsletter's plain-text/Markdown layout
    pub fn render_markdown(digest: &Digest) -> String {
        let mut md = String::new();

        md.push_str(&format!("[RADAR SAÚDE | {} ]\n\n", digest.period_label()));

        md.push_str("1. O QUE IMPORTA ESTA SEMANA\n");
        for bullet in digest.top_bullets() {
            md.push_str(&format!("- {}\n", bullet));
        }

        md.push_str(&format!("\n{}\n2. PANORAMA SAÚDE\n2.1 Brasil\n", RULE));
        for article in digest.section(Section::DomesticPanorama) {
            md.push_str(&Self::dated_item(article));
        }
        md.push_str("\n2.2 Internacional\n");
        for article in digest.section(Section::GlobalPanorama) {
            md.push_str(&Self::dated_item(article));
        }

        md.push_str(&format!(
            "\n{}\n3. SAÚDE DIGITAL & MODELOS DE CUIDADO\n",
            RULE
        ));
        for article in digest.section(Section::DigitalHealth) {
            md.push_str(&Self::linked_item(article));
        }

        md.push_str(&format!("\n{}\n4. TECNOLOGIA EM SAÚDE / IA / PRODUTO\n", RULE));
        for article in digest.section(Section::HealthTech) {
            md.push_str(&Self::linked_item(article));
        }

        md.push_str(&format!("\n{}\n5. DEALS DA SEMANA\nBRASIL / LATAM\n", RULE));
        for deal in digest.domestic_deals() {
            md.push_str(&Self::deal_item(deal));
        }
        md.push_str("\nGLOBAL\n");
        for deal in digest.global_deals() {
            md.push_str(&Self::deal_item(deal));
        }

        md.push_str(&format!("\n{}\n6. CONEXA NA SEMANA\n", RULE));
        for block in digest.partner_blocks() {
            md.push_str(&format!("{}\n\n", block));
        }

        md.push_str(&format!("{}\n7. AGENDA E PRÓXIMOS GATILHOS\n", RULE));
        for item in digest.agenda() {
            md.push_str(&format!("- {}\n", item));
        }

        md.push_str(&format!("\n{}\nFECHANDO\n{}\n", RULE, digest.closing()));

        md
    }

    pub fn filename(date: DateTime<Utc>) -> String {
        format!("newsletter-{}.md", date.format("%Y-%m-%d"))
    }

    pub fn save_markdown(content: &str, output_dir: &Path, date: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let filepath = output_dir.join(Self::filename(date));

        fs::write(&filepath, content).context("Failed to write newsletter file")?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SectionClassifier;
    use crate::deals::DealExtractor;
    use crate::digest::DigestAssembler;
    use crate::summarizer::{RuleBasedSummarizer, SummaryGenerator};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 27, 9, 0, 0).unwrap()
    }

    async fn digest(articles: Vec<Article>) -> Digest {
        DigestAssembler::new(
            SectionClassifier::default(),
            SummaryGenerator::offline(RuleBasedSummarizer::default()),
            DealExtractor::default(),
        )
        .assemble_at(articles, now())
        .await
    }

    #[tokio::test]
    async fn test_empty_digest_keeps_every_heading() {
        let md = DigestRenderer::render_markdown(&digest(Vec::new()).await);
        assert!(md.starts_with("[RADAR SAÚDE | Semana de 20/10/2025 a 27/10/2025 ]"));
        for heading in [
            "1. O QUE IMPORTA ESTA SEMANA",
            "2.1 Brasil",
            "2.2 Internacional",
            "3. SAÚDE DIGITAL & MODELOS DE CUIDADO",
            "4. TECNOLOGIA EM SAÚDE / IA / PRODUTO",
            "BRASIL / LATAM",
            "GLOBAL",
            "6. CONEXA NA SEMANA",
            "7. AGENDA E PRÓXIMOS GATILHOS",
            "FECHANDO",
        ] {
            assert!(md.contains(heading), "missing heading {heading}");
        }
        assert!(md.contains("Conexa em destaque esta semana"));
    }

    #[tokio::test]
    async fn test_items_render_with_date_link_and_deal_fields() {
        let date = Utc.with_ymd_and_hms(2025, 10, 22, 15, 0, 0).unwrap();
        let articles = vec![
            Article::new("ANS publica norma", "Folha", date, "https://f.com/1", ""),
            Article::new("Hospital amplia telemedicina", "Reuters", date, "https://r.com/2", ""),
            Article::new("Rodada para healthtech", "TechCrunch", date, "https://t.com/3", ""),
        ];
        let md = DigestRenderer::render_markdown(&digest(articles).await);

        assert!(md.contains("• ANS publica norma – Folha, 22/10/2025\n"));
        assert!(md.contains("• Hospital amplia telemedicina – Reuters\n"));
        assert!(md.contains("  - Link: https://r.com/2\n"));
        assert!(md.contains(
            "- Alvo: Alvo não mapeado | Comprador/Investidor: Investidor não mapeado | Valor: não divulgado\n"
        ));
    }

    #[test]
    fn test_filename_uses_date() {
        assert_eq!(DigestRenderer::filename(now()), "newsletter-2025-10-27.md");
    }
}
