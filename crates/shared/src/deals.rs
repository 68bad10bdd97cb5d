use crate::models::{Article, Deal, Geography};
use crate::rules::DealRules;

/// Deals split by geography, each in the order of the source articles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealLists {
    pub domestic: Vec<Deal>,
    pub global: Vec<Deal>,
}

/// Turns `deal` articles into deal records. Only the geography is derived
/// (from the source outlet); target, acquirer and amount stay placeholders.
#[derive(Debug, Clone, Default)]
pub struct DealExtractor {
    rules: DealRules,
}

impl DealExtractor {
    pub fn new(rules: DealRules) -> Self {
        Self { rules }
    }

    pub fn extract_one(&self, article: &Article) -> Deal {
        let geography = if self.rules.global_outlets.contains(&article.source) {
            Geography::Global
        } else {
            Geography::DomesticOrRegional
        };

        Deal {
            target: self.rules.target_placeholder.clone(),
            acquirer: self.rules.acquirer_placeholder.clone(),
            amount: self.rules.amount_placeholder.clone(),
            thesis: article.summary.clone().unwrap_or_default(),
            geography,
        }
    }

    pub fn extract(&self, articles: &[Article]) -> DealLists {
        let mut lists = DealLists::default();
        for deal in articles.iter().map(|a| self.extract_one(a)) {
            match deal.geography {
                Geography::Global => lists.global.push(deal),
                Geography::DomesticOrRegional => lists.domestic.push(deal),
            }
        }
        lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deal_article(title: &str, source: &str, summary: &str) -> Article {
        let mut article = Article::new(title, source, Utc::now(), "https://x.com", "");
        article.summary = Some(summary.to_string());
        article
    }

    #[test]
    fn test_techcrunch_deal_is_global() {
        let extractor = DealExtractor::default();
        let deal = extractor.extract_one(&deal_article(
            "Operadora X anuncia rodada Série A de R$50M",
            "TechCrunch",
            "Sinal de investidores.",
        ));
        assert_eq!(deal.geography, Geography::Global);
        assert_eq!(deal.thesis, "Sinal de investidores.");
        assert_eq!(deal.target, "Alvo não mapeado");
        assert_eq!(deal.acquirer, "Investidor não mapeado");
        assert_eq!(deal.amount, "não divulgado");
    }

    #[test]
    fn test_unknown_outlet_is_domestic_or_regional() {
        let extractor = DealExtractor::default();
        let deal = extractor.extract_one(&deal_article("Rede adquiriu clínica", "NeoFeed", "t"));
        assert_eq!(deal.geography, Geography::DomesticOrRegional);
    }

    #[test]
    fn test_extract_splits_and_keeps_relative_order() {
        let extractor = DealExtractor::default();
        let articles = vec![
            deal_article("a", "Financial Times", "1"),
            deal_article("b", "Brazil Journal", "2"),
            deal_article("c", "financial times", "3"),
            deal_article("d", "Valor Econômico", "4"),
        ];
        let lists = extractor.extract(&articles);
        let global: Vec<&str> = lists.global.iter().map(|d| d.thesis.as_str()).collect();
        let domestic: Vec<&str> = lists.domestic.iter().map(|d| d.thesis.as_str()).collect();
        assert_eq!(global, vec!["1", "3"]);
        assert_eq!(domestic, vec!["2", "4"]);
    }

    #[test]
    fn test_custom_outlets() {
        let rules = DealRules {
            global_outlets: crate::rules::PublisherSet::new(["Reuters"]),
            ..DealRules::default()
        };
        let extractor = DealExtractor::new(rules);
        let lists = extractor.extract(&[deal_article("a", "Reuters", "x")]);
        assert_eq!(lists.global.len(), 1);
        assert!(lists.domestic.is_empty());
    }
}
