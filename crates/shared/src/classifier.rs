use crate::models::{Article, Section};
use crate::rules::{ClassifierRules, KeywordSet, PublisherSet};

/// What a rule looks at
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Any keyword appears in the lower-cased title + excerpt
    TextContains(KeywordSet),
    /// The trimmed, lower-cased source is one of the publishers
    SourceIn(PublisherSet),
}

impl Predicate {
    fn matches(&self, text: &str, source: &str) -> bool {
        match self {
            Predicate::TextContains(keywords) => keywords.matches(text),
            Predicate::SourceIn(publishers) => publishers.contains(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub predicate: Predicate,
    pub section: Section,
}

impl Rule {
    pub fn new(predicate: Predicate, section: Section) -> Self {
        Self { predicate, section }
    }
}

/// Ordered first-match classifier.
///
/// Rules are checked top to bottom and the first matching rule decides the
/// section; keyword sets may overlap and the order resolves it. When nothing
/// matches, `default` is returned, so every article gets exactly one section.
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    rules: Vec<Rule>,
    default: Section,
}

impl SectionClassifier {
    pub fn new(rules: &ClassifierRules) -> Self {
        Self::from_rules(
            vec![
                Rule::new(
                    Predicate::TextContains(rules.partner.clone()),
                    Section::PartnerSpotlight,
                ),
                Rule::new(Predicate::TextContains(rules.deal.clone()), Section::Deal),
                Rule::new(
                    Predicate::TextContains(rules.digital_health.clone()),
                    Section::DigitalHealth,
                ),
                Rule::new(
                    Predicate::TextContains(rules.health_tech.clone()),
                    Section::HealthTech,
                ),
                Rule::new(
                    Predicate::SourceIn(rules.domestic_publishers.clone()),
                    Section::DomesticPanorama,
                ),
            ],
            Section::GlobalPanorama,
        )
    }

    pub fn from_rules(rules: Vec<Rule>, default: Section) -> Self {
        Self { rules, default }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn classify(&self, article: &Article) -> Section {
        let text = article.matching_text();
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(&text, &article.source))
            .map(|rule| rule.section)
            .unwrap_or(self.default)
    }
}

impl Default for SectionClassifier {
    fn default() -> Self {
        Self::new(&ClassifierRules::default())
    }
}
