//! Static keyword and publisher tables.
//!
//! Keywords are matched as case-insensitive substrings of the lower-cased
//! `title + " " + excerpt` text. Publisher names are matched exactly against
//! the lower-cased, trimmed source name. The defaults are the newsletter's
//! Portuguese rule sets; tests and callers can inject alternates.

/// A set of lower-cased keywords matched by substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// `text` must already be lower-cased.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }
}

/// Exact-match set of lower-cased publisher names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherSet(Vec<String>);

impl PublisherSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, source: &str) -> bool {
        let source = source.trim().to_lowercase();
        self.0.iter().any(|n| *n == source)
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub partner: KeywordSet,
    pub deal: KeywordSet,
    pub digital_health: KeywordSet,
    pub health_tech: KeywordSet,
    pub domestic_publishers: PublisherSet,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            partner: KeywordSet::new(["conexa"]),
            deal: KeywordSet::new([
                "aquisição",
                "adquiriu",
                "rodada",
                "série a",
                "investimento",
            ]),
            digital_health: KeywordSet::new([
                "telemedicina",
                "coordenação de cuidado",
                "atenção primária",
                "cuidado integrado",
            ]),
            // "ia" is a bare substring and also hits words like "notícia".
            health_tech: KeywordSet::new([
                "ia",
                "inteligência artificial",
                "plataforma digital",
                "dispositivo",
                "wearable",
            ]),
            domestic_publishers: PublisherSet::new([
                "valor econômico",
                "folha",
                "o globo",
                "estadão",
                "neofeed",
                "brazil journal",
                "pipeline valor",
                "saúde digital news",
                "medicina s/a",
            ]),
        }
    }
}

/// One fallback summary template and the keywords that select it
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub keywords: KeywordSet,
    pub sentence: String,
}

impl FallbackRule {
    pub fn new<I, S>(keywords: I, sentence: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: KeywordSet::new(keywords),
            sentence: sentence.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackRules {
    /// Evaluated in order; the first match wins.
    pub rules: Vec<FallbackRule>,
    pub default_sentence: String,
}

impl FallbackRules {
    pub fn sentence_for(&self, text: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.keywords.matches(text))
            .map(|rule| rule.sentence.as_str())
            .unwrap_or(&self.default_sentence)
    }
}

impl Default for FallbackRules {
    fn default() -> Self {
        Self {
            rules: vec![
                FallbackRule::new(
                    ["custo", "sinistro", "sinistralidade"],
                    "Pressiona custo assistencial e força operadoras a rever modelo de cuidado.",
                ),
                FallbackRule::new(
                    ["telemedicina", "coordenação de cuidado"],
                    "Mostra avanço de modelos digitais e coordenação de cuidado para reduzir urgência e sinistro.",
                ),
                FallbackRule::new(
                    ["rodada", "investimento", "série a"],
                    "Sinaliza onde investidores acreditam que está o próximo motor de crescimento em saúde digital.",
                ),
                FallbackRule::new(
                    ["aquisição", "adquiriu"],
                    "Movimento de consolidação e verticalização do cuidado.",
                ),
            ],
            default_sentence:
                "Indica mudança estrutural no modelo de saúde e potencial impacto financeiro/regulatório."
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DealRules {
    pub global_outlets: PublisherSet,
    pub target_placeholder: String,
    pub acquirer_placeholder: String,
    pub amount_placeholder: String,
}

impl Default for DealRules {
    fn default() -> Self {
        Self {
            global_outlets: PublisherSet::new([
                "techcrunch",
                "wall street journal",
                "new york times",
                "financial times",
            ]),
            target_placeholder: "Alvo não mapeado".to_string(),
            acquirer_placeholder: "Investidor não mapeado".to_string(),
            amount_placeholder: "não divulgado".to_string(),
        }
    }
}
