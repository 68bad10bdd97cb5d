// Public modules
pub mod classifier;
pub mod config;
pub mod deals;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod feeds;
pub mod io;
pub mod mailer;
pub mod models;
pub mod normalizer;
pub mod render;
pub mod rules;
pub mod summarizer;

// Re-export commonly used types
pub use classifier::SectionClassifier;
pub use config::{Config, SmtpConfig};
pub use deals::{DealExtractor, DealLists};
pub use dedup::deduplicate;
pub use digest::DigestAssembler;
pub use error::{DeliveryError, SummaryError};
pub use feeds::{default_sources, FeedFetcher, FeedSource};
pub use io::{list_digest_files, load_digest, save_digest};
pub use mailer::Mailer;
pub use models::{Article, Deal, Digest, DigestFile, Geography, Section};
pub use normalizer::{normalize_all, RawEntry, RawTimestamp};
pub use render::DigestRenderer;
pub use rules::{ClassifierRules, DealRules, FallbackRules};
pub use summarizer::{
    FallbackReason, OpenAiClient, RuleBasedSummarizer, Summary, SummaryGenerator, TextGenerator,
};
