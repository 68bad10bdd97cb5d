use std::collections::HashSet;
use tracing::debug;

use crate::models::Article;

/// Key two articles must share to count as the same story
pub fn dedup_key(article: &Article) -> (String, String) {
    (
        article.title.trim().to_lowercase(),
        article.source.trim().to_lowercase(),
    )
}

/// Keep the first article for each (title, source) key, in first-seen order.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut seen = HashSet::new();

    let unique: Vec<Article> = articles
        .into_iter()
        .filter(|article| seen.insert(dedup_key(article)))
        .collect();

    let removed = total - unique.len();
    if removed > 0 {
        debug!(removed, kept = unique.len(), "removed duplicate articles");
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, source: &str, url: &str) -> Article {
        Article::new(title, source, Utc::now(), url, "")
    }

    #[test]
    fn test_case_and_whitespace_variants_collapse() {
        let articles = vec![
            article("Operadora amplia rede", "Folha", "https://f.com/1"),
            article("  OPERADORA AMPLIA REDE ", "folha", "https://f.com/2"),
        ];
        let unique = deduplicate(articles);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].url, "https://f.com/1");
    }

    #[test]
    fn test_same_title_different_source_is_kept() {
        let articles = vec![
            article("Operadora amplia rede", "Folha", "https://f.com/1"),
            article("Operadora amplia rede", "Estadão", "https://e.com/1"),
        ];
        assert_eq!(deduplicate(articles).len(), 2);
    }

    #[test]
    fn test_first_occurrence_order_is_preserved() {
        let articles = vec![
            article("B", "s", "1"),
            article("A", "s", "2"),
            article("b", "S", "3"),
            article("C", "s", "4"),
        ];
        let urls: Vec<String> = deduplicate(articles).into_iter().map(|a| a.url).collect();
        assert_eq!(urls, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_idempotent_and_never_grows() {
        let articles = vec![
            article("X", "a", "1"),
            article("x ", "A", "2"),
            article("Y", "a", "3"),
        ];
        let once = deduplicate(articles.clone());
        assert!(once.len() <= articles.len());
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
