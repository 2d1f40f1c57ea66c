use super::model::Article;

pub const MAX_PASSAGE_CHARS: usize = 500;

fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Turn one article into passages: `title\n\ncontent`, split on sentence boundaries
/// (`". "`) when longer than `max_chars`. Each sentence is re-terminated with `". "`.
pub fn chunk_article(article: &Article, max_chars: usize) -> Vec<String> {
    let full = normalize_text(&format!(
        "{}\n\n{}",
        article.title.trim(),
        article.content.trim()
    ));
    if full.chars().count() <= max_chars {
        return vec![full];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    for sentence in full.split(". ") {
        if current.chars().count() + sentence.chars().count() < max_chars {
            current.push_str(sentence);
            current.push_str(". ");
        } else {
            if !current.is_empty() {
                out.push(current.trim().to_string());
            }
            current = format!("{sentence}. ");
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// Passages for a whole corpus, in article order then chunk order.
pub fn chunk_corpus(articles: &[Article], max_chars: usize) -> Vec<String> {
    articles
        .iter()
        .flat_map(|a| chunk_article(a, max_chars))
        .filter(|p| !p.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content: &str) -> Article {
        Article {
            title: title.to_string(),
            content: content.to_string(),
            source: "test".to_string(),
            url: None,
            kind: "fact_check".to_string(),
        }
    }

    #[test]
    fn short_article_is_one_passage() {
        let out = chunk_article(&article("T", "Body."), MAX_PASSAGE_CHARS);
        assert_eq!(out, vec!["T\n\nBody.".to_string()]);
    }

    #[test]
    fn long_article_splits_on_sentences_under_limit() {
        let sentence = "x".repeat(90);
        let content = vec![sentence.clone(); 12].join(". ");
        let out = chunk_article(&article("Title", &content), 200);
        assert!(out.len() > 1);
        for p in &out {
            assert!(p.chars().count() < 200 + 2, "passage too long: {}", p.len());
            assert!(p.ends_with('.'));
        }
    }

    #[test]
    fn normalizes_line_endings() {
        let out = chunk_article(&article("T", "a\r\nb"), MAX_PASSAGE_CHARS);
        assert_eq!(out[0], "T\n\na\nb");
    }
}
