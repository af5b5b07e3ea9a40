//! Prompt-context formatting for retrieved passages.
//!
//! Turns a ranked result list into the numbered, source-attributed block the
//! prompt layer appends to the model input. The block carries enough
//! provenance for the model to cite authors.

use crate::document::{Category, SearchResult};

fn header(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Craft) => "Relevant advice from plot & craft books:",
        Some(Category::Style) => "Relevant advice from style & language books:",
        Some(Category::Editorial) => {
            "Relevant advice from editorial & language books (Nora Gal, etc.):"
        }
        None => "Relevant advice from writing books:",
    }
}

/// Format retrieved passages as a numbered, source-attributed block.
///
/// Returns an empty string when there are no results, so callers can build a
/// prompt without a context section at all.
pub fn format_context(
    category: Option<Category>,
    results: &[SearchResult],
    max_chars: usize,
) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut parts = vec![header(category).to_string()];
    for (i, result) in results.iter().enumerate() {
        let chunk = &result.chunk;
        let mut line =
            format!("[{}] [{}] {} — «{}»", i + 1, chunk.category, chunk.author, chunk.book_title);
        if let Some(chapter) = &chunk.chapter {
            line.push_str(&format!(" ({chapter})"));
        }
        parts.push(line);
        parts.push(truncate_chars(&chunk.text, max_chars));
    }
    parts.join("\n")
}

/// Truncate to at most `max_chars` characters on a char boundary, appending
/// `...` when anything was cut. Byte slicing would panic on the Cyrillic
/// parts of the corpus.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => format!("{}...", &text[..byte_end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Category, Chunk};

    fn result(author: &str, book: &str, chapter: Option<&str>, text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: "craft_0".into(),
                text: text.into(),
                book_title: book.into(),
                author: author.into(),
                chapter: chapter.map(String::from),
                category: Category::Craft,
                embedding: Vec::new(),
            },
            distance: 0.1,
        }
    }

    #[test]
    fn empty_results_format_to_empty_string() {
        assert_eq!(format_context(None, &[], 500), "");
    }

    #[test]
    fn numbers_and_attributes_each_passage() {
        let results = vec![
            result("Lamott", "Bird by Bird", Some("Chapter 3"), "Show, don't tell."),
            result("King", "On Writing", None, "Kill your darlings."),
        ];
        let block = format_context(Some(Category::Craft), &results, 500);

        assert!(block.starts_with("Relevant advice from plot & craft books:"));
        assert!(block.contains("[1] [craft] Lamott — «Bird by Bird» (Chapter 3)"));
        assert!(block.contains("[2] [craft] King — «On Writing»"));
        assert!(block.contains("Show, don't tell."));
    }

    #[test]
    fn truncates_long_passages_on_char_boundaries() {
        let cyrillic = "пиши просто и ясно ".repeat(100);
        let results = vec![result("Гал", "Слово живое и мёртвое", None, &cyrillic)];
        let block = format_context(None, &results, 50);

        assert!(block.ends_with("..."));
        // 50 chars of Cyrillic is well under the byte length; the cut must
        // count characters, not bytes.
        let snippet = block.lines().last().unwrap();
        assert_eq!(snippet.chars().count(), 53);
    }

    #[test]
    fn generic_header_when_no_category() {
        let results = vec![result("Lamott", "Bird by Bird", None, "text")];
        assert!(format_context(None, &results, 500).starts_with("Relevant advice from writing"));
    }
}
