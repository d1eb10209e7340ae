//! Character-window text splitter with overlap.
//!
//! Applies to document and website text; CSV rows are never split (each row
//! is exactly one chunk regardless of length).

/// Splits text into overlapping chunks of roughly `chunk_size` characters.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Split text into overlapping chunks, preferring sentence boundaries.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunk_size = self.chunk_size;
        let overlap = self.chunk_overlap;

        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        if total_chars == 0 {
            return chunks;
        }

        let mut start = 0;

        while start < total_chars {
            let end = (start + chunk_size).min(total_chars);
            let chunk_text: String = chars[start..end].iter().collect();

            // Try to break at a sentence boundary, except for the tail.
            let final_text = if end < total_chars {
                cut_at_sentence_boundary(&chunk_text)
            } else {
                chunk_text
            };

            let emitted_chars = final_text.chars().count();
            let trimmed = final_text.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }

            if end >= total_chars {
                break;
            }

            // Advance from where this chunk actually ended, so a sentence
            // cut never skips the text between the cut and the next window.
            start += emitted_chars.saturating_sub(overlap).max(1);
        }

        chunks
    }
}

/// Find a good sentence boundary near the end of the chunk.
fn cut_at_sentence_boundary(text: &str) -> String {
    let sentence_endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    // Only search the last 20% so chunks stay close to the target size.
    let search_start = text
        .char_indices()
        .nth(text.chars().count() * 80 / 100)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let search_text = &text[search_start..];

    for ending in sentence_endings.iter() {
        if let Some(pos) = search_text.rfind(ending) {
            let cut_pos = search_start + pos + ending.len();
            return text[..cut_pos].to_string();
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split("A single short sentence.");
        assert_eq!(chunks, vec!["A single short sentence.".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let splitter = TextSplitter::new(1000, 200);
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn long_text_is_split_with_overlap() {
        let splitter = TextSplitter::new(100, 20);
        let text = "This is a test sentence. ".repeat(40);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }

        // The step is size - overlap, so consecutive chunks share text.
        let first_tail: String = chunks[0].chars().rev().take(10).collect();
        assert!(!first_tail.is_empty());
    }

    #[test]
    fn splitting_covers_the_tail() {
        let splitter = TextSplitter::new(50, 10);
        let text = format!("{} FINAL_MARKER.", "word ".repeat(60));
        let chunks = splitter.split(&text);
        assert!(chunks.iter().any(|c| c.contains("FINAL_MARKER")));
    }

    #[test]
    fn sentence_cut_does_not_drop_following_text() {
        // A sentence boundary well before the window end, with no overlap:
        // the text after the cut must still land in a later chunk.
        let splitter = TextSplitter::new(100, 0);
        let text = format!("{}. LOSTMARKER {}", "x".repeat(84), "filler ".repeat(30));
        let chunks = splitter.split(&text);

        assert!(chunks.iter().any(|c| c.contains("LOSTMARKER")));
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let splitter = TextSplitter::new(100, 0);
        let text = format!("{}. End of story", "x".repeat(95));
        let chunks = splitter.split(&text);
        // First chunk should stop right after the period.
        assert!(chunks[0].ends_with('.'));
    }
}
