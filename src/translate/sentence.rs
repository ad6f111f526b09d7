//! Sentence grouping and chunk packing.
//!
//! Subtitle lines are first grouped into sentences (runs of lines that end on a
//! sentence-terminal character), then sentences are packed into chunks that fit
//! a translation request. A chunk boundary never falls inside a sentence.

use tracing::{debug, info};

use crate::config::EndingFamily;

/// Lines of one translation request, sentence boundaries already erased
pub type Chunk = Vec<String>;

/// Decides which lines close a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceEndings {
    /// Every line is a sentence on its own
    EveryLine,
    /// A line closes a sentence when its last character is in `chars`
    Chars { family: String, chars: Vec<char> },
}

impl SentenceEndings {
    pub fn from_family(family: &EndingFamily) -> Self {
        Self::Chars {
            family: family.name.clone(),
            chars: family.chars.chars().collect(),
        }
    }

    /// Pick the first family whose characters appear anywhere in the text.
    ///
    /// Subtitles with no recognisable punctuation fall back to [`SentenceEndings::EveryLine`].
    pub fn detect<S: AsRef<str>>(families: &[EndingFamily], lines: &[S]) -> Self {
        for family in families {
            let found = lines
                .iter()
                .any(|line| line.as_ref().chars().any(|c| family.chars.contains(c)));
            if found {
                info!("Using \"{}\" sentence endings \"{}\"", family.name, family.chars);
                return Self::from_family(family);
            }
        }

        info!("No known sentence endings found, every line ends a sentence");
        Self::EveryLine
    }

    pub fn closes(&self, line: &str) -> bool {
        match self {
            Self::EveryLine => true,
            // A single trailing newline does not hide the terminator
            Self::Chars { chars, .. } => line
                .strip_suffix('\n')
                .unwrap_or(line)
                .chars()
                .next_back()
                .is_some_and(|last| chars.contains(&last)),
        }
    }
}

/// Lazy sentence iterator, see [`group_into_sentences`]
pub struct Sentences<'e, I> {
    lines: I,
    endings: &'e SentenceEndings,
}

impl<I> Iterator for Sentences<'_, I>
where
    I: Iterator<Item = String>,
{
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut sentence = Vec::new();

        for line in self.lines.by_ref() {
            let closes = self.endings.closes(&line);
            sentence.push(line);
            if closes {
                return Some(sentence);
            }
        }

        // Whatever never saw a terminator becomes the final sentence
        if sentence.is_empty() { None } else { Some(sentence) }
    }
}

/// Group lines into sentences, holding only the current sentence in memory
pub fn group_into_sentences<I>(lines: I, endings: &SentenceEndings) -> Sentences<'_, I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    Sentences {
        lines: lines.into_iter(),
        endings,
    }
}

/// Lazy chunk iterator, see [`pack_into_chunks`]
pub struct Chunks<I> {
    sentences: I,
    char_limit: usize,
    separator_overhead: usize,
    carry: Option<Vec<String>>,
}

fn sentence_length(sentence: &[String], separator_overhead: usize) -> usize {
    sentence
        .iter()
        .map(|line| line.chars().count() + separator_overhead)
        .sum()
}

impl<I> Iterator for Chunks<I>
where
    I: Iterator<Item = Vec<String>>,
{
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::new();
        let mut char_count = 0;

        if let Some(sentence) = self.carry.take() {
            char_count = sentence_length(&sentence, self.separator_overhead);
            chunk.extend(sentence);
        }

        for sentence in self.sentences.by_ref() {
            let length = sentence_length(&sentence, self.separator_overhead);
            debug!(
                "Sentence with {} lines: {} (char count) + {} (sentence length) = {} (total)",
                sentence.len(), char_count, length, char_count + length
            );

            if !chunk.is_empty() && char_count + length > self.char_limit {
                debug!("Reached the {} char limit", self.char_limit);
                self.carry = Some(sentence);
                return Some(chunk);
            }

            char_count += length;
            chunk.extend(sentence);
        }

        if chunk.is_empty() { None } else { Some(chunk) }
    }
}

/// Pack sentences into chunks whose length, counting `separator_overhead` per line,
/// stays within `char_limit`.
///
/// The limit is soft: a sentence longer than the limit still becomes a chunk of its own.
pub fn pack_into_chunks<I>(sentences: I, char_limit: usize, separator_overhead: usize) -> Chunks<I::IntoIter>
where
    I: IntoIterator<Item = Vec<String>>,
{
    Chunks {
        sentences: sentences.into_iter(),
        char_limit,
        separator_overhead,
        carry: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sentence_endings;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn usual() -> SentenceEndings {
        SentenceEndings::from_family(&default_sentence_endings()[0])
    }

    #[test]
    fn test_groups_until_terminal_character() {
        let input = lines(&["This is an,", "example text!", "I am writing", "this now..."]);
        let endings = usual();
        let sentences: Vec<_> = group_into_sentences(input, &endings).collect();

        assert_eq!(sentences, vec![
            lines(&["This is an,", "example text!"]),
            lines(&["I am writing", "this now..."]),
        ]);
    }

    #[test]
    fn test_unterminated_tail_is_a_sentence() {
        let input = lines(&["Done.", "and then", "nothing"]);
        let endings = usual();
        let sentences: Vec<_> = group_into_sentences(input, &endings).collect();

        assert_eq!(sentences, vec![lines(&["Done."]), lines(&["and then", "nothing"])]);
    }

    #[test]
    fn test_grouping_is_deterministic_and_keeps_every_line() {
        let input = lines(&["a", "b.", "c", "d?", "e", "\"f\"", "g"]);
        let endings = usual();
        let first: Vec<_> = group_into_sentences(input.clone(), &endings).collect();
        let second: Vec<_> = group_into_sentences(input.clone(), &endings).collect();

        assert_eq!(first, second);
        assert_eq!(first.concat(), input);
    }

    #[test]
    fn test_every_line_endings() {
        let input = lines(&["no", "punctuation", "here"]);
        let sentences: Vec<_> = group_into_sentences(input, &SentenceEndings::EveryLine).collect();
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn test_detect_prefers_first_matching_family() {
        let families = default_sentence_endings();

        let english = SentenceEndings::detect(&families, &["Hello.", "World"]);
        assert!(matches!(english, SentenceEndings::Chars { ref family, .. } if family == "Usual"));

        let japanese = SentenceEndings::detect(&families, &["こんにちは。", "元気ですか"]);
        assert!(matches!(japanese, SentenceEndings::Chars { ref family, .. } if family == "Japanese"));
        assert!(japanese.closes("そうですね"));

        let bare = SentenceEndings::detect(&families, &["no endings", "at all"]);
        assert_eq!(bare, SentenceEndings::EveryLine);
    }

    #[test]
    fn test_empty_line_does_not_close_sentence() {
        assert!(!usual().closes(""));
    }

    #[test]
    fn test_terminator_before_trailing_newline_closes() {
        let endings = usual();
        assert!(endings.closes("Hello.\n"));
        assert!(!endings.closes("Hello\n"));
        assert!(!endings.closes("Hello.\n\n"));
        assert!(!endings.closes("\n"));

        let input = lines(&["Hello.\n", "Next line"]);
        let sentences: Vec<_> = group_into_sentences(input, &endings).collect();
        assert_eq!(sentences, vec![lines(&["Hello.\n"]), lines(&["Next line"])]);
    }

    #[test]
    fn test_packs_sentences_under_limit() {
        // "This is an," + "example text!" = 24 chars + 2 * 4 overhead = 32
        // "I am writing this now..." = 24 chars + 4 overhead = 28
        let sentences = vec![
            lines(&["This is an,", "example text!"]),
            lines(&["I am writing this now..."]),
        ];
        let chunks: Vec<_> = pack_into_chunks(sentences, 40, 4).collect();

        assert_eq!(chunks, vec![
            lines(&["This is an,", "example text!"]),
            lines(&["I am writing this now..."]),
        ]);
    }

    #[test]
    fn test_chunks_respect_limit_and_sentence_boundaries() {
        let input = lines(&["one two.", "three", "four!", "five six seven?", "eight", "nine."]);
        let endings = usual();
        let sentences: Vec<_> = group_into_sentences(input.clone(), &endings).collect();
        let chunks: Vec<_> = pack_into_chunks(sentences.clone(), 25, 5).collect();

        assert_eq!(chunks.concat(), input);
        for chunk in &chunks {
            assert!(sentence_length(chunk, 5) <= 25 || sentences.iter().any(|s| s == chunk));
        }
        // a boundary always lines up with a sentence boundary
        let mut offset = 0;
        let mut boundaries = vec![0];
        for sentence in &sentences {
            offset += sentence.len();
            boundaries.push(offset);
        }
        let mut position = 0;
        for chunk in &chunks {
            position += chunk.len();
            assert!(boundaries.contains(&position));
        }
    }

    #[test]
    fn test_oversized_sentence_is_its_own_chunk() {
        let long = "x".repeat(120);
        let sentences = vec![lines(&["short."]), vec![long.clone()], lines(&["tail."])];
        let chunks: Vec<_> = pack_into_chunks(sentences, 50, 5).collect();

        assert_eq!(chunks, vec![lines(&["short."]), vec![long], lines(&["tail."])]);
    }

    #[test]
    fn test_single_oversized_sentence() {
        let sentence = vec!["y".repeat(80), "z".repeat(80)];
        let chunks: Vec<_> = pack_into_chunks(vec![sentence.clone()], 50, 5).collect();
        assert_eq!(chunks, vec![sentence]);
    }

    #[test]
    fn test_no_sentences_no_chunks() {
        let chunks: Vec<Chunk> = pack_into_chunks(Vec::<Vec<String>>::new(), 50, 5).collect();
        assert!(chunks.is_empty());
    }
}
