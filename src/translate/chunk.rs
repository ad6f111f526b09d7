/// Join the lines of a chunk into one request string.
///
/// There is no escaping: the separator must not occur inside the lines.
pub fn join<S: AsRef<str>>(chunk: &[S], separator: &str) -> String {
    chunk
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Split a translated string back into lines.
///
/// Translation tends to add or drop the whitespace around the separator
/// (e.g. "Hello ∞ everyone" -> "みなさん、こんにちは∞"), so the split uses the
/// trimmed separator and every piece is trimmed afterwards.
pub fn split(joined: &str, separator: &str) -> Vec<String> {
    let trimmed = separator.trim();
    let separator = if trimmed.is_empty() { separator } else { trimmed };

    joined
        .split(separator)
        .map(|piece| piece.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        let joined = join(&["Hello there.", "How are you?"], " ## ");
        assert_eq!(joined, "Hello there. ## How are you?");
    }

    #[test]
    fn test_split_absorbs_whitespace_drift() {
        assert_eq!(
            split("みなさん、こんにちは∞元気ですか", " ∞ "),
            vec!["みなさん、こんにちは", "元気ですか"]
        );
        assert_eq!(split("Hola ##  adiós  ", " ## "), vec!["Hola", "adiós"]);
    }

    #[test]
    fn test_join_then_split_restores_lines() {
        let lines = vec!["First line".to_string(), "  padded  ".to_string(), String::new(), "last".to_string()];
        for separator in [" ∞ ", " ## ", "$$", " ¶ "] {
            let restored = split(&join(&lines, separator), separator);
            let expected: Vec<String> = lines.iter().map(|l| l.trim().to_string()).collect();
            assert_eq!(restored, expected, "separator {:?}", separator);
        }
    }

    #[test]
    fn test_multiline_text_survives() {
        let lines = ["two\nlines", "one"];
        assert_eq!(split(&join(&lines, " ## "), " ## "), vec!["two\nlines", "one"]);
    }
}
