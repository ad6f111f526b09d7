use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SubtitleConfig;
use crate::error::{Result, SubtransError};
use super::SubtitleEvent;

static OPEN_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(?:\{[^}]*\})+").unwrap());

static CLOSE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(?:\{[^}]*\})+$").unwrap());

/// Override blocks at the very start and end of an event's raw text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub open: String,
    pub close: String,
}

impl InlineStyle {
    pub fn extract(raw: &str) -> Self {
        let open = OPEN_STYLE.find(raw).map_or("", |m| m.as_str());
        // A text made only of override blocks travels whole as the line itself
        if open.len() == raw.len() {
            return Self::default();
        }
        let close = CLOSE_STYLE.find(raw).map_or("", |m| m.as_str());

        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

/// Put short multi-line text on one line
pub fn merge_short_lines(text: &str, char_limit: usize) -> String {
    if text.chars().count() < char_limit {
        text.replace('\n', " ").replace(" ,", ",")
    } else {
        text.to_string()
    }
}

pub fn to_hard_breaks(text: &str) -> String {
    text.replace('\n', "\\N")
}

/// Render text smaller and half transparent on its own line
pub fn style_down(text: &str, scale: u32) -> String {
    format!(
        "\\N{{\\fscx{scale}\\fscy{scale}\\alpha&H80&}}{text}{{\\fscx100\\fscy100\\alpha&H00&}}"
    )
}

/// Composes the final text of every event from the main and secondary streams
#[derive(Debug, Clone)]
pub struct Projector {
    pub line_char_limit: usize,
    /// Percent size of the secondary text
    pub secondary_scale: u32,
    /// Show the secondary stream at all
    pub merge: bool,
}

impl Projector {
    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self {
            line_char_limit: config.line_char_limit,
            secondary_scale: config.secondary_scale,
            merge: config.merge,
        }
    }

    /// Smaller text fits more characters on a line
    pub fn secondary_char_limit(&self) -> usize {
        self.line_char_limit * 100 / self.secondary_scale.max(1) as usize
    }

    pub fn compose(&self, style: &InlineStyle, main: &str, secondary: &str) -> String {
        let main = to_hard_breaks(&merge_short_lines(main, self.line_char_limit));
        let secondary = if self.merge {
            let merged = merge_short_lines(secondary, self.secondary_char_limit());
            style_down(&to_hard_breaks(&merged), self.secondary_scale)
        } else {
            String::new()
        };

        format!("{}{}{}{}", style.open, main, secondary, style.close)
    }

    /// Rewrite every event's text; all slices must line up with the events
    pub fn project(
        &self,
        events: &mut [SubtitleEvent],
        styles: &[InlineStyle],
        main: &[String],
        secondary: &[String],
    ) -> Result<()> {
        let count = events.len();
        if styles.len() != count || main.len() != count || secondary.len() != count {
            return Err(SubtransError::Subtitle(format!(
                "Cannot project {} main and {} secondary lines onto {} events",
                main.len(),
                secondary.len(),
                count
            )));
        }

        for (((event, style), main), secondary) in events.iter_mut().zip(styles).zip(main).zip(secondary) {
            event.text = self.compose(style, main, secondary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector(merge: bool) -> Projector {
        Projector {
            line_char_limit: 30,
            secondary_scale: 80,
            merge,
        }
    }

    #[test]
    fn test_extract_style() {
        let style = InlineStyle::extract(r"{\an8}Hello world{\i1}");
        assert_eq!(style.open, r"{\an8}");
        assert_eq!(style.close, r"{\i1}");

        let style = InlineStyle::extract(r"{\an8}{\b1}Hi");
        assert_eq!(style.open, r"{\an8}{\b1}");
        assert_eq!(style.close, "");

        assert_eq!(InlineStyle::extract("plain"), InlineStyle::default());
        assert_eq!(InlineStyle::extract(r"{\p1}"), InlineStyle::default());
    }

    #[test]
    fn test_style_only_event_is_emitted_once() {
        let event = SubtitleEvent::new(0, 1000, r"{\an8}");
        let style = InlineStyle::extract(&event.text);
        let line = event.plaintext();
        assert_eq!(line, r"{\an8}");

        assert_eq!(projector(false).compose(&style, &line, &line), r"{\an8}");
    }

    #[test]
    fn test_compose_keeps_style_spans() {
        let style = InlineStyle::extract(r"{\an8}Hello world{\i1}");
        assert_eq!(
            projector(false).compose(&style, "Hola mundo", "Hello world"),
            r"{\an8}Hola mundo{\i1}"
        );
    }

    #[test]
    fn test_compose_dual_display() {
        let style = InlineStyle::extract(r"{\an8}Hello world{\i1}");
        assert_eq!(
            projector(true).compose(&style, "Hola mundo", "Hello world"),
            r"{\an8}Hola mundo\N{\fscx80\fscy80\alpha&H80&}Hello world{\fscx100\fscy100\alpha&H00&}{\i1}"
        );
    }

    #[test]
    fn test_merge_short_lines() {
        assert_eq!(merge_short_lines("Well\n, fine", 30), "Well, fine");
        assert_eq!(merge_short_lines("A rather long first line\nand a second", 30), "A rather long first line\nand a second");
    }

    #[test]
    fn test_secondary_threshold_is_scaled() {
        let projector = projector(true);
        assert_eq!(projector.secondary_char_limit(), 37);

        // 33 chars: too long for the main stream, short enough for the secondary one
        let text = "Thirty four characters\nright here";
        let composed = projector.compose(&InlineStyle::default(), text, text);
        assert!(composed.starts_with("Thirty four characters\\Nright here\\N"));
        assert!(composed.contains("}Thirty four characters right here{"));
    }

    #[test]
    fn test_project_checks_alignment() {
        let mut events = vec![SubtitleEvent::new(0, 1000, "Hi")];
        let result = projector(false).project(&mut events, &[InlineStyle::default()], &[], &[]);
        assert!(matches!(result, Err(SubtransError::Subtitle(_))));

        projector(false)
            .project(&mut events, &[InlineStyle::default()], &["Hola".to_string()], &["Hi".to_string()])
            .unwrap();
        assert_eq!(events[0].text, "Hola");
    }
}
