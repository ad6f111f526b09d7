//! Supported target languages per translation backend.

use std::fmt;

/// A target language as the backend knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub abbreviation: String,
    pub full: String,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full, self.abbreviation)
    }
}

/// Abbreviation to full name mapping of one backend
#[derive(Debug, Clone, Copy)]
pub struct LanguageTable {
    common: &'static [(&'static str, &'static str)],
    extra: &'static [(&'static str, &'static str)],
}

impl LanguageTable {
    fn entries(&self) -> impl Iterator<Item = &(&'static str, &'static str)> {
        self.common.iter().chain(self.extra.iter())
    }

    /// Find a language by exact (case-sensitive) abbreviation or full name
    pub fn detect(&self, name: &str) -> Option<Language> {
        self.entries()
            .find(|(abbreviation, full)| name == *abbreviation || name == *full)
            .map(|(abbreviation, full)| Language {
                abbreviation: abbreviation.to_string(),
                full: full.to_string(),
            })
    }

    /// Human readable `abbreviation - name` listing
    pub fn listing(&self) -> String {
        self.entries()
            .map(|(abbreviation, full)| format!("{} - {}", abbreviation, full))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Languages of the translate.googleapis.* endpoint
pub const GTX_LANGUAGES: LanguageTable = LanguageTable {
    common: COMMON_LANGUAGES,
    extra: &[("he", "hebrew")],
};

/// Languages of the translate.google.* web RPC endpoint
pub const BATCHEXECUTE_LANGUAGES: LanguageTable = LanguageTable {
    common: COMMON_LANGUAGES,
    extra: &[("rw", "kinyarwanda"), ("tt", "tatar"), ("tk", "turkmen")],
};

const COMMON_LANGUAGES: &[(&str, &str)] = &[
    ("af", "afrikaans"),
    ("sq", "albanian"),
    ("am", "amharic"),
    ("ar", "arabic"),
    ("hy", "armenian"),
    ("az", "azerbaijani"),
    ("eu", "basque"),
    ("be", "belarusian"),
    ("bn", "bengali"),
    ("bs", "bosnian"),
    ("bg", "bulgarian"),
    ("ca", "catalan"),
    ("ceb", "cebuano"),
    ("ny", "chichewa"),
    ("zh-cn", "chinese (simplified)"),
    ("zh-tw", "chinese (traditional)"),
    ("co", "corsican"),
    ("hr", "croatian"),
    ("cs", "czech"),
    ("da", "danish"),
    ("nl", "dutch"),
    ("en", "english"),
    ("eo", "esperanto"),
    ("et", "estonian"),
    ("tl", "filipino"),
    ("fi", "finnish"),
    ("fr", "french"),
    ("fy", "frisian"),
    ("gl", "galician"),
    ("ka", "georgian"),
    ("de", "german"),
    ("el", "greek"),
    ("gu", "gujarati"),
    ("ht", "haitian creole"),
    ("ha", "hausa"),
    ("haw", "hawaiian"),
    ("iw", "hebrew"),
    ("hi", "hindi"),
    ("hmn", "hmong"),
    ("hu", "hungarian"),
    ("is", "icelandic"),
    ("ig", "igbo"),
    ("id", "indonesian"),
    ("ga", "irish"),
    ("it", "italian"),
    ("ja", "japanese"),
    ("jw", "javanese"),
    ("kn", "kannada"),
    ("kk", "kazakh"),
    ("km", "khmer"),
    ("ko", "korean"),
    ("ku", "kurdish (kurmanji)"),
    ("ky", "kyrgyz"),
    ("lo", "lao"),
    ("la", "latin"),
    ("lv", "latvian"),
    ("lt", "lithuanian"),
    ("lb", "luxembourgish"),
    ("mk", "macedonian"),
    ("mg", "malagasy"),
    ("ms", "malay"),
    ("ml", "malayalam"),
    ("mt", "maltese"),
    ("mi", "maori"),
    ("mr", "marathi"),
    ("mn", "mongolian"),
    ("my", "myanmar (burmese)"),
    ("ne", "nepali"),
    ("no", "norwegian"),
    ("or", "odia"),
    ("ps", "pashto"),
    ("fa", "persian"),
    ("pl", "polish"),
    ("pt", "portuguese"),
    ("pa", "punjabi"),
    ("ro", "romanian"),
    ("ru", "russian"),
    ("sm", "samoan"),
    ("gd", "scots gaelic"),
    ("sr", "serbian"),
    ("st", "sesotho"),
    ("sn", "shona"),
    ("sd", "sindhi"),
    ("si", "sinhala"),
    ("sk", "slovak"),
    ("sl", "slovenian"),
    ("so", "somali"),
    ("es", "spanish"),
    ("su", "sundanese"),
    ("sw", "swahili"),
    ("sv", "swedish"),
    ("tg", "tajik"),
    ("ta", "tamil"),
    ("te", "telugu"),
    ("th", "thai"),
    ("tr", "turkish"),
    ("uk", "ukrainian"),
    ("ur", "urdu"),
    ("ug", "uyghur"),
    ("uz", "uzbek"),
    ("vi", "vietnamese"),
    ("cy", "welsh"),
    ("xh", "xhosa"),
    ("yi", "yiddish"),
    ("yo", "yoruba"),
    ("zu", "zulu"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_abbreviation_or_name() {
        let by_abbreviation = GTX_LANGUAGES.detect("ja").unwrap();
        assert_eq!(by_abbreviation.full, "japanese");

        let by_name = GTX_LANGUAGES.detect("japanese").unwrap();
        assert_eq!(by_name, by_abbreviation);
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        assert!(GTX_LANGUAGES.detect("JA").is_none());
        assert!(GTX_LANGUAGES.detect("Japanese").is_none());
        assert!(GTX_LANGUAGES.detect("").is_none());
    }

    #[test]
    fn test_tables_differ_per_backend() {
        assert!(GTX_LANGUAGES.detect("he").is_some());
        assert!(BATCHEXECUTE_LANGUAGES.detect("he").is_none());
        assert!(BATCHEXECUTE_LANGUAGES.detect("tatar").is_some());
        assert!(GTX_LANGUAGES.detect("tatar").is_none());
    }

    #[test]
    fn test_listing() {
        let listing = GTX_LANGUAGES.listing();
        assert!(listing.starts_with("af - afrikaans, sq - albanian"));
        assert!(listing.ends_with("he - hebrew"));
    }
}
