use std::collections::BTreeMap;

const DEFAULT_TRANSLATIONS: [(&str, &str); 8] = [
    ("Write Things Down", "记录想法"),
    ("Navigating Data Chaos A New Approach", "应对数据混乱的新方法"),
    ("Opendoor is a Software Business", "Opendoor是一个软件企业"),
    ("Modern Politics and Starting a New Country", "现代政治与创建新国家"),
    (
        "There's never been more opportunities for young people",
        "年轻人从未有过如此多的机会",
    ),
    ("How Britain Defeated Germany On The Atlantic", "英国如何在大西洋击败德国"),
    ("How to Live in Everyone Else's Future", "如何活在他人的未来中"),
    ("Balaji Srinivasan", "巴拉吉·斯里尼瓦桑"),
];

/// Cosmetic lookup of known title phrases.
///
/// A title matches an entry when it contains the entry's phrase, ignoring
/// case. Longer phrases are tried first so the most specific entry wins.
#[derive(Debug, Clone)]
pub struct TitleTranslator {
    entries: Vec<(String, String)>,
}

impl Default for TitleTranslator {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl TitleTranslator {
    /// Builds the table from the defaults plus `extra`; `extra` wins on conflicts
    pub fn new(extra: BTreeMap<String, String>) -> Self {
        let mut table = DEFAULT_TRANSLATIONS
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        table.extend(extra.into_iter().map(|(k, v)| (k.to_lowercase(), v)));

        let mut entries = table
            .into_iter()
            .filter(|(phrase, _)| !phrase.is_empty())
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { entries }
    }

    pub fn translate(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.entries
            .iter()
            .find(|(phrase, _)| title.contains(phrase.as_str()))
            .map(|(_, translated)| translated.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_substring_matches_are_case_insensitive() {
        let translator = TitleTranslator::default();
        assert_eq!(translator.translate("Write Things Down"), Some("记录想法"));
        assert_eq!(
            translator.translate("Ep. 42: write things DOWN with Cal"),
            Some("记录想法")
        );
    }

    #[test]
    fn unknown_titles_have_no_translation() {
        let translator = TitleTranslator::default();
        assert_eq!(translator.translate("Rust in Production"), None);
    }

    #[test]
    fn configured_entries_extend_and_override_defaults() {
        let extra = BTreeMap::from([
            ("Rust in Production".to_string(), "生产环境中的Rust".to_string()),
            ("write things down".to_string(), "写下来".to_string()),
        ]);
        let translator = TitleTranslator::new(extra);

        assert_eq!(
            translator.translate("Rust in Production #3"),
            Some("生产环境中的Rust")
        );
        assert_eq!(translator.translate("Write Things Down"), Some("写下来"));
    }

    #[test]
    fn most_specific_phrase_wins() {
        let extra = BTreeMap::from([
            ("Balaji".to_string(), "巴拉吉".to_string()),
        ]);
        let translator = TitleTranslator::new(extra);
        assert_eq!(
            translator.translate("Balaji Srinivasan on network states"),
            Some("巴拉吉·斯里尼瓦桑")
        );
    }
}
