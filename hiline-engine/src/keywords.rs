//! Keyword classification
//!
//!     A [KeywordMapper] answers one question: which category does this word belong to?
//!     It is built once from an enumerated `{category: words}` configuration and is a
//!     pure function of the matched text afterwards.
//!
//!     ```rust,ignore
//!     let mapper = KeywordMapper::builder("identifier")
//!         .category_list("keyword.control", "if|else|while")
//!         .category_list("constant.language", "TRUE|FALSE")
//!         .build();
//!     assert_eq!(mapper.classify("while"), "keyword.control");
//!     assert_eq!(mapper.classify("count"), "identifier");
//!     ```
//!
//!     When a word is listed under several categories, the first category wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable word -> category lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMapper {
    words: HashMap<String, usize>,
    categories: Vec<String>,
    default: String,
    case_insensitive: bool,
}

impl KeywordMapper {
    pub fn builder(default: impl Into<String>) -> KeywordMapperBuilder {
        KeywordMapperBuilder {
            default: default.into(),
            case_insensitive: false,
            groups: Vec::new(),
        }
    }

    pub fn classify(&self, word: &str) -> &str {
        let found = if self.case_insensitive {
            self.words.get(&word.to_lowercase())
        } else {
            self.words.get(word)
        };
        match found {
            Some(&idx) => &self.categories[idx],
            None => &self.default,
        }
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Collects keyword groups before freezing them into a [KeywordMapper].
#[derive(Debug, Clone)]
pub struct KeywordMapperBuilder {
    default: String,
    case_insensitive: bool,
    groups: Vec<KeywordGroup>,
}

impl KeywordMapperBuilder {
    pub fn category<I, S>(mut self, category: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(KeywordGroup {
            category: category.into(),
            words: words.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a category from a `|`-separated word list, e.g. `"and|or"`.
    pub fn category_list(self, category: impl Into<String>, list: &str) -> Self {
        let words: Vec<&str> = list.split('|').filter(|w| !w.is_empty()).collect();
        self.category(category, words)
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn build(self) -> KeywordMapper {
        let mut categories = Vec::with_capacity(self.groups.len());
        let mut words = HashMap::new();
        for group in self.groups {
            let idx = categories.len();
            categories.push(group.category);
            for word in group.words {
                let key = if self.case_insensitive {
                    word.to_lowercase()
                } else {
                    word
                };
                words.entry(key).or_insert(idx);
            }
        }
        KeywordMapper {
            words,
            categories,
            default: self.default,
            case_insensitive: self.case_insensitive,
        }
    }
}

/// One `{category: words}` entry of a [KeywordConfig].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub category: String,
    pub words: Vec<String>,
}

/// Serializable form of a keyword mapper, as found in grammar files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_identifier")]
    pub default: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub groups: Vec<KeywordGroup>,
}

fn default_identifier() -> String {
    "identifier".to_string()
}

impl From<KeywordConfig> for KeywordMapper {
    fn from(config: KeywordConfig) -> Self {
        config
            .groups
            .into_iter()
            .fold(
                KeywordMapper::builder(config.default).case_insensitive(config.case_insensitive),
                |builder, group| builder.category(group.category, group.words),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> KeywordMapper {
        KeywordMapper::builder("identifier")
            .category_list("keyword.control", "break|case|if|while")
            .category_list("keyword.operator", "and|or")
            .category("variable.language", ["this"])
            .build()
    }

    #[test]
    fn classifies_known_words() {
        let m = mapper();
        assert_eq!(m.classify("while"), "keyword.control");
        assert_eq!(m.classify("or"), "keyword.operator");
        assert_eq!(m.classify("this"), "variable.language");
        assert_eq!(m.len(), 7);
    }

    #[test]
    fn unknown_words_get_default() {
        let m = mapper();
        assert_eq!(m.classify("counter"), "identifier");
        assert_eq!(m.classify(""), "identifier");
    }

    #[test]
    fn case_sensitive_by_default() {
        assert_eq!(mapper().classify("WHILE"), "identifier");
    }

    #[test]
    fn case_insensitive_lookup() {
        let m = KeywordMapper::builder("identifier")
            .category_list("keyword", "Select|FROM")
            .case_insensitive(true)
            .build();
        assert_eq!(m.classify("select"), "keyword");
        assert_eq!(m.classify("From"), "keyword");
    }

    #[test]
    fn first_category_wins_on_duplicates() {
        let m = KeywordMapper::builder("identifier")
            .category_list("a", "x|y")
            .category_list("b", "y|z")
            .build();
        assert_eq!(m.classify("y"), "a");
        assert_eq!(m.classify("z"), "b");
    }

    #[test]
    fn empty_list_entries_are_ignored() {
        let m = KeywordMapper::builder("identifier")
            .category_list("k", "a||b|")
            .build();
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn builds_from_config() {
        let config: KeywordConfig = serde_yaml::from_str(
            "groups:\n  - category: constant.language\n    words: [TRUE, FALSE]\n",
        )
        .unwrap();
        let m = KeywordMapper::from(config);
        assert_eq!(m.classify("TRUE"), "constant.language");
        assert_eq!(m.default_category(), "identifier");
    }
}
