//! Placeholder consistency across the languages of a key.
//!
//! A text like `"Hello %s, you have %d coins"` carries the placeholders
//! `%d` and `%s` (sorted). Every translation of a key must carry the same
//! placeholders as the first non-empty translation; empty texts are not yet
//! translated and are skipped.

use crate::error::Result;
use crate::file::LocalizationFile;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateWarning {
    pub directory: String,
    pub key: String,
    pub language: String,
    /// Placeholders of the reference translation.
    pub expected: Vec<String>,
    pub found: Vec<String>,
    /// Language the expected placeholders were taken from.
    pub reference_language: String,
}

impl fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Localization key \"{}\" ({}) has templates [{}] in \"{}\" but [{}] in \"{}\"",
            self.key,
            self.directory,
            self.found.join(","),
            self.language,
            self.expected.join(","),
            self.reference_language
        )
    }
}

#[derive(Debug, Clone)]
pub struct TemplateValidator {
    token: Regex,
}

impl TemplateValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(r"%[0-9A-Za-z_]")?,
        })
    }

    /// Placeholder tokens of `text`, sorted.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .token
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        tokens.sort();
        tokens
    }

    /// Compare the placeholders of every key across the files of one
    /// directory. Files are visited in language order.
    pub fn validate_directory<'a>(
        &self,
        directory: &str,
        files: impl IntoIterator<Item = &'a LocalizationFile>,
    ) -> Vec<TemplateWarning> {
        let files: BTreeMap<&str, &LocalizationFile> = files
            .into_iter()
            .map(|file| (file.language.as_str(), file))
            .collect();
        let keys: BTreeSet<&String> = files.values().flat_map(|f| f.keyed_text.keys()).collect();

        let mut warnings = Vec::new();
        for key in keys {
            let mut reference: Option<(&str, Vec<String>)> = None;
            for (language, file) in &files {
                let Some(text) = file.keyed_text.get(key).filter(|t| !t.is_empty()) else {
                    continue;
                };
                let found = self.tokens(text);
                let Some((reference_language, expected)) = &reference else {
                    reference = Some((*language, found));
                    continue;
                };
                if *expected != found {
                    warnings.push(TemplateWarning {
                        directory: directory.to_string(),
                        key: key.clone(),
                        language: language.to_string(),
                        expected: expected.clone(),
                        found,
                        reference_language: reference_language.to_string(),
                    });
                }
            }
        }
        warnings
    }
}
