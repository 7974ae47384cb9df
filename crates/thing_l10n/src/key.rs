use crate::error::{KeyRejection, Result};
use regex::Regex;

/// Validates localization keys and language ids before an edit is applied.
#[derive(Debug, Clone)]
pub struct KeyValidator {
    invalid_key_chars: Regex,
    language_id: Regex,
}

impl KeyValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            invalid_key_chars: Regex::new(r"[^a-zA-Z0-9._/]")?,
            language_id: Regex::new(r"^[a-z0-9_\-]+$")?,
        })
    }

    /// Check the shape of `key`; `exists` reports whether it is already taken.
    pub fn validate_key(
        &self,
        key: &str,
        exists: impl FnOnce(&str) -> bool,
    ) -> std::result::Result<(), KeyRejection> {
        if key.is_empty() {
            return Err(KeyRejection::EmptyKey);
        }
        if exists(key) {
            return Err(KeyRejection::KeyExists(key.to_string()));
        }
        self.validate_key_shape(key)
    }

    pub fn validate_key_shape(&self, key: &str) -> std::result::Result<(), KeyRejection> {
        if key.is_empty() {
            return Err(KeyRejection::EmptyKey);
        }
        if key.starts_with('.') || key.ends_with('.') {
            return Err(KeyRejection::DotAtEdge(key.to_string()));
        }
        if self.invalid_key_chars.is_match(key) {
            return Err(KeyRejection::InvalidCharacters(key.to_string()));
        }
        Ok(())
    }

    /// Refuse `key` when it is a dotted prefix of an existing key, or an
    /// existing key is a dotted prefix of it. Both would share one node of
    /// the nested file.
    pub fn check_path_conflict<'a>(
        &self,
        key: &str,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> std::result::Result<(), KeyRejection> {
        let conflict = existing.into_iter().find(|other| {
            is_dotted_prefix(other, key) || is_dotted_prefix(key, other)
        });
        match conflict {
            Some(other) => Err(KeyRejection::PathConflict(other.to_string())),
            None => Ok(()),
        }
    }

    /// Lower-case a language id and check it can name a file.
    pub fn normalize_language(&self, language: &str) -> std::result::Result<String, KeyRejection> {
        let language = language.trim().to_lowercase();
        if !self.language_id.is_match(&language) {
            return Err(KeyRejection::InvalidLanguageId(language));
        }
        Ok(language)
    }
}

fn is_dotted_prefix(prefix: &str, key: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        let validator = KeyValidator::new().unwrap();
        for key in ["menu.play", "a", "ui/title_2", "A.B.C"] {
            assert_eq!(validator.validate_key(key, |_| false), Ok(()), "{}", key);
        }
    }

    #[test]
    fn test_rejections() {
        let validator = KeyValidator::new().unwrap();

        assert_eq!(
            validator.validate_key("menu.play", |_| true),
            Err(KeyRejection::KeyExists("menu.play".into()))
        );
        assert_eq!(
            validator.validate_key(".menu", |_| false),
            Err(KeyRejection::DotAtEdge(".menu".into()))
        );
        assert_eq!(
            validator.validate_key("menu.", |_| false),
            Err(KeyRejection::DotAtEdge("menu.".into()))
        );
        assert_eq!(
            validator.validate_key("menu play", |_| false),
            Err(KeyRejection::InvalidCharacters("menu play".into()))
        );
        assert_eq!(validator.validate_key("", |_| false), Err(KeyRejection::EmptyKey));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        let validator = KeyValidator::new().unwrap();
        for key in ["level\u{0663}", "stage\u{FF15}"] {
            assert_eq!(
                validator.validate_key(key, |_| false),
                Err(KeyRejection::InvalidCharacters(key.to_string()))
            );
        }
        assert!(validator.normalize_language("de\u{0663}").is_err());
    }

    #[test]
    fn test_path_conflicts() {
        let validator = KeyValidator::new().unwrap();
        let existing = ["menu.play", "title"];

        assert_eq!(
            validator.check_path_conflict("menu.play.hint", existing),
            Err(KeyRejection::PathConflict("menu.play".into()))
        );
        assert_eq!(
            validator.check_path_conflict("menu", existing),
            Err(KeyRejection::PathConflict("menu.play".into()))
        );
        assert_eq!(validator.check_path_conflict("menu.player", existing), Ok(()));
        assert_eq!(validator.check_path_conflict("titles.main", existing), Ok(()));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(KeyRejection::KeyExists("x".into()).to_string(), "ID already exists");
        assert_eq!(
            KeyRejection::DotAtEdge("x.".into()).to_string(),
            "ID can not begin or end with \".\""
        );
        assert_eq!(
            KeyRejection::LanguageExists("de".into()).to_string(),
            "Language with ID=de already exists"
        );
    }

    #[test]
    fn test_normalize_language() {
        let validator = KeyValidator::new().unwrap();
        assert_eq!(validator.normalize_language(" DE ").unwrap(), "de");
        assert_eq!(validator.normalize_language("pt-BR").unwrap(), "pt-br");
        assert!(validator.normalize_language("e/n").is_err());
        assert!(validator.normalize_language("").is_err());
    }
}
