use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sort key approximating a root-locale collation.
///
/// Three levels are compared in order:
/// base letters (accents and case removed), accents, then case with
/// lowercase ahead of uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: Vec<u8>,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let decomposed: String = text.nfd().collect();

        let primary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect();

        let secondary = decomposed.chars().flat_map(char::to_lowercase).collect();

        let tertiary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .map(|c| u8::from(c.is_uppercase()))
            .collect();

        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}
