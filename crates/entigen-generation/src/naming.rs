//! Pluralization and case conversion
//!
//! Every other component derives identifiers through this module so the generated
//! artifacts agree on naming. All functions are pure.

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

/// Represents a case transformation for identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    /// PascalCase (e.g., PaidBy)
    PascalCase,
    /// camelCase (e.g., paidBy)
    CamelCase,
    /// snake_case (e.g., paid_by)
    SnakeCase,
    /// kebab-case (e.g., paid-by)
    KebabCase,
    /// SCREAMING_SNAKE (e.g., PAID_BY)
    UpperCase,
    /// lowercase with word boundaries kept verbatim (e.g., paidby)
    LowerCase,
}

impl CaseTransform {
    /// Apply case transformation to a string
    pub fn apply(&self, input: &str) -> String {
        match self {
            CaseTransform::PascalCase => input.to_pascal_case(),
            CaseTransform::CamelCase => input.to_lower_camel_case(),
            CaseTransform::SnakeCase => input.to_snake_case(),
            CaseTransform::KebabCase => input.to_kebab_case(),
            CaseTransform::UpperCase => input.to_shouty_snake_case(),
            CaseTransform::LowerCase => input.to_lowercase(),
        }
    }
}

/// Pluralize an English noun.
///
/// Rules, first match wins: consonant + `y` → `ies`; `s`/`x`/`z`/`sh`/`ch` → `es`;
/// `fe` → `ves`; `f` → `ves`; otherwise `s`.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();

    if let [.., prev, 'y'] = chars.as_slice() {
        if !is_vowel(*prev) {
            return format!("{}ies", strip_chars(word, 1));
        }
    }

    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("sh")
        || lower.ends_with("ch")
    {
        return format!("{}es", word);
    }

    if lower.ends_with("fe") {
        return format!("{}ves", strip_chars(word, 2));
    }

    if lower.ends_with('f') {
        return format!("{}ves", strip_chars(word, 1));
    }

    format!("{}s", word)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn strip_chars(word: &str, count: usize) -> &str {
    let cut = word
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &word[..cut]
}

/// Public identifier form: leading capital and a capital at every word boundary
pub fn public_identifier(name: &str) -> String {
    CaseTransform::PascalCase.apply(name)
}

/// Serialization/storage form: all lowercase, word boundaries kept verbatim
pub fn serialization_name(name: &str) -> String {
    CaseTransform::LowerCase.apply(name)
}

/// Local variable form (lower camel case)
pub fn variable_name(name: &str) -> String {
    CaseTransform::CamelCase.apply(name)
}

/// Precomputed identifier forms for one name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameForms {
    /// Name as supplied
    pub raw: String,
    /// Exported identifier (`PaidBy`)
    pub public: String,
    /// Serialization / column / tag name (`paidby`)
    pub serial: String,
    /// Local variable name (`paidBy`)
    pub variable: String,
}

impl NameForms {
    /// Derive every form of `name`
    pub fn of(name: &str) -> Self {
        Self {
            raw: name.to_string(),
            public: public_identifier(name),
            serial: serialization_name(name),
            variable: variable_name(name),
        }
    }
}
