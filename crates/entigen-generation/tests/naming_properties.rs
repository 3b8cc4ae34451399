//! Property-based tests for the naming engine
//!
//! Property: pluralization is deterministic and follows the first matching suffix rule.

use entigen_generation::naming::{public_identifier, serialization_name};
use entigen_generation::pluralize;
use proptest::prelude::*;

#[test]
fn test_rule_table_examples() {
    assert_eq!(pluralize("category"), "categories");
    assert_eq!(pluralize("box"), "boxes");
    assert_eq!(pluralize("church"), "churches");
    assert_eq!(pluralize("knife"), "knives");
    assert_eq!(pluralize("book"), "books");
    assert_eq!(pluralize("leaf"), "leaves");
    assert_eq!(pluralize("day"), "days");
    assert_eq!(pluralize("dish"), "dishes");
}

proptest! {
    /// Property: the same input always yields the same plural
    #[test]
    fn prop_pluralize_is_deterministic(word in "[a-z]{1,12}") {
        prop_assert_eq!(pluralize(&word), pluralize(&word));
    }

    /// Property: consonant + y becomes ies
    #[test]
    fn prop_consonant_y(stem in "[a-z]{0,6}[bcdfghjklmnpqrstvwxz]") {
        let word = format!("{}y", stem);
        prop_assert_eq!(pluralize(&word), format!("{}ies", stem));
    }

    /// Property: sibilant endings take es
    #[test]
    fn prop_sibilant_endings(stem in "[a-z]{1,6}", ending in prop::sample::select(vec!["s", "x", "z", "sh", "ch"])) {
        let word = format!("{}{}", stem, ending);
        prop_assert_eq!(pluralize(&word), format!("{}es", word));
    }

    /// Property: f and fe endings become ves
    #[test]
    fn prop_f_endings(stem in "[a-z]{1,6}", fe in any::<bool>()) {
        let word = if fe { format!("{}fe", stem) } else { format!("{}f", stem) };
        prop_assert_eq!(pluralize(&word), format!("{}ves", stem));
    }

    /// Property: a plural always starts with the singular's first letter and is longer
    #[test]
    fn prop_plural_keeps_prefix(word in "[a-z]{2,12}") {
        let plural = pluralize(&word);
        prop_assert!(plural.len() > word.len() - 1);
        prop_assert_eq!(plural.chars().next(), word.chars().next());
    }

    /// Property: serialization form is the lowercase input, public form starts uppercase
    #[test]
    fn prop_case_forms(name in "[A-Z][a-z]{1,6}[A-Z][a-z]{1,6}") {
        prop_assert_eq!(serialization_name(&name), name.to_lowercase());
        let public = public_identifier(&name);
        prop_assert!(public.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(public.to_lowercase(), name.to_lowercase());
    }
}
