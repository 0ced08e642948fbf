//! Word inflection used to turn repository, field, and association names
//! into JSON:API member names.

use crate::model::Inflection;
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// `NationalCapitals` / `national-capitals` -> `national_capitals`
pub fn underscore(word: &str) -> String {
    word.to_snake_case()
}

/// `national_capitals` -> `national-capitals`
pub fn dasherize(word: &str) -> String {
    word.to_kebab_case()
}

/// `national_capitals` -> `NationalCapitals`
pub fn camelize(word: &str) -> String {
    word.to_upper_camel_case()
}

/// `national_capitals` -> `nationalCapitals`
pub fn variable(word: &str) -> String {
    word.to_lower_camel_case()
}

/// Singular form of the last word of an underscored name
pub fn singularize(word: &str) -> String {
    let (head, last) = split_last_word(word);
    format!("{}{}", head, singular_word(last))
}

/// Plural form of the last word of an underscored name
pub fn pluralize(word: &str) -> String {
    let (head, last) = split_last_word(word);
    format!("{}{}", head, plural_word(last))
}

fn split_last_word(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

fn singular_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with("ies") && word.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if lower.ends_with("sses")
        || lower.ends_with("xes")
        || lower.ends_with("ches")
        || lower.ends_with("shes")
    {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn plural_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1);
        if matches!(before, Some(c) if !is_vowel(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

/// Inflect a member name (attribute key or relationship name)
pub fn member_name(name: &str, inflection: Inflection) -> String {
    match inflection {
        Inflection::Dasherize => dasherize(name),
        Inflection::Underscore => underscore(name),
        Inflection::Variable => variable(name),
        Inflection::None => name.to_string(),
    }
}

/// Resource type for a repository table
pub fn resource_type(table: &str, inflection: Inflection) -> String {
    match inflection {
        Inflection::None => table.to_string(),
        other => member_name(table, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_and_dasherize() {
        assert_eq!(underscore("NationalCapitals"), "national_capitals");
        assert_eq!(underscore("Countries"), "countries");
        assert_eq!(underscore("dummy_counter"), "dummy_counter");
        assert_eq!(dasherize("dummy_counter"), "dummy-counter");
        assert_eq!(dasherize("NationalCapital"), "national-capital");
    }

    #[test]
    fn test_camel_forms() {
        assert_eq!(camelize("national_capitals"), "NationalCapitals");
        assert_eq!(variable("national_capitals"), "nationalCapitals");
        assert_eq!(variable("code"), "code");
        assert_eq!(variable("dummy_counter"), "dummyCounter");
        assert_eq!(camelize("national-capital"), "NationalCapital");
    }

    #[test]
    fn test_separators_are_normalised() {
        assert_eq!(underscore("national-capitals"), "national_capitals");
        assert_eq!(dasherize("NationalCapitals"), "national-capitals");
        assert_eq!(member_name("national_capital", Inflection::None), "national_capital");
    }

    #[test]
    fn test_singular_and_plural() {
        assert_eq!(singularize("countries"), "country");
        assert_eq!(singularize("national_capitals"), "national_capital");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("currency"), "currency");
        assert_eq!(pluralize("country"), "countries");
        assert_eq!(pluralize("national_capital"), "national_capitals");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
    }

    #[test]
    fn test_resource_type_per_inflection() {
        assert_eq!(resource_type("national_capitals", Inflection::Dasherize), "national-capitals");
        assert_eq!(resource_type("national_capitals", Inflection::Underscore), "national_capitals");
        assert_eq!(resource_type("national_capitals", Inflection::Variable), "nationalCapitals");
        assert_eq!(resource_type("national_capitals", Inflection::None), "national_capitals");
    }
}
