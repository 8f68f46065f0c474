//! Label extraction from submitted labeling forms
//!
//! The labeling page renders one input per token named `label_<index>`.
//! On submission the values are pulled back out in index order so they can
//! be written onto the record's tokens by position.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use sous_core::IndexOrdering;
use thiserror::Error;

/// Prefix shared by all label-bearing form fields
pub const LABEL_FIELD_PREFIX: &str = "label_";

/// Errors raised while extracting labels from a form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Malformed label field: {0}")]
    MalformedField(String),
}

fn label_field_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^label_([0-9]{1,2})").expect("label field pattern is valid"))
}

/// Form field name for the token at `index`
pub fn label_field_name(index: u32) -> String {
    format!("{LABEL_FIELD_PREFIX}{index}")
}

/// Extracts ordered label values from a submitted form
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelExtractor {
    ordering: IndexOrdering,
}

impl LabelExtractor {
    /// Create an extractor with the given field ordering
    pub fn new(ordering: IndexOrdering) -> Self {
        Self { ordering }
    }

    pub fn ordering(&self) -> IndexOrdering {
        self.ordering
    }

    /// Label field names sorted by their captured index
    pub fn label_keys<'a>(
        &self,
        form: &'a HashMap<String, String>,
    ) -> Result<Vec<&'a str>, ExtractError> {
        let mut keyed = Vec::new();

        for field in form.keys().filter(|f| f.starts_with(LABEL_FIELD_PREFIX)) {
            let digits = label_field_regex()
                .captures(field)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| ExtractError::MalformedField(field.clone()))?
                .as_str();
            let index: u8 = digits
                .parse()
                .map_err(|_| ExtractError::MalformedField(field.clone()))?;
            keyed.push((digits, index, field.as_str()));
        }

        keyed.sort_by(|a, b| {
            let by_index = match self.ordering {
                IndexOrdering::Lexicographic => a.0.cmp(b.0),
                IndexOrdering::Numeric => a.1.cmp(&b.1),
            };
            by_index.then_with(|| a.2.cmp(b.2))
        });
        Ok(keyed.into_iter().map(|(_, _, field)| field).collect())
    }

    /// Label values sorted by their field's captured index
    pub fn labels(&self, form: &HashMap<String, String>) -> Result<Vec<String>, ExtractError> {
        Ok(self
            .label_keys(form)?
            .into_iter()
            .filter_map(|key| form.get(key).cloned())
            .collect())
    }
}

/// Sorted label field names of `form`
pub fn extract_label_keys(
    form: &HashMap<String, String>,
    ordering: IndexOrdering,
) -> Result<Vec<String>, ExtractError> {
    Ok(LabelExtractor::new(ordering)
        .label_keys(form)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Label values of `form` in index order
pub fn extract_labels(
    form: &HashMap<String, String>,
    ordering: IndexOrdering,
) -> Result<Vec<String>, ExtractError> {
    LabelExtractor::new(ordering).labels(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_labels(indices: impl IntoIterator<Item = u32>) -> HashMap<String, String> {
        indices
            .into_iter()
            .map(|i| (label_field_name(i), format!("tag{i}")))
            .collect()
    }

    #[test]
    fn test_single_digit_indices_in_order() {
        let form = form_with_labels(0..10);

        for ordering in [IndexOrdering::Lexicographic, IndexOrdering::Numeric] {
            let labels = extract_labels(&form, ordering).unwrap();
            let expected: Vec<String> = (0..10).map(|i| format!("tag{i}")).collect();
            assert_eq!(labels, expected);
        }
    }

    #[test]
    fn test_lexicographic_places_ten_after_one() {
        let form = form_with_labels(0..=10);

        let keys = extract_label_keys(&form, IndexOrdering::Lexicographic).unwrap();
        assert_eq!(
            keys,
            vec![
                "label_0", "label_1", "label_10", "label_2", "label_3", "label_4", "label_5",
                "label_6", "label_7", "label_8", "label_9"
            ]
        );

        let labels = extract_labels(&form, IndexOrdering::Lexicographic).unwrap();
        assert_eq!(labels[2], "tag10");
        assert_eq!(labels.last().map(String::as_str), Some("tag9"));
    }

    #[test]
    fn test_numeric_places_ten_last() {
        let form = form_with_labels(0..=10);

        let labels = extract_labels(&form, IndexOrdering::Numeric).unwrap();
        let expected: Vec<String> = (0..=10).map(|i| format!("tag{i}")).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_non_label_fields_ignored() {
        let mut form = form_with_labels([1, 0]);
        form.insert("ingredient_id".to_string(), "abc".to_string());
        form.insert("labels".to_string(), "not a label field".to_string());
        form.insert("submit".to_string(), "label_99".to_string());

        let labels = extract_labels(&form, IndexOrdering::Lexicographic).unwrap();
        assert_eq!(labels, vec!["tag0", "tag1"]);
    }

    #[test]
    fn test_malformed_label_field() {
        let mut form = form_with_labels([0]);
        form.insert("label_x".to_string(), "B-NAME".to_string());

        let err = extract_labels(&form, IndexOrdering::Lexicographic).unwrap_err();
        assert_eq!(err, ExtractError::MalformedField("label_x".to_string()));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        let mut form = form_with_labels([0, 5]);
        form.insert("label_\u{0663}".to_string(), "arabic-three".to_string());

        for ordering in [IndexOrdering::Lexicographic, IndexOrdering::Numeric] {
            let err = extract_labels(&form, ordering).unwrap_err();
            assert_eq!(
                err,
                ExtractError::MalformedField("label_\u{0663}".to_string())
            );
        }
    }

    #[test]
    fn test_three_digit_field_uses_prefix_match() {
        let mut form = HashMap::new();
        form.insert("label_123".to_string(), "late".to_string());
        form.insert("label_5".to_string(), "early".to_string());

        // Only the first two digits are captured, so "12" sorts before "5"
        let labels = extract_labels(&form, IndexOrdering::Numeric).unwrap();
        assert_eq!(labels, vec!["early", "late"]);
        let labels = extract_labels(&form, IndexOrdering::Lexicographic).unwrap();
        assert_eq!(labels, vec!["late", "early"]);
    }

    #[test]
    fn test_numeric_ties_break_on_field_name() {
        let mut form = HashMap::new();
        form.insert("label_1".to_string(), "b".to_string());
        form.insert("label_01".to_string(), "a".to_string());

        let keys = extract_label_keys(&form, IndexOrdering::Numeric).unwrap();
        assert_eq!(keys, vec!["label_01", "label_1"]);
    }

    #[test]
    fn test_empty_form() {
        let form = HashMap::new();
        assert!(extract_labels(&form, IndexOrdering::Numeric).unwrap().is_empty());
    }
}
