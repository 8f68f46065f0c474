//! Rule-based ingredient tagger
//!
//! Offline stand-in for the trained NER model:
//! - Regex patterns for quantities
//! - Dictionary of measurement units
//! - Position rules for comments (after a comma or inside parentheses)
//!
//! Tags follow the BIO convention used by the trained model
//! (`B-QTY`, `I-NAME`, ...), with `OTHER` left unprefixed.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use sous_core::{Predictor, Result};

// ============================================================================
// Ingredient Tags
// ============================================================================

/// Entity types recognized in ingredient lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IngredientTag {
    /// Amount, e.g. `2`, `1/2`, `1-2`
    Qty,
    /// Measurement unit, e.g. `cups`, `tbsp`
    Unit,
    /// Ingredient name
    Name,
    /// Preparation notes, e.g. `finely chopped`
    Comment,
    /// Filler words and punctuation
    Other,
}

impl IngredientTag {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qty => "QTY",
            Self::Unit => "UNIT",
            Self::Name => "NAME",
            Self::Comment => "COMMENT",
            Self::Other => "OTHER",
        }
    }

    pub fn all() -> &'static [IngredientTag] {
        &[
            IngredientTag::Qty,
            IngredientTag::Unit,
            IngredientTag::Name,
            IngredientTag::Comment,
            IngredientTag::Other,
        ]
    }

    /// Every label a token can carry, in display order
    pub fn label_set() -> Vec<String> {
        let mut labels = Vec::new();
        for tag in Self::all() {
            if *tag == Self::Other {
                labels.push(tag.as_str().to_string());
            } else {
                labels.push(format!("B-{}", tag.as_str()));
                labels.push(format!("I-{}", tag.as_str()));
            }
        }
        labels
    }
}

impl std::fmt::Display for IngredientTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Rule-based Predictor
// ============================================================================

/// Rule-based tagger using regex patterns and a unit dictionary
pub struct RuleBasedPredictor {
    /// Patterns matched against a whole token
    patterns: Vec<(Regex, IngredientTag)>,
    /// Known units (lowercase, singular and plural)
    units: HashSet<String>,
    /// Words that are never part of an entity
    filler: HashSet<String>,
}

impl RuleBasedPredictor {
    /// Create a tagger with the default ingredient rules
    pub fn new() -> Self {
        let mut tagger = Self {
            patterns: Vec::new(),
            units: HashSet::new(),
            filler: HashSet::new(),
        };

        tagger.init_patterns();
        tagger.init_dictionary();
        tagger
    }

    fn init_patterns(&mut self) {
        // Integers, decimals, fractions and ranges
        self.add_pattern(r"^\d+([.,]\d+)?$", IngredientTag::Qty);
        self.add_pattern(r"^\d+/\d+$", IngredientTag::Qty);
        self.add_pattern(r"^\d+(/\d+)?-\d+(/\d+)?$", IngredientTag::Qty);
        self.add_pattern(r"^\d*[¼½¾⅓⅔⅛⅜⅝⅞]$", IngredientTag::Qty);

        // Punctuation only
        self.add_pattern(r"^[[:punct:]]+$", IngredientTag::Other);
    }

    fn init_dictionary(&mut self) {
        for unit in [
            "cup", "teaspoon", "tablespoon", "tsp", "tbsp", "tbs", "pound", "lb", "ounce",
            "oz", "gram", "g", "kilogram", "kg", "ml", "milliliter", "liter", "l", "quart",
            "pint", "gallon", "clove", "pinch", "dash", "can", "package", "stick", "slice",
            "sprig", "bunch", "head", "jar", "bottle", "piece",
        ] {
            self.add_unit(unit);
        }

        for word in ["of", "and", "or", "a", "an", "the", "to", "for", "plus"] {
            self.filler.insert(word.to_string());
        }
    }

    fn add_pattern(&mut self, pattern: &str, tag: IngredientTag) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, tag));
        }
    }

    fn add_unit(&mut self, unit: &str) {
        self.units.insert(unit.to_string());
        self.units.insert(format!("{unit}s"));
        self.units.insert(format!("{unit}es"));
    }

    /// Classify a single token without context
    fn classify(&self, word: &str) -> IngredientTag {
        for (regex, tag) in &self.patterns {
            if regex.is_match(word) {
                return *tag;
            }
        }

        let lower = word.to_lowercase();
        let stripped = lower.trim_end_matches('.');
        if self.units.contains(stripped) {
            IngredientTag::Unit
        } else if self.filler.contains(stripped) {
            IngredientTag::Other
        } else {
            IngredientTag::Name
        }
    }

    /// Tag a token sequence
    pub fn tag(&self, words: &[String]) -> Vec<IngredientTag> {
        let mut tags = Vec::with_capacity(words.len());
        let mut after_comma = false;
        let mut paren_depth = 0usize;

        for word in words {
            let opens = word.starts_with('(');
            if opens {
                paren_depth += 1;
            }

            let tag = if word == "," {
                after_comma = true;
                IngredientTag::Other
            } else if after_comma || paren_depth > 0 {
                IngredientTag::Comment
            } else {
                match self.classify(word) {
                    // Unit words before any quantity belong to the name ("head" in "head lettuce")
                    IngredientTag::Unit if !tags.contains(&IngredientTag::Qty) => {
                        IngredientTag::Name
                    }
                    tag => tag,
                }
            };

            if word.ends_with(')') {
                paren_depth = paren_depth.saturating_sub(1);
            }
            if word.ends_with(',') && word.len() > 1 {
                after_comma = true;
            }
            tags.push(tag);
        }

        tags
    }

    /// Tag a token sequence and render BIO labels
    pub fn label(&self, words: &[String]) -> Vec<String> {
        to_bio(&self.tag(words))
    }
}

impl Default for RuleBasedPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for RuleBasedPredictor {
    async fn predict(&self, words: &[String]) -> Result<Vec<String>> {
        Ok(self.label(words))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

/// Render tags as BIO labels; consecutive equal tags continue a span
pub fn to_bio(tags: &[IngredientTag]) -> Vec<String> {
    let mut previous = None;
    tags.iter()
        .map(|tag| {
            let label = match tag {
                IngredientTag::Other => tag.as_str().to_string(),
                _ if previous == Some(*tag) => format!("I-{tag}"),
                _ => format!("B-{tag}"),
            };
            previous = Some(*tag);
            label
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_quantity_unit_name() {
        let tagger = RuleBasedPredictor::new();
        let labels = tagger.label(&words("2 cups all-purpose flour"));

        assert_eq!(labels, vec!["B-QTY", "B-UNIT", "B-NAME", "I-NAME"]);
    }

    #[test]
    fn test_fraction_and_range() {
        let tagger = RuleBasedPredictor::new();

        let tags = tagger.tag(&words("1/2 tsp salt"));
        assert_eq!(
            tags,
            vec![IngredientTag::Qty, IngredientTag::Unit, IngredientTag::Name]
        );

        let tags = tagger.tag(&words("1-2 ½ Tbsp."));
        assert_eq!(
            tags,
            vec![IngredientTag::Qty, IngredientTag::Qty, IngredientTag::Unit]
        );
    }

    #[test]
    fn test_comment_after_comma() {
        let tagger = RuleBasedPredictor::new();
        let labels = tagger.label(&words("1 onion , finely chopped"));

        assert_eq!(labels, vec!["B-QTY", "B-NAME", "OTHER", "B-COMMENT", "I-COMMENT"]);
    }

    #[test]
    fn test_comment_in_parentheses() {
        let tagger = RuleBasedPredictor::new();
        let tags = tagger.tag(&words("1 (14 ounce) can tomatoes"));

        assert_eq!(
            tags,
            vec![
                IngredientTag::Qty,
                IngredientTag::Comment,
                IngredientTag::Comment,
                IngredientTag::Unit,
                IngredientTag::Name,
            ]
        );
    }

    #[test]
    fn test_unit_without_quantity_is_name() {
        let tagger = RuleBasedPredictor::new();
        let tags = tagger.tag(&words("salt and pepper"));

        assert_eq!(
            tags,
            vec![IngredientTag::Name, IngredientTag::Other, IngredientTag::Name]
        );
    }

    #[test]
    fn test_label_set() {
        let labels = IngredientTag::label_set();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "B-QTY");
        assert_eq!(labels.last().map(String::as_str), Some("OTHER"));
    }

    #[tokio::test]
    async fn test_predict_same_length() {
        let tagger = RuleBasedPredictor::new();
        let input = words("3 large eggs , beaten");

        let preds = tagger.predict(&input).await.unwrap();
        assert_eq!(preds.len(), input.len());
        assert_eq!(tagger.name(), "rules");
    }
}
