//! View models shared by the HTML page and the JSON API

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use sous_core::{LabelingStats, Record};
use sous_tagger::form::label_field_name;
use utoipa::ToSchema;

/// Characters escaped in a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Form action that submits labels for `record_id`
pub fn submit_path(record_id: &str) -> String {
    format!(
        "/ingredient/{}",
        utf8_percent_encode(record_id, PATH_SEGMENT)
    )
}

/// One token with its suggested label
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenView {
    /// Token position within the ingredient
    pub index: u32,
    /// Token text
    #[schema(example = "cups")]
    pub value: String,
    /// Form field carrying this token's label
    #[schema(example = "label_1")]
    pub field: String,
    /// Label suggested by the model
    #[schema(example = "B-UNIT")]
    pub prediction: String,
}

/// An ingredient ready for review
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientView {
    /// Ingredient record ID
    pub ingredient_id: String,
    /// URL the labeling form posts to
    #[schema(example = "/ingredient/r1")]
    pub action: String,
    /// Raw ingredient text
    #[schema(example = "2 cups all-purpose flour")]
    pub value: String,
    /// Tokens in index order
    pub tokens: Vec<TokenView>,
}

impl IngredientView {
    /// Pair a record's tokens with predictions by position
    pub fn new(record: &Record, predictions: Vec<String>) -> Self {
        let tokens = record
            .tokens
            .iter()
            .zip(predictions)
            .map(|(token, prediction)| TokenView {
                index: token.index,
                value: token.value.clone(),
                field: label_field_name(token.index),
                prediction,
            })
            .collect();

        Self {
            ingredient_id: record.id.clone(),
            action: submit_path(&record.id),
            value: record.value.clone(),
            tokens,
        }
    }
}

/// Labeling progress
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total: u64,
    pub labeled: u64,
    pub pending: u64,
    /// Percentage of records labeled
    #[schema(example = 42.5)]
    pub completion_rate: f32,
}

impl From<LabelingStats> for StatsResponse {
    fn from(stats: LabelingStats) -> Self {
        Self {
            total: stats.total,
            labeled: stats.labeled,
            pending: stats.pending,
            completion_rate: stats.completion_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_view_pairs_by_position() {
        let record = Record::from_text("r1", "2 cups flour");
        let view = IngredientView::new(
            &record,
            vec!["B-QTY".into(), "B-UNIT".into(), "B-NAME".into()],
        );

        assert_eq!(view.ingredient_id, "r1");
        assert_eq!(view.tokens.len(), 3);
        assert_eq!(view.tokens[1].field, "label_1");
        assert_eq!(view.tokens[1].prediction, "B-UNIT");
    }

    #[test]
    fn test_submit_path_escapes_reserved_characters() {
        assert_eq!(submit_path("r1"), "/ingredient/r1");
        assert_eq!(submit_path("a/b?c#d"), "/ingredient/a%2Fb%3Fc%23d");
        assert_eq!(submit_path("50% off"), "/ingredient/50%25%20off");

        let record = Record::from_text("bowl/1", "salt");
        let view = IngredientView::new(&record, vec!["B-NAME".into()]);
        assert_eq!(view.action, "/ingredient/bowl%2F1");
    }
}
