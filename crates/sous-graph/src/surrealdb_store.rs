//! SurrealDB implementation of the record store
//!
//! Ingredients and tokens live in separate tables joined by a
//! `has_token` graph edge:
//!
//! ```text
//! ingredient:abc ->has_token-> token:xyz { position, value, label }
//! ```
//!
//! Author: sous maintainers

use async_trait::async_trait;
use serde::Deserialize;
use sous_core::{DatabaseConfig, LabelingStats, Record, RecordStore, Result, SousError, Token};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

const UNLABELED_QUERY: &str = r#"
SELECT <string> record::id(id) AS id, value, labelling_done, labelled_at,
    ->has_token->token.* AS tokens
FROM ingredient
WHERE labelling_done != true
ORDER BY rand()
LIMIT $limit
"#;

const RECORD_QUERY: &str = r#"
SELECT <string> record::id(id) AS id, value, labelling_done, labelled_at,
    ->has_token->token.* AS tokens
FROM type::thing('ingredient', $id)
"#;

const MISSING_MARKER: &str = "ingredient not found";
const LABELED_MARKER: &str = "ingredient already labeled";

// The labelling_done check runs inside the transaction, so a concurrent
// submission aborts before any token label is written.
const LABEL_TOKENS_QUERY: &str = r#"
BEGIN TRANSACTION;
LET $ingredient = type::thing('ingredient', $id);
LET $current = (SELECT labelling_done FROM ONLY $ingredient);
IF $current = NONE {
    THROW "ingredient not found";
};
IF $current.labelling_done = true {
    THROW "ingredient already labeled";
};
UPDATE $ingredient SET labelling_done = true, labelled_at = time::now();
FOR $token IN (SELECT id, position FROM $ingredient->has_token->token) {
    UPDATE $token.id SET label = array::at($labels, $token.position);
};
COMMIT TRANSACTION;
"#;

/// Map a failed label transaction onto the store error it signals
fn label_error(record_id: &str, message: &str) -> SousError {
    if message.contains(LABELED_MARKER) {
        SousError::Conflict(record_id.to_string())
    } else if message.contains(MISSING_MARKER) {
        SousError::NotFound(record_id.to_string())
    } else {
        SousError::DatabaseError(format!("Failed to store labels: {message}"))
    }
}

const STATS_QUERY: &str = r#"
SELECT count() AS total, count(labelling_done = true) AS labeled
FROM ingredient
GROUP ALL
"#;

/// SurrealDB record store
pub struct SurrealRecordStore {
    client: Surreal<Client>,
}

impl SurrealRecordStore {
    /// Create a new SurrealDB connection
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        // The surrealdb crate adds the scheme itself
        let url = config
            .surrealdb_url
            .strip_prefix("ws://")
            .or_else(|| config.surrealdb_url.strip_prefix("wss://"))
            .unwrap_or(&config.surrealdb_url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| SousError::DatabaseError(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| SousError::DatabaseError(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| SousError::DatabaseError(format!("SurrealDB namespace error: {e}")))?;

        tracing::info!(
            "Connected to SurrealDB {} ({}/{})",
            url,
            config.surrealdb_namespace,
            config.surrealdb_database
        );

        Ok(Self { client })
    }

    /// Initialize schema (run once on setup)
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS ingredient SCHEMALESS;
                DEFINE FIELD IF NOT EXISTS value ON ingredient TYPE string;
                DEFINE FIELD IF NOT EXISTS labelling_done ON ingredient TYPE option<bool>;
                DEFINE FIELD IF NOT EXISTS labelled_at ON ingredient TYPE option<datetime>;
                DEFINE INDEX IF NOT EXISTS idx_ingredient_done ON ingredient FIELDS labelling_done;

                DEFINE TABLE IF NOT EXISTS token SCHEMALESS;
                DEFINE FIELD IF NOT EXISTS position ON token TYPE int;
                DEFINE FIELD IF NOT EXISTS value ON token TYPE string;
                DEFINE FIELD IF NOT EXISTS label ON token TYPE option<string>;

                DEFINE TABLE IF NOT EXISTS has_token TYPE RELATION FROM ingredient TO token;
            "#,
            )
            .await
            .and_then(|response| response.check())
            .map_err(|e| SousError::DatabaseError(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    async fn load_record(&self, record_id: &str) -> Result<Option<Record>> {
        let rows: Vec<IngredientRow> = self
            .client
            .query(RECORD_QUERY)
            .bind(("id", record_id.to_string()))
            .await
            .map_err(|e| SousError::DatabaseError(format!("Query failed: {e}")))?
            .take(0)
            .map_err(|e| SousError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(rows.into_iter().next().map(Record::from))
    }
}

/// Ingredient row with its tokens
#[derive(Debug, Deserialize)]
struct IngredientRow {
    id: String,
    value: String,
    labelling_done: Option<bool>,
    labelled_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    tokens: Vec<TokenRow>,
}

/// Token row
#[derive(Debug, Deserialize)]
struct TokenRow {
    position: u32,
    value: String,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    total: u64,
    labeled: u64,
}

impl From<IngredientRow> for Record {
    fn from(row: IngredientRow) -> Self {
        let tokens = row
            .tokens
            .into_iter()
            .map(|t| Token {
                index: t.position,
                value: t.value,
                label: t.label,
            })
            .collect();

        let mut record = Record::new(row.id, row.value, tokens);
        record.labelling_done = row.labelling_done.unwrap_or(false);
        record.labelled_at = row.labelled_at;
        record
    }
}

#[async_trait]
impl RecordStore for SurrealRecordStore {
    async fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<Record>> {
        let rows: Vec<IngredientRow> = self
            .client
            .query(UNLABELED_QUERY)
            .bind(("limit", limit))
            .await
            .map_err(|e| SousError::DatabaseError(format!("Query failed: {e}")))?
            .take(0)
            .map_err(|e| SousError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn persist_labels(&self, record_id: &str, labels: &[String]) -> Result<()> {
        self.client
            .query(LABEL_TOKENS_QUERY)
            .bind(("id", record_id.to_string()))
            .bind(("labels", labels.to_vec()))
            .await
            .and_then(|response| response.check())
            .map_err(|e| label_error(record_id, &e.to_string()))?;

        tracing::debug!("Stored {} labels for ingredient {}", labels.len(), record_id);
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<Option<Record>> {
        self.load_record(record_id).await
    }

    async fn stats(&self) -> Result<LabelingStats> {
        let row: Option<StatsRow> = self
            .client
            .query(STATS_QUERY)
            .await
            .map_err(|e| SousError::DatabaseError(format!("Query failed: {e}")))?
            .take(0)
            .map_err(|e| SousError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(row
            .map(|r| LabelingStats {
                total: r.total,
                labeled: r.labeled,
                pending: r.total.saturating_sub(r.labeled),
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "surrealdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_record_sorts_tokens() {
        let row: IngredientRow = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "value": "2 cups flour",
            "labelling_done": null,
            "labelled_at": null,
            "tokens": [
                {"position": 2, "value": "flour", "label": null},
                {"position": 0, "value": "2", "label": null},
                {"position": 1, "value": "cups", "label": null}
            ]
        }))
        .unwrap();

        let record = Record::from(row);
        assert_eq!(record.id, "abc");
        assert_eq!(record.words(), vec!["2", "cups", "flour"]);
        assert!(!record.labelling_done);
    }

    #[test]
    fn test_row_without_tokens() {
        let row: IngredientRow = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "value": "",
            "labelling_done": true,
            "labelled_at": null
        }))
        .unwrap();

        let record = Record::from(row);
        assert!(record.tokens.is_empty());
        assert!(record.labelling_done);
    }

    #[test]
    fn test_label_error_mapping() {
        let err = label_error("r1", "An error occurred: ingredient already labeled");
        assert!(matches!(err, SousError::Conflict(id) if id == "r1"));

        let err = label_error("r2", "An error occurred: ingredient not found");
        assert!(matches!(err, SousError::NotFound(id) if id == "r2"));

        let err = label_error("r3", "connection reset");
        assert!(matches!(err, SousError::DatabaseError(_)));
    }

    async fn seed_ingredient(store: &SurrealRecordStore, id: &str, words: &[&str]) {
        store
            .client
            .query(
                r#"
                DELETE type::thing('ingredient', $id);
                CREATE type::thing('ingredient', $id) SET value = $value;
                FOR $t IN $tokens {
                    LET $token = (CREATE ONLY token CONTENT $t);
                    RELATE (type::thing('ingredient', $id))->has_token->($token.id);
                };
                "#,
            )
            .bind(("id", id.to_string()))
            .bind(("value", words.join(" ")))
            .bind((
                "tokens",
                words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| serde_json::json!({ "position": i, "value": w }))
                    .collect::<Vec<_>>(),
            ))
            .await
            .and_then(|response| response.check())
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB instance"]
    async fn test_surrealdb_second_submission_keeps_first_labels() {
        let store = SurrealRecordStore::new(&DatabaseConfig::default())
            .await
            .unwrap();
        store.init_schema().await.unwrap();
        seed_ingredient(&store, "twice", &["2", "cups", "flour"]).await;

        let first: Vec<String> = ["B-QTY", "B-UNIT", "B-NAME"].map(String::from).to_vec();
        let second: Vec<String> = ["OTHER", "OTHER", "OTHER"].map(String::from).to_vec();

        let (a, b) = tokio::join!(
            store.persist_labels("twice", &first),
            store.persist_labels("twice", &second)
        );
        assert!(a.is_ok() != b.is_ok(), "exactly one submission must win");

        let winner = if a.is_ok() { &first } else { &second };
        let record = store.get_record("twice").await.unwrap().unwrap();
        assert!(record.labelling_done);
        let stored: Vec<String> = record
            .tokens
            .iter()
            .map(|t| t.label.clone().unwrap_or_default())
            .collect();
        assert_eq!(&stored, winner);

        let err = store.persist_labels("twice", &second).await.unwrap_err();
        assert!(matches!(err, SousError::Conflict(_)));
        let record = store.get_record("twice").await.unwrap().unwrap();
        assert_eq!(record.tokens[0].label.as_deref(), Some(winner[0].as_str()));
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB instance"]
    async fn test_surrealdb_unknown_ingredient() {
        let store = SurrealRecordStore::new(&DatabaseConfig::default())
            .await
            .unwrap();
        store.init_schema().await.unwrap();

        let err = store
            .persist_labels("does-not-exist", &["OTHER".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, SousError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB instance"]
    async fn test_surrealdb_round_trip() {
        let store = SurrealRecordStore::new(&DatabaseConfig::default())
            .await
            .unwrap();
        store.init_schema().await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, stats.labeled + stats.pending);
    }
}
