//! HTTP client for a remote NER model server
//!
//! The model server exposes `POST /predict` taking `{"words": [...]}` and
//! answering `{"labels": [...]}` with one label per word.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sous_core::{ModelConfig, Predictor, Result, SousError};

/// Predictor backed by a model server
pub struct HttpPredictor {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    words: &'a [String],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    labels: Vec<String>,
}

impl HttpPredictor {
    /// Create a client for the model server at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SousError::ModelError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, words: &[String]) -> Result<Vec<String>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&PredictRequest { words })
            .send()
            .await
            .map_err(|e| SousError::ModelError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SousError::ModelError(format!(
                "Model server returned {status}: {error_text}"
            )));
        }

        let result: PredictResponse = response
            .json()
            .await
            .map_err(|e| SousError::ModelError(format!("Failed to parse response: {e}")))?;

        if result.labels.len() != words.len() {
            return Err(SousError::ModelError(format!(
                "Model returned {} labels for {} words",
                result.labels.len(),
                words.len()
            )));
        }

        Ok(result.labels)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_model_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_predict_round_trip() {
        let router = Router::new().route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                let n = body["words"].as_array().map(Vec::len).unwrap_or(0);
                Json(json!({ "labels": vec!["B-NAME"; n] }))
            }),
        );
        let url = spawn_model_server(router).await;

        let predictor = HttpPredictor::new(url, Duration::from_secs(5)).unwrap();
        let labels = predictor.predict(&words(&["fresh", "basil"])).await.unwrap();

        assert_eq!(labels, vec!["B-NAME", "B-NAME"]);
    }

    #[tokio::test]
    async fn test_predict_length_mismatch() {
        let router = Router::new().route(
            "/predict",
            post(|| async { Json(json!({ "labels": ["B-QTY"] })) }),
        );
        let url = spawn_model_server(router).await;

        let predictor = HttpPredictor::new(url, Duration::from_secs(5)).unwrap();
        let err = predictor
            .predict(&words(&["2", "eggs"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SousError::ModelError(msg) if msg.contains("1 labels for 2 words")));
    }

    #[tokio::test]
    async fn test_predict_server_error() {
        let router = Router::new().route(
            "/predict",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        );
        let url = spawn_model_server(router).await;

        let predictor = HttpPredictor::new(url, Duration::from_secs(5)).unwrap();
        let err = predictor.predict(&words(&["salt"])).await.unwrap_err();

        assert!(matches!(err, SousError::ModelError(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let predictor =
            HttpPredictor::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(predictor.predict(&[]).await.unwrap().is_empty());
        assert_eq!(predictor.base_url(), "http://127.0.0.1:9");
    }
}
