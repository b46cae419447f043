//! Emotion classification of entry text.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct Emotion {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Sentiment classification is not configured")]
    Disabled,

    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Inference API answered {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl warp::reject::Reject for Error {}

#[async_trait::async_trait]
pub trait SentimentClassifier: Sync + Send {
    /// `Ok(None)` when the model returned no labels.
    async fn classify(&self, text: &str) -> Result<Option<Emotion>, Error>;

    fn enabled(&self) -> bool {
        true
    }
}

pub struct Disabled;

#[async_trait::async_trait]
impl SentimentClassifier for Disabled {
    async fn classify(&self, _text: &str) -> Result<Option<Emotion>, Error> {
        Err(Error::Disabled)
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// Hugging Face hosted inference for a text classification model.
pub struct HuggingFace {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HuggingFace {
    pub fn new(api_url: &str, model: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/{}", api_url.trim_end_matches('/'), model),
            api_key,
        })
    }
}

/// Single inputs come back either nested once per input or flat.
#[derive(Deserialize)]
#[serde(untagged)]
enum Labels {
    Batched(Vec<Vec<Emotion>>),
    Flat(Vec<Emotion>),
}

impl Labels {
    fn strongest(self) -> Option<Emotion> {
        let labels = match self {
            Labels::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            Labels::Flat(labels) => labels,
        };
        labels
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for HuggingFace {
    async fn classify(&self, text: &str) -> Result<Option<Emotion>, Error> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream { status, body });
        }

        let labels: Labels = resp.json().await?;
        let emotion = labels.strongest();
        tracing::debug!(?emotion, "classified entry");
        Ok(emotion)
    }
}

/// Label to store with an entry. Failures only cost the entry its sentiment.
pub async fn label_for(classifier: &dyn SentimentClassifier, text: &str) -> Option<String> {
    if !classifier.enabled() {
        return None;
    }

    match classifier.classify(text).await {
        Ok(emotion) => emotion.map(|e| e.label),
        Err(e) => {
            tracing::warn!("Can't classify entry: {}", e);
            None
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels every text with a fixed emotion.
    pub struct Fixed(pub &'static str);

    #[async_trait::async_trait]
    impl SentimentClassifier for Fixed {
        async fn classify(&self, _text: &str) -> Result<Option<Emotion>, Error> {
            Ok(Some(Emotion {
                label: self.0.to_owned(),
                score: 0.9,
            }))
        }
    }

    /// Enabled, but every request fails upstream.
    pub struct Failing;

    #[async_trait::async_trait]
    impl SentimentClassifier for Failing {
        async fn classify(&self, _text: &str) -> Result<Option<Emotion>, Error> {
            Err(Error::Upstream {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "model is loading".to_owned(),
            })
        }
    }

    /// Labels with the number of the call, `mood-1`, `mood-2`, ...
    #[derive(Default)]
    pub struct Counting(AtomicUsize);

    #[async_trait::async_trait]
    impl SentimentClassifier for Counting {
        async fn classify(&self, _text: &str) -> Result<Option<Emotion>, Error> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(Emotion {
                label: format!("mood-{}", n),
                score: 1.0,
            }))
        }
    }

    #[test]
    fn picks_strongest_label() {
        let batched: Labels = serde_json::from_str(
            r#"[[{"label":"neutral","score":0.2},{"label":"joy","score":0.7},{"label":"fear","score":0.1}]]"#,
        )
        .unwrap();
        assert_eq!(batched.strongest().unwrap().label, "joy");

        let flat: Labels =
            serde_json::from_str(r#"[{"label":"sadness","score":0.6},{"label":"joy","score":0.3}]"#)
                .unwrap();
        assert_eq!(flat.strongest().unwrap().label, "sadness");

        let empty: Labels = serde_json::from_str("[]").unwrap();
        assert!(empty.strongest().is_none());
    }

    #[test]
    fn endpoint_joins_model() {
        let hf = HuggingFace::new(
            "https://api-inference.huggingface.co/models/",
            "SamLowe/roberta-base-go_emotions",
            "key".to_owned(),
        )
        .unwrap();
        assert_eq!(
            hf.endpoint,
            "https://api-inference.huggingface.co/models/SamLowe/roberta-base-go_emotions"
        );
    }

    #[tokio::test]
    async fn labels() {
        assert_eq!(label_for(&Disabled, "hello").await, None);
        assert_eq!(
            label_for(&Fixed("joy"), "hello").await,
            Some("joy".to_owned())
        );
        assert_eq!(label_for(&Failing, "hello").await, None);
    }
}
