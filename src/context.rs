use crate::{
    journal_storage::{JournalStorage, SqliteJournals},
    sentiment::{self, SentimentClassifier},
    user_storage::{SqliteStorage, UserAccount, UserStorage},
};
use anyhow::Context as AnyhowContext;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::Arc,
};

#[derive(derive_more::Deref, Clone)]
pub struct Context(Arc<DataInner>);

impl Context {
    pub async fn from_env() -> Result<Self, anyhow::Error> {
        let cfg: Config = envy::from_env().context("Invalid configuration in environment")?;
        let pool = crate::sqlite::open(&cfg.db_file, cfg.db_pool_size).await?;

        let classifier: Box<dyn SentimentClassifier> = match &cfg.hf_api_key {
            Some(key) => {
                tracing::info!(model = %cfg.sentiment_model, "sentiment classification enabled");
                Box::new(sentiment::HuggingFace::new(
                    &cfg.hf_api_url,
                    &cfg.sentiment_model,
                    key.clone(),
                )?)
            }
            None => {
                tracing::info!("HF_API_KEY not set, sentiment classification disabled");
                Box::new(sentiment::Disabled)
            }
        };

        Ok(Self::new(cfg, pool, classifier))
    }

    pub fn new(
        config: Config,
        pool: sqlx::SqlitePool,
        classifier: Box<dyn SentimentClassifier>,
    ) -> Self {
        Self(Arc::new(DataInner {
            user_storage: Box::new(SqliteStorage::new(pool.clone())),
            journals: Box::new(SqliteJournals::new(pool)),
            classifier,
            config,
        }))
    }

    pub fn site<'a>(&'a self, account: Option<&'a UserAccount>) -> Site<'a> {
        Site {
            name: &self.config.app_name,
            footer: &self.config.footer,
            account,
        }
    }

    pub fn registration_possible(&self) -> bool {
        self.config.registration_enabled
    }
}

pub struct DataInner {
    pub user_storage: Box<dyn UserStorage>,
    pub journals: Box<dyn JournalStorage>,
    pub classifier: Box<dyn SentimentClassifier>,
    pub config: Config,
}

/// What every page needs to render its chrome.
#[derive(Clone, Copy)]
pub struct Site<'a> {
    pub name: &'a str,
    pub footer: &'a str,
    pub account: Option<&'a UserAccount>,
}

#[derive(serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_db_file")]
    pub db_file: String,

    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: u32,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_ip_addr")]
    pub ip_addr: IpAddr,

    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_footer")]
    pub footer: String,

    #[serde(default = "tru")]
    pub registration_enabled: bool,

    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    pub hf_api_key: Option<String>,

    #[serde(default = "default_hf_api_url")]
    pub hf_api_url: String,

    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
}

impl Config {
    #[cfg(test)]
    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}

fn tru() -> bool {
    true
}

fn default_db_file() -> String {
    String::from("/data/db/daybook.sqlite")
}

fn default_db_pool_size() -> u32 {
    4
}

fn default_port() -> u16 {
    8080
}

fn default_ip_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("/usr/lib/daybook/static")
}

fn default_app_name() -> String {
    "daybook".to_owned()
}

fn default_footer() -> String {
    "daybook".into()
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_hf_api_url() -> String {
    "https://api-inference.huggingface.co/models".to_owned()
}

fn default_sentiment_model() -> String {
    "SamLowe/roberta-base-go_emotions".to_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::from_iter(Vec::new()).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.session_ttl_secs, 3600);
        assert!(cfg.registration_enabled);
        assert!(cfg.hf_api_key.is_none());
    }

    #[test]
    fn overrides() {
        let cfg = Config::from_iter(vec![
            ("PORT".to_owned(), "3000".to_owned()),
            ("REGISTRATION_ENABLED".to_owned(), "false".to_owned()),
            ("HF_API_KEY".to_owned(), "hf_secret".to_owned()),
        ])
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.registration_enabled);
        assert_eq!(cfg.hf_api_key.as_deref(), Some("hf_secret"));
    }
}
