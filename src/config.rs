use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BRAND_NAME: &str = "XplainIQ lite: Channel Readiness Scoring Index";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub leads_csv_path: PathBuf,
    pub questionnaire_path: Option<PathBuf>, // Falls back to the built-in questionnaire
    pub submit_cooldown_secs: u64,
    pub brand_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            leads_csv_path: std::env::var("LEADS_CSV_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("leads.csv")),
            questionnaire_path: std::env::var("QUESTIONNAIRE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            submit_cooldown_secs: std::env::var("SUBMIT_COOLDOWN_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("SUBMIT_COOLDOWN_SECS must be a non-negative number")
                })?,
            brand_name: std::env::var("BRAND_NAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_BRAND_NAME.to_string()),
        };

        tracing::debug!("Leads CSV path: {}", config.leads_csv_path.display());
        if let Some(ref path) = config.questionnaire_path {
            tracing::info!("Questionnaire override configured: {}", path.display());
        }
        tracing::debug!("Submit cooldown: {}s", config.submit_cooldown_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
