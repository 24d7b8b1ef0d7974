use async_trait::async_trait;
use reqwest::Client;

use crate::config::SheetsConfig;
use crate::error::AppError;

/// Spreadsheet append side channel. Each accepted submission is mirrored
/// as one row; the store of record stays the database.
#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn append(&self, row: &[String]) -> Result<(), AppError>;
}

pub struct HttpSheetSink {
    client: Client,
    config: SheetsConfig,
}

impl HttpSheetSink {
    pub fn new(config: SheetsConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SheetSink for HttpSheetSink {
    async fn append(&self, row: &[String]) -> Result<(), AppError> {
        let request_body = serde_json::json!({ "values": [row] });

        let response = self
            .client
            .post(&self.config.append_url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Sheets transport error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Sheets API error {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}

pub struct NoopSheetSink;

#[async_trait]
impl SheetSink for NoopSheetSink {
    async fn append(&self, _row: &[String]) -> Result<(), AppError> {
        Ok(())
    }
}
