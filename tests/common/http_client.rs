use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub engine: String,
    pub uploads: String,
    pub reference_corpus: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

impl ReadyResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    pub file_id: String,
    pub verdict: String,
    pub confidence: f64,
    pub engine: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

pub enum CheckOutcome {
    Ok(CheckResponse),
    Err(reqwest::StatusCode, ErrorResponse),
}

pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> reqwest::Result<HealthResponse> {
        self.client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?
            .json()
            .await
    }

    pub async fn ready(&self) -> reqwest::Result<ReadyResponse> {
        self.client
            .get(format!("{}/ready", self.base_url))
            .send()
            .await?
            .json()
            .await
    }

    /// Posts `bytes` under the given multipart field name.
    pub async fn check_field(
        &self,
        field: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> reqwest::Result<CheckOutcome> {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part(field.to_string(), part);

        let response = self
            .client
            .post(format!("{}/check_copyright", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(CheckOutcome::Ok(response.json().await?))
        } else {
            Ok(CheckOutcome::Err(status, response.json().await?))
        }
    }

    pub async fn check(&self, filename: &str, bytes: Vec<u8>) -> reqwest::Result<CheckOutcome> {
        self.check_field("image", filename, bytes).await
    }
}
