//! Result-link e-mail through an EmailJS-compatible REST API.
//!
//! The submit flow never calls this; the backend mails results itself when the
//! `send_mail` flag is set. This is the explicit re-send path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::config::EmailJsConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("e-mail request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("e-mail API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Acknowledgment returned by the e-mail API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub status: u16,
    pub text: String,
}

#[async_trait]
pub trait ResultMailer: Send + Sync {
    async fn send_result_email(
        &self,
        recipient: &str,
        result_link: &str,
    ) -> Result<MailReceipt, MailError>;
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    result_link: &'a str,
}

#[derive(Debug, Clone)]
pub struct EmailJsClient {
    client: Client,
    config: EmailJsConfig,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: EmailJsConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ResultMailer for EmailJsClient {
    async fn send_result_email(
        &self,
        recipient: &str,
        result_link: &str,
    ) -> Result<MailReceipt, MailError> {
        let request = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: TemplateParams {
                to_email: recipient,
                result_link,
            },
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        info!(template = %self.config.template_id, "result e-mail accepted");
        Ok(MailReceipt {
            status: status.as_u16(),
            text,
        })
    }
}
