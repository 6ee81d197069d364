//! Outbound email delivery through the hosted provider's HTTP API.
//!
//! The `Mailer` trait is the seam between the alert job and the delivery
//! collaborator: production uses `ResendMailer` (Resend-compatible JSON
//! API), tests substitute in-memory fakes. Sending is a single blocking
//! POST; there is no retry here — the invoking scheduler owns recovery.

use serde::Serialize;
use thiserror::Error;

use crate::config::AlertConfig;

/// One fully-rendered email ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Errors from the delivery collaborator.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Cannot reach email provider at {0}")]
    Connection(String),

    #[error("Email provider request failed: {0}")]
    HttpClient(String),

    #[error("Email provider rejected the send: HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Delivery seam. Implementations must not retry internally.
pub trait Mailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// HTTP client for a Resend-compatible email API.
pub struct ResendMailer {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ResendMailer {
    /// Create a mailer pointing at the given API base URL.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Mailer configured from alert settings, with a 30s send timeout.
    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(&config.resend_base_url, &config.resend_api_key, 30)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for POST /emails
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

impl Mailer for ResendMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &email.from,
            to: vec![&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    MailerError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    MailerError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    MailerError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let mailer = ResendMailer::new("https://api.resend.test/", "key", 30);
        assert_eq!(mailer.base_url(), "https://api.resend.test");
    }

    #[test]
    fn request_body_shape() {
        let body = SendEmailRequest {
            from: "Formatrack <alerts@formatrack.app>",
            to: vec!["admin@example.com"],
            subject: "2 certificates due",
            html: "<p>hi</p>",
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&body).unwrap()).unwrap();
        assert_eq!(json["from"], "Formatrack <alerts@formatrack.app>");
        assert_eq!(json["to"][0], "admin@example.com");
        assert_eq!(json["subject"], "2 certificates due");
        assert_eq!(json["html"], "<p>hi</p>");
    }

    #[test]
    fn api_error_carries_provider_detail() {
        let err = MailerError::Api {
            status: 422,
            body: "{\"message\":\"invalid from\"}".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("invalid from"));
    }
}
