use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail API rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound email delivery, behind a trait so the workflow can be exercised
/// with a capturing mock.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        subject: &str,
        html: String,
    ) -> Result<(), MailError>;
}

pub fn verification_email_subject() -> &'static str {
    "Verify Your Email"
}

/// Human rendering of the secret's TTL; sub-hour windows are given in
/// minutes so a short TTL never reads as "0 hours".
fn ttl_window(ttl_secs: i64) -> String {
    let hours = ttl_secs / 3600;
    if hours >= 1 {
        format!("{hours} hour{}", if hours == 1 { "" } else { "s" })
    } else {
        let minutes = (ttl_secs / 60).max(1);
        format!("{minutes} minute{}", if minutes == 1 { "" } else { "s" })
    }
}

pub fn verification_email_html(link: &str, ttl_secs: i64) -> String {
    format!(
        concat!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">",
            "<h2 style=\"color: #333; text-align: center;\">Verify Your Email Address</h2>",
            "<p style=\"color: #666; text-align: center;\">",
            "Click the button below to verify your email address:</p>",
            "<div style=\"text-align: center; margin: 30px 0;\">",
            "<a href=\"{link}\" style=\"background-color: #2563eb; color: white; ",
            "padding: 12px 24px; text-decoration: none; border-radius: 5px; ",
            "display: inline-block;\">Verify Email</a></div>",
            "<p style=\"color: #666; text-align: center;\">",
            "This link will expire in {ttl}.</p>",
            "</div>",
        ),
        link = link,
        ttl = ttl_window(ttl_secs),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
}

/// Transactional email over the Brevo HTTP API.
pub struct BrevoMailer {
    client: reqwest::Client,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            sender_email,
            sender_name,
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        subject: &str,
        html: String,
    ) -> Result<(), MailError> {
        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: to_email.to_string(),
                name: to_name.map(|s| s.to_string()),
            }],
            subject: subject.to_string(),
            html_content: html,
        };

        let resp = self
            .client
            .post("https://api.brevo.com/v3/smtp/email")
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
