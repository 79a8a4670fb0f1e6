//! Shared fixtures: in-memory database, capturing mailer, test config.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use gatehouse_server::config::Config;
use gatehouse_server::mail::{MailError, Mailer};

pub async fn setup_db() -> DatabaseConnection {
    // Pin the pool to one connection: every sqlite in-memory connection is
    // its own empty database, so a wider pool would hand concurrent sessions
    // an unmigrated schema.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    options.sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("sqlite in-memory connect");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        public_base_url: "https://app.example.com".to_string(),
        mail_api_key: "unused".to_string(),
        mail_sender_email: "noreply@example.com".to_string(),
        mail_sender_name: None,
        // Low so tests stay fast; production default is 600k.
        password_iterations: 1_000,
        verification_ttl_secs: 24 * 60 * 60,
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl SentMail {
    /// Pull the verification token out of the emailed link.
    pub fn token(&self) -> String {
        let start = self.html.find("token=").expect("link in email") + "token=".len();
        self.html[start..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect()
    }
}

/// Captures outbound mail instead of delivering it.
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl MockMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> SentMail {
        self.sent.lock().unwrap().last().expect("mail sent").clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(
        &self,
        to_email: &str,
        _to_name: Option<&str>,
        subject: &str,
        html: String,
    ) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to_email.to_string(),
            subject: subject.to_string(),
            html,
        });
        Ok(())
    }
}

/// Refuses every message, as a down mail provider would.
pub struct FailMailer;

#[async_trait]
impl Mailer for FailMailer {
    async fn send(
        &self,
        _to_email: &str,
        _to_name: Option<&str>,
        _subject: &str,
        _html: String,
    ) -> Result<(), MailError> {
        Err(MailError::Rejected {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}
