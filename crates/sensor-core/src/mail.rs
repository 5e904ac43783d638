//! Outbound mail

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, SensorError};

/// Trait for mail delivery backends
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send a sign-in mail carrying the verification `url` and `code`
    async fn send_authentication_mail(&self, address: &str, url: &str, code: &str) -> Result<()>;
}

/// A mail accepted by [`LoggingMailSender`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub from: String,
    pub to: String,
    pub url: String,
    pub code: String,
    pub sent_at: DateTime<Utc>,
}

/// Mail sender that logs deliveries and keeps them in an outbox
///
/// Stands in for SMTP delivery. With `fail_delivery` set every send fails,
/// which exercises the failure path of callers.
pub struct LoggingMailSender {
    from_address: String,
    fail_delivery: bool,
    outbox: RwLock<Vec<SentMail>>,
}

impl LoggingMailSender {
    /// Create a new sender
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            fail_delivery: false,
            outbox: RwLock::new(Vec::new()),
        }
    }

    /// Make every delivery fail
    pub fn with_failing_delivery(mut self, fail: bool) -> Self {
        self.fail_delivery = fail;
        self
    }

    /// Mails delivered so far
    pub async fn sent(&self) -> Vec<SentMail> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl MailSender for LoggingMailSender {
    async fn send_authentication_mail(&self, address: &str, url: &str, code: &str) -> Result<()> {
        if self.fail_delivery {
            warn!("Refusing authentication mail to {}", address);
            return Err(SensorError::MailError(format!(
                "delivery to {} is disabled",
                address
            )));
        }

        if !address.contains('@') {
            return Err(SensorError::MailError(format!(
                "invalid recipient address: {}",
                address
            )));
        }

        info!("Sending authentication mail from {} to {}", self.from_address, address);

        self.outbox.write().await.push(SentMail {
            from: self.from_address.clone(),
            to: address.to_string(),
            url: url.to_string(),
            code: code.to_string(),
            sent_at: Utc::now(),
        });

        Ok(())
    }
}
