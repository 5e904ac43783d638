//! `send-authentication-mail` tool

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::string_arg;
use crate::protocol::{McpError, McpInputSchema, McpTool, ToolCallResult};
use crate::registry::{ToolHandler, ValidationMode};
use sensor_core::MailSender;

/// Sends a sign-in mail carrying a fresh one-time code
pub struct SendAuthenticationMailTool {
    mailer: Arc<dyn MailSender>,
}

impl SendAuthenticationMailTool {
    pub const NAME: &'static str = "send-authentication-mail";
    pub const VALIDATION: ValidationMode = ValidationMode::Protocol;

    pub fn new(mailer: Arc<dyn MailSender>) -> Self {
        Self { mailer }
    }

    pub fn definition() -> McpTool {
        McpTool {
            name: Self::NAME.to_string(),
            description: "Send an authentication mail with a one-time sign-in code to an \
                          address. The code is appended to the verification URL."
                .to_string(),
            input_schema: McpInputSchema::required_strings(&[
                ("address", "Recipient mail address"),
                ("url", "Absolute verification URL the code is appended to"),
            ]),
        }
    }
}

/// Generate a one-time code and append it to the verification URL
fn verification_link(url: &str) -> Result<(Url, String), url::ParseError> {
    let mut link = Url::parse(url)?;
    let code = Uuid::new_v4().simple().to_string();
    link.query_pairs_mut().append_pair("code", &code);
    Ok((link, code))
}

#[async_trait]
impl ToolHandler for SendAuthenticationMailTool {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError> {
        let (Some(address), Some(url)) =
            (string_arg(&arguments, "address"), string_arg(&arguments, "url"))
        else {
            return Ok(ToolCallResult::error("Missing address or url"));
        };

        let (link, code) = match verification_link(url) {
            Ok(pair) => pair,
            Err(e) => {
                return Ok(ToolCallResult::error(format!(
                    "Invalid verification URL '{}': {}",
                    url, e
                )))
            }
        };

        match self
            .mailer
            .send_authentication_mail(address, link.as_str(), &code)
            .await
        {
            Ok(()) => {
                info!("Authentication mail sent to {}", address);
                Ok(ToolCallResult::text(format!(
                    "Authentication mail sent to {}",
                    address
                )))
            }
            Err(e) => {
                warn!("Authentication mail to {} failed: {}", address, e);
                Ok(ToolCallResult::error(format!(
                    "Could not send authentication mail to {}: {}",
                    address, e
                )))
            }
        }
    }
}
