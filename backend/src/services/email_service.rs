use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pulldown_cmark::{html, Options, Parser};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::text_processing::strip_code_fence;

/// Errors that can occur when sending emails
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Invalid email configuration: {0}")]
    ConfigurationError(String),
}

/// Result type for email operations
pub type EmailResult<T> = Result<T, EmailError>;

impl From<EmailError> for crate::errors::AppError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::ConfigurationError(msg) => Self::ConfigError(msg),
            EmailError::SendFailed(msg) => Self::DeliveryFailed(msg),
        }
    }
}

/// Trait defining email sending capabilities
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Deliver a markdown report to the user as a plain-text + HTML email.
    async fn send_report(&self, to_email: &str, subject: &str, markdown_body: &str)
        -> EmailResult<()>;
}

/// Renders markdown to an HTML fragment for the email's HTML part.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// Development email service that logs the report to the console instead of
/// sending actual emails
#[derive(Debug, Clone, Default)]
pub struct LoggingEmailService;

#[async_trait]
impl EmailService for LoggingEmailService {
    async fn send_report(
        &self,
        to_email: &str,
        subject: &str,
        markdown_body: &str,
    ) -> EmailResult<()> {
        let body = strip_code_fence(markdown_body);
        info!(
            to_email = %to_email,
            subject = %subject,
            body_len = body.len(),
            "📧 CONTRACT REPORT (DEV MODE) - email suppressed, logging instead"
        );
        Ok(())
    }
}

/// Production email service delivering through an authenticated SMTP relay
/// over implicit TLS.
#[derive(Clone, Debug)]
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpEmailService {
    /// Builds the relay transport from the configured host/port/credentials.
    /// Missing credentials are a configuration error raised here, before any
    /// network call.
    pub fn new(config: &Config) -> EmailResult<Self> {
        let sender_email = config.sender_email.clone().ok_or_else(|| {
            EmailError::ConfigurationError("SENDER_EMAIL environment variable is required".into())
        })?;
        let password = config.email_password.clone().ok_or_else(|| {
            EmailError::ConfigurationError("EMAIL_PASSWORD environment variable is required".into())
        })?;

        let sender: Mailbox = sender_email
            .parse()
            .map_err(|e| EmailError::ConfigurationError(format!("invalid SENDER_EMAIL: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| EmailError::ConfigurationError(format!("invalid SMTP relay: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(sender_email, password))
            .build();

        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_report(
        &self,
        to_email: &str,
        subject: &str,
        markdown_body: &str,
    ) -> EmailResult<()> {
        let recipient: Mailbox = to_email
            .parse()
            .map_err(|e| EmailError::ConfigurationError(format!("invalid recipient: {e}")))?;

        // Defensive cleanup: the pipeline occasionally wraps the whole report
        // in a code fence.
        let plain_body = strip_code_fence(markdown_body);
        let html_body = render_markdown(&plain_body);

        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| EmailError::SendFailed(format!("failed to build message: {e}")))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!(to_email = %to_email, subject = %subject, "Summary email sent via SMTP relay");
                Ok(())
            }
            Err(e) => {
                error!(to_email = %to_email, error = %e, "Failed to send summary email");
                Err(EmailError::SendFailed(e.to_string()))
            }
        }
    }
}

/// Create an email service based on environment configuration
pub fn create_email_service(config: &Config) -> EmailResult<Arc<dyn EmailService + Send + Sync>> {
    match config.app_env.as_str() {
        "production" | "staging" => {
            info!("Creating SMTP email service for {}", config.app_env);
            Ok(Arc::new(SmtpEmailService::new(config)?))
        }
        _ => {
            info!("Creating logging email service for development");
            Ok(Arc::new(LoggingEmailService))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_markdown_produces_html() {
        let html = render_markdown("# Summary\n\n- one\n- two");
        assert!(html.contains("<h1>Summary</h1>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn smtp_service_requires_credentials() {
        let config = Config::default();
        let err = SmtpEmailService::new(&config).unwrap_err();
        assert!(matches!(err, EmailError::ConfigurationError(_)));

        let config = Config {
            sender_email: Some("reports@example.com".into()),
            ..Config::default()
        };
        let err = SmtpEmailService::new(&config).unwrap_err();
        assert!(err.to_string().contains("EMAIL_PASSWORD"));
    }

    #[test]
    fn factory_defaults_to_logging_service() {
        let config = Config::default();
        assert!(create_email_service(&config).is_ok());
    }

    #[tokio::test]
    async fn logging_service_always_succeeds() {
        let service = LoggingEmailService;
        service
            .send_report("user@example.com", "Contract Summary Report", "# Report")
            .await
            .expect("logging service never fails");
    }
}
