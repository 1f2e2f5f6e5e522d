//! lettre-backed [`EmailSender`] implementation.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use profi_auth::{AuthResult, EmailSender, OutgoingEmail};

use crate::config::MailConfig;
use crate::error::NotificationError;

/// Port that speaks TLS from the first byte; every other port upgrades
/// with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends [`OutgoingEmail`]s through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Validates `config` and builds a transport for its relay.
    ///
    /// No connection is opened until the first message is sent.
    ///
    /// # Errors
    ///
    /// - `NotificationError::InvalidConfig` if the settings fail validation
    ///   or the host is rejected by the transport
    /// - `NotificationError::InvalidAddress` if the sender cannot be parsed
    pub fn new(config: &MailConfig) -> Result<Self, NotificationError> {
        config.validate()?;

        let from = parse_mailbox(config.sender().unwrap_or_default())?;

        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let mut builder = builder
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> AuthResult<()> {
        let message = compose(&self.from, email)?;

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "Email accepted by relay");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Email delivery failed");
                Err(NotificationError::SendFailed(e.to_string()).into())
            }
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{address}: {e}")))
}

/// Builds the MIME message for `email`.
///
/// # Errors
///
/// - `NotificationError::InvalidAddress` if the recipient cannot be parsed
/// - `NotificationError::Build` if the content type or headers are invalid
pub fn compose(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, NotificationError> {
    let content_type = ContentType::parse(&email.content_type)
        .map_err(|e| NotificationError::Build(format!("content type: {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.clone())
        .header(content_type)
        .body(email.body.clone())
        .map_err(|e| NotificationError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from() -> Mailbox {
        "noreply@fitprofi.app".parse().unwrap()
    }

    #[test]
    fn test_compose_reset_email() {
        let email = OutgoingEmail::password_reset("a@b.com", "abc.def.ghi");
        let message = compose(&from(), &email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: noreply@fitprofi.app"));
        assert!(raw.contains("To: a@b.com"));
        assert!(raw.contains("Subject: FitProfi: reset password"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("abc.def.ghi"));
    }

    #[test]
    fn test_compose_rejects_bad_recipient() {
        let mut email = OutgoingEmail::password_reset("a@b.com", "t");
        email.to = "not an address".to_string();

        let err = compose(&from(), &email).unwrap_err();
        assert!(matches!(err, NotificationError::InvalidAddress(_)));
    }

    #[test]
    fn test_compose_rejects_bad_content_type() {
        let mut email = OutgoingEmail::password_reset("a@b.com", "t");
        email.content_type = "not a mime type".to_string();

        assert!(matches!(
            compose(&from(), &email),
            Err(NotificationError::Build(_))
        ));
    }

    #[test]
    fn test_new_rejects_missing_host() {
        let config = MailConfig {
            host: String::new(),
            port: 587,
            username: Some("a@b.com".to_string()),
            password: Some("x".to_string()),
            from: None,
        };
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(NotificationError::InvalidConfig(_))
        ));
    }
}
