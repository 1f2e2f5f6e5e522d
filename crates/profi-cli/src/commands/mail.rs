use anyhow::Result;
use profi_auth::{EmailSender, OutgoingEmail};
use profi_notifications::{MailConfig, SmtpMailer};

use crate::cli::SendTestEmailArgs;
use crate::output::print_success;

pub async fn send_test_email(config: &MailConfig, args: &SendTestEmailArgs) -> Result<()> {
    let mailer = SmtpMailer::new(config)?;
    let email = OutgoingEmail {
        to: args.to.clone(),
        subject: "FitProfi: test email".to_string(),
        content_type: "text/plain".to_string(),
        body: "This is a test message from the profi CLI.".to_string(),
    };

    mailer.send_email(&email).await?;
    print_success(&format!("Test email sent to {}", args.to));
    Ok(())
}
