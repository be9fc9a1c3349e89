//! Outbound mail over SMTP.
//!
//! Mail is optional: without a `[mail]` config section the service is a
//! no-op and callers proceed as if the send succeeded.

use launchdesk_common::{AppError, AppResult, config::MailConfig};
use launchdesk_db::entities::Role;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use sea_orm::prelude::DateTimeWithTimeZone;

/// SMTP mailer for invite emails.
#[derive(Clone)]
pub struct MailerService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    base_url: String,
}

impl MailerService {
    /// Build the mailer. `config` absent means mail is disabled.
    pub fn new(config: Option<&MailConfig>, base_url: &str) -> AppResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let Some(cfg) = config else {
            return Ok(Self {
                transport: None,
                from: None,
                base_url,
            });
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .map_err(|e| AppError::Mail(e.to_string()))?
            .port(cfg.port);
        if let (Some(username), Some(password)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = cfg
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("Invalid from address: {e}")))?;

        Ok(Self {
            transport: Some(builder.build()),
            from: Some(from),
            base_url,
        })
    }

    /// Whether an SMTP transport is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send an invite email with the registration link.
    pub async fn send_invite(
        &self,
        email: &str,
        code: &str,
        role: Role,
        expires_at: DateTimeWithTimeZone,
    ) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::debug!(email = %email, "Mailer not configured; skipping invite email");
            return Ok(());
        };

        let to = email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("Invalid recipient address: {e}")))?;

        let link = format!("{}/register?code={code}", self.base_url);
        let body = format!(
            "You have been invited to join the Launchdesk back office as {}.\n\n\
             Complete your registration here:\n{link}\n\n\
             This invite expires on {}.\n",
            role_label(role),
            expires_at.format("%Y-%m-%d %H:%M %Z"),
        );

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject("Your Launchdesk invite")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Mail(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        tracing::info!(email = %email, "Sent invite email");
        Ok(())
    }
}

const fn role_label(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "a super admin",
        Role::Admin => "an admin",
        Role::Moderator => "a moderator",
    }
}
