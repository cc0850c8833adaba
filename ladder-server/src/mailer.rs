use std::sync::Arc;

use async_trait::async_trait;
use ladder_persistence::GroupRepository;
use ladder_types::InviteStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Outgoing email:\n{}",
            message.body
        );
        Ok(())
    }
}

/// Sends a group invite in the background and records the delivery result
/// on the invite row.
pub fn dispatch_group_invite(
    mailer: Arc<dyn Mailer>,
    groups: Arc<GroupRepository>,
    token_hash: String,
    message: EmailMessage,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let (status, last_error) = match mailer.send(&message).await {
            Ok(()) => {
                tracing::info!("Group invite sent to {}", message.to);
                (InviteStatus::Sent, None)
            }
            Err(err) => {
                tracing::error!("Failed to send group invite to {}: {:#}", message.to, err);
                (InviteStatus::Failed, Some(err.to_string()))
            }
        };
        if let Err(err) = groups.set_invite_status(&token_hash, status, last_error).await {
            tracing::error!("Failed to update invite status: {:#}", err);
        }
    })
}
