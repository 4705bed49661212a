//! A [`Mailer`] that records messages in memory.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{MailError, Mailer, OutgoingEmail};

/// Captures every sent message. Can be switched to fail on send.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: std::sync::atomic::AtomicBool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `send` fail with a build error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(MailError::Build("delivery disabled".to_string()));
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}
