// Module exports
pub mod message;
pub mod telegram;

// Public exports
pub use message::{compose_message, StrategyNotes};
pub use telegram::TelegramNotifier;

use async_trait::async_trait;

/// Delivery result for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    /// The API answered with something other than 200
    Rejected { status: u16, body: String },
    /// The request never got an answer
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    pub chat_id: String,
    pub status: DeliveryStatus,
}

/// Per-recipient results, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<RecipientOutcome>,
}

impl DeliveryReport {
    pub fn push(&mut self, chat_id: impl Into<String>, status: DeliveryStatus) {
        self.outcomes.push(RecipientOutcome {
            chat_id: chat_id.into(),
            status,
        });
    }

    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DeliveryStatus::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Sends a plain-text message to every configured recipient.
///
/// Implementations report failures per recipient and never abort early.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> DeliveryReport;
}
