//! Chat history capability. Nothing is persisted; the only implementation
//! reports empty listings.

mod stub;
mod types;

pub use stub::EmptyHistory;
pub use types::*;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>>;

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>>;
}
