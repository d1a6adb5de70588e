use super::{ChatSummary, Conversation, HistoryProvider};
use crate::Result;
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct EmptyHistory;

#[async_trait]
impl HistoryProvider for EmptyHistory {
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>> {
        debug!("No chat history stored for {}", user_id);
        Ok(Vec::new())
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        debug!("No conversations stored for {}", user_id);
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listings_are_empty() {
        let history = EmptyHistory;
        assert!(history.list_chats("user").await.unwrap().is_empty());
        assert!(history.list_conversations("user").await.unwrap().is_empty());
    }
}
