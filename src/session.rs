use crate::models::auth::AccessToken;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Holds the access token of the authenticated session.
///
/// The OAuth callback sets it, logout clears it, and the dashboard reads it. Nothing else
/// touches the token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Option<AccessToken>;
    async fn set(&self, token: AccessToken);
    async fn clear(&self);
}

/// Single-slot store kept in process memory; a restart logs the user out.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slot: RwLock<Option<AccessToken>>,
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self) -> Option<AccessToken> {
        self.slot.read().await.clone()
    }

    async fn set(&self, token: AccessToken) {
        *self.slot.write().await = Some(token);
    }

    async fn clear(&self) {
        self.slot.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_lifecycle() {
        let store = InMemoryTokenStore::default();
        assert!(store.get().await.is_none());

        store.set(AccessToken::new("first").unwrap()).await;
        store.set(AccessToken::new("second").unwrap()).await;
        assert_eq!(store.get().await.unwrap().secret(), "second");

        store.clear().await;
        assert!(store.get().await.is_none());
    }
}
