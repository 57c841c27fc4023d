//! Auth service - session token and user profile
//!
//! The OAuth flow itself runs on the backend: the user is sent to
//! `/auth/google` and comes back to `/auth/<token>` (or `?token=<token>`).
//! This service consumes that return URL once, persists the token and keeps
//! the profile of the signed-in user.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{SessionToken, User};
use crate::ports::{CashbackApi, TokenStore};

#[derive(Debug, Default)]
struct AuthState {
    user: Option<User>,
    first_attempt_done: bool,
}

/// Auth service for session and profile state
pub struct AuthService {
    api: Arc<dyn CashbackApi>,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<AuthState>,
}

impl AuthService {
    pub fn new(api: Arc<dyn CashbackApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            state: RwLock::new(AuthState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The first authentication attempt finished, or a user is signed in
    pub fn is_ready(&self) -> bool {
        let state = self.read();
        state.first_attempt_done || state.user.is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().user.is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn has_token(&self) -> Result<bool> {
        Ok(self.tokens.load()?.is_some())
    }

    pub fn after_first_authentication_try(&self) {
        self.write().first_attempt_done = true;
    }

    /// Load the profile of the signed-in user
    ///
    /// Without a stored token this is a no-op. A rejected token is removed so
    /// the client falls back to the signed-out state.
    pub async fn fetch_user_data(&self) -> Result<()> {
        let Some(token) = self.tokens.load()? else {
            debug!("no session token, skipping profile fetch");
            return Ok(());
        };

        let json = match self.api.fetch_me(&token).await {
            Ok(json) => json,
            Err(e @ Error::Unauthenticated(_)) => {
                warn!("session token rejected, signing out");
                self.logout()?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let user = User::from_json(json)?;
        debug!(user_id = %user.id, "profile loaded");
        self.write().user = Some(user);
        Ok(())
    }

    /// Fetch the profile and mark the first attempt as done either way
    pub async fn refresh(&self) -> Result<()> {
        let result = self.fetch_user_data().await;
        self.after_first_authentication_try();
        result
    }

    /// Persist a token received from the OAuth flow
    pub fn authenticate(&self, token: &SessionToken) -> Result<()> {
        self.tokens.save(token)?;
        info!("session token stored");
        Ok(())
    }

    /// Consume an OAuth return URL
    ///
    /// Stores the token it carries and returns the URL with the token
    /// stripped (root path, no query), so the token is used exactly once.
    pub fn consume_redirect(&self, redirect: &str) -> Result<Url> {
        let (token, stripped) = parse_redirect(redirect)?;
        self.authenticate(&token)?;
        Ok(stripped)
    }

    /// Drop the token and the cached profile
    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        self.write().user = None;
        info!("signed out");
        Ok(())
    }
}

/// Split an OAuth return URL into the token and the stripped URL
pub fn parse_redirect(redirect: &str) -> Result<(SessionToken, Url)> {
    let url = Url::parse(redirect)
        .map_err(|e| Error::validation(format!("Invalid redirect URL '{}': {}", redirect, e)))?;

    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned());

    let from_path = || {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["auth", token] if *token != "google" => Some(token.to_string()),
            _ => None,
        }
    };

    let raw = from_query
        .or_else(from_path)
        .ok_or_else(|| Error::validation("Redirect URL carries no token"))?;
    let token = SessionToken::new(raw)?;

    let mut stripped = url.clone();
    stripped.set_path("/");
    stripped.set_query(None);
    stripped.set_fragment(None);

    Ok((token, stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::token_store::MemoryTokenStore;
    use crate::services::testing::{Call, FakeApi};

    fn service(api: FakeApi, token: Option<&str>) -> (AuthService, Arc<FakeApi>) {
        let api = Arc::new(api);
        let tokens = match token {
            Some(t) => MemoryTokenStore::with_token(SessionToken::new(t).unwrap()),
            None => MemoryTokenStore::new(),
        };
        (AuthService::new(api.clone(), Arc::new(tokens)), api)
    }

    #[tokio::test]
    async fn test_fetch_without_token_skips_network() {
        let (auth, api) = service(FakeApi::default(), None);
        auth.fetch_user_data().await.unwrap();
        assert!(api.calls().is_empty());
        assert!(!auth.is_logged_in());
        assert!(!auth.is_ready());
    }

    #[tokio::test]
    async fn test_refresh_marks_ready() {
        let (auth, _api) = service(FakeApi::default(), None);
        auth.refresh().await.unwrap();
        assert!(auth.is_ready());
        assert!(!auth.is_logged_in());
    }

    #[tokio::test]
    async fn test_fetch_loads_user() {
        let (auth, api) = service(FakeApi::default(), Some("tok"));
        auth.fetch_user_data().await.unwrap();
        assert_eq!(api.calls(), vec![Call::FetchMe]);
        assert!(auth.is_logged_in());
        // logged in implies ready even before the first attempt is marked
        assert!(auth.is_ready());
        assert_eq!(auth.user().unwrap().formatted_available_balance(), "2");
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() {
        let api = FakeApi {
            reject_token: true,
            ..FakeApi::default()
        };
        let (auth, _api) = service(api, Some("tok"));

        let result = auth.refresh().await;
        assert!(matches!(result, Err(Error::Unauthenticated(_))));
        assert!(auth.is_ready());
        assert!(!auth.has_token().unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_state() {
        let (auth, _api) = service(FakeApi::default(), Some("tok"));
        auth.fetch_user_data().await.unwrap();
        auth.logout().unwrap();
        assert!(!auth.is_logged_in());
        assert!(!auth.has_token().unwrap());
    }

    #[test]
    fn test_consume_redirect_from_path() {
        let (auth, _api) = service(FakeApi::default(), None);
        let stripped = auth
            .consume_redirect("https://app.example.com/auth/abc123")
            .unwrap();
        assert_eq!(stripped.as_str(), "https://app.example.com/");
        assert!(auth.has_token().unwrap());
    }

    #[test]
    fn test_parse_redirect_from_query() {
        let (token, stripped) =
            parse_redirect("https://app.example.com/auth/callback?token=xyz&x=1#frag").unwrap();
        assert_eq!(token.expose(), "xyz");
        assert_eq!(stripped.as_str(), "https://app.example.com/");
    }

    #[test]
    fn test_redirect_without_token_stores_nothing() {
        let (auth, _api) = service(FakeApi::default(), None);
        assert!(auth.consume_redirect("https://app.example.com/").is_err());
        assert!(auth.consume_redirect("https://app.example.com/auth/google").is_err());
        assert!(auth.consume_redirect("https://app.example.com/auth/?token=").is_err());
        assert!(auth.consume_redirect("not a url").is_err());
        assert!(!auth.has_token().unwrap());
    }
}
