//! Token storage port - client-local persistence of the session token

use crate::domain::result::Result;
use crate::domain::SessionToken;

/// Persistent storage for the single session token
///
/// Absence of a token means the client is unauthenticated.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>>;

    fn save(&self, token: &SessionToken) -> Result<()>;

    /// Remove the token; succeeds when none is stored
    fn clear(&self) -> Result<()>;
}
