use crate::storage::Storage;
use crate::twoface::Fallible;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Local storage key of the persisted session.
pub const SESSION_KEY: &str = "user";

/// "This device is authenticated as this user." Only ever built once both the identity provider
/// and the Feed API have accepted the user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// User id assigned by the Feed API.
    #[serde(rename = "id")]
    pub local_id: i64,
    /// Subject id assigned by the identity provider.
    #[serde(rename = "uid")]
    pub provider_uid: String,
    pub email: String,
    #[serde(rename = "username")]
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Register,
    Login,
}

pub fn save(storage: &impl Storage, session: &Session) -> Fallible<()> {
    let blob = serde_json::to_string(session)?;
    storage.set(SESSION_KEY, &blob)
}

/// A blob that doesn't decode is removed and treated as no session at all.
pub fn load(storage: &impl Storage) -> Fallible<Option<Session>> {
    guard!(let Some(blob) = storage.get(SESSION_KEY)? else {
        return Ok(None)
    });
    match serde_json::from_str(&blob) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            warn!("discarding unreadable saved session: {}", e);
            storage.remove(SESSION_KEY)?;
            Ok(None)
        }
    }
}

pub fn clear(storage: &impl Storage) -> Fallible<()> {
    storage.remove(SESSION_KEY)
}
