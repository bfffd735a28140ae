use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

struct Session {
    user_id: String,
    issued_at: Instant,
}

/// Bearer tokens handed out by the identity gateway, keyed to user ids.
///
/// Tokens expire `ttl` after they were issued. Expired entries are dropped
/// when they are looked up and whenever a new session is opened.
pub struct SessionRegistry {
    tokens: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Registry whose tokens live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh opaque token for `user_id`.
    pub fn open(&self, user_id: &str) -> String {
        self.prune_expired();
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(
            token.clone(),
            Session {
                user_id: user_id.to_owned(),
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// User bound to a live `token`.
    pub fn resolve(&self, token: &str) -> Option<String> {
        {
            let session = self.tokens.get(token)?;
            if !self.is_expired(&session) {
                return Some(session.user_id.clone());
            }
        }
        self.tokens.remove(token);
        None
    }

    /// Returns whether the token was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn prune_expired(&self) {
        self.tokens.retain(|_, session| !self.is_expired(session));
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.issued_at.elapsed() >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn tokens_resolve_until_revoked() {
        let sessions = SessionRegistry::new(DAY);
        let first = sessions.open("google:42");
        let second = sessions.open("google:42");

        assert_ne!(first, second);
        assert_eq!(sessions.resolve(&first).as_deref(), Some("google:42"));
        assert!(sessions.revoke(&first));
        assert!(!sessions.revoke(&first));
        assert_eq!(sessions.resolve(&first), None);
        assert!(sessions.resolve(&second).is_some());
    }

    #[test]
    fn expired_tokens_stop_resolving_and_are_dropped() {
        let sessions = SessionRegistry::new(Duration::ZERO);
        let token = sessions.open("google:42");

        assert_eq!(sessions.resolve(&token), None);
        assert_eq!(sessions.len(), 0);
    }

    #[test]
    fn opening_a_session_prunes_expired_ones() {
        let sessions = SessionRegistry::new(Duration::ZERO);
        for _ in 0..5 {
            sessions.open("google:42");
        }
        assert_eq!(sessions.len(), 1);
    }
}
