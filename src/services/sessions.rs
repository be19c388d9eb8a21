use base64ct::{Base64UrlUnpadded, Encoding};
use parking_lot::Mutex;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;

/// Service for storing login sessions in memory. Tokens only live as
/// long as the process, restarting logs everyone out.
#[derive(Default)]
pub struct Sessions {
    /// Mapping between tokens and the session behind them
    sessions: Mutex<HashMap<String, SessionData>>,
}

/// Roles attached to an issued token
#[derive(Debug, Clone, Copy)]
pub struct SessionData {
    /// Whether the session may modify data
    pub admin: bool,
    /// Whether the session may view data
    pub guest: bool,
}

impl Sessions {
    /// Length of a session token in bytes before encoding
    const TOKEN_LENGTH: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with full admin access returning its token
    pub fn create_admin(&self) -> String {
        self.create(SessionData {
            admin: true,
            guest: true,
        })
    }

    /// Creates a read-only guest session returning its token
    pub fn create_guest(&self) -> String {
        self.create(SessionData {
            admin: false,
            guest: true,
        })
    }

    fn create(&self, data: SessionData) -> String {
        let token = Self::create_token();
        let sessions = &mut *self.sessions.lock();
        sessions.insert(token.clone(), data);
        token
    }

    /// Looks up the session behind the provided token
    pub fn get(&self, token: &str) -> Option<SessionData> {
        let sessions = &*self.sessions.lock();
        sessions.get(token).copied()
    }

    /// Removes the session behind the provided token, used on logout
    pub fn remove(&self, token: &str) {
        let sessions = &mut *self.sessions.lock();
        sessions.remove(token);
    }

    /// Creates a new random token from secure random bytes
    fn create_token() -> String {
        let mut data = [0u8; Self::TOKEN_LENGTH];
        OsRng.fill_bytes(&mut data);
        Base64UrlUnpadded::encode_string(&data)
    }
}

#[cfg(test)]
mod test {
    use super::Sessions;

    #[test]
    fn test_session_roles() {
        let sessions = Sessions::new();

        let admin = sessions.create_admin();
        let guest = sessions.create_guest();
        assert_ne!(admin, guest);

        let data = sessions.get(&admin).unwrap();
        assert!(data.admin && data.guest);

        let data = sessions.get(&guest).unwrap();
        assert!(!data.admin && data.guest);

        sessions.remove(&admin);
        assert!(sessions.get(&admin).is_none());
        assert!(sessions.get(&guest).is_some());
    }
}
