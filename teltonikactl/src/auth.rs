//! Bearer token bookkeeping.

use std::fmt;
use std::time::{Duration, Instant};
use teltonika_core::TokenData;

/// Tokens are treated as expired this long before the device would expire them.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(5);

/// Token issued by `/login`, stamped with the local time it was received.
#[derive(Clone)]
pub struct Token {
    value: String,
    username: String,
    lifetime: Duration,
    issued_at: Instant,
}

impl Token {
    pub fn new(data: TokenData, issued_at: Instant) -> Self {
        Self {
            value: data.token,
            username: data.username,
            lifetime: Duration::from_secs(data.expires),
            issued_at,
        }
    }

    /// Bearer value for the `Authorization` header.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the token must be renewed at `now`.
    ///
    /// A token is expired once `lifetime - EXPIRY_MARGIN` has elapsed; tokens
    /// with a lifetime shorter than the margin are expired immediately.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.issued_at);
        elapsed >= self.lifetime.saturating_sub(EXPIRY_MARGIN)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("username", &self.username)
            .field("lifetime", &self.lifetime)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
