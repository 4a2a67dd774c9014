use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Embedded user summary carried inside an access token.
///
/// Lets clients render the signed-in user without an extra round trip;
/// authorization decisions always reload the user from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaim {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Claim set of a short-lived access token.
///
/// `sub` is the stringified user id; `role` is the role name as stored.
/// Expiry is always `iat + ttl` — there is no sliding window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub sub: String,
    pub role: String,
    pub usr: UserClaim,
}

impl AccessClaims {
    /// Build the claim set for a user at the given instant.
    ///
    /// # Arguments
    /// * `issuer` - Issuer URL written into `iss`
    /// * `user_id` - Token subject
    /// * `role` - Role name at issuance time
    /// * `user` - Embedded user summary
    /// * `now` - Issuance instant (injected, never read from the wall clock here)
    /// * `ttl_seconds` - Lifetime; `exp = now + ttl_seconds`
    pub fn issue(
        issuer: impl Into<String>,
        user_id: i64,
        role: impl Into<String>,
        user: UserClaim,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        let now = now.timestamp();
        Self {
            iss: issuer.into(),
            iat: now,
            nbf: now,
            exp: now + ttl_seconds,
            sub: user_id.to_string(),
            role: role.into(),
            usr: user,
        }
    }

    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
