//! [`Session`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::{user, User};

/// User session, carried as claims of a [JWT].
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// [`user::Username`] of the [`User`] this [`Session`] belongs to.
    pub username: user::Username,

    /// Indicator whether the [`User`] had administrative privileges when
    /// this [`Session`] was issued.
    pub is_admin: bool,

    /// [`DateTime`] when this [`Session`] was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssuanceDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Issues a new [`Session`] for the provided [`User`], valid for the
    /// provided `ttl` starting from now.
    #[must_use]
    pub fn issue(user: &User, ttl: Duration) -> Self {
        let now = common::DateTime::now();
        Self {
            username: user.username.clone(),
            is_admin: user.is_admin,
            issued_at: now.coerce(),
            expires_at: (now + ttl).coerce(),
        }
    }

    /// Checks whether this [`Session`] may act on behalf of the [`User`] with
    /// the provided [`user::Username`].
    ///
    /// Administrators may act on behalf of anyone.
    #[must_use]
    pub fn may_act_as(&self, username: &user::Username) -> bool {
        self.is_admin || &self.username == username
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, Eq, FromStr, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// [`DateTime`] of a [`Session`] issuance.
pub type IssuanceDateTime = DateTimeOf<(Session, unit::Issuance)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::user::{
        Email, Name, Password, PasswordHash, User, Username,
    };

    use super::Session;

    fn user(username: &str, is_admin: bool) -> User {
        User {
            username: Username::new(username).unwrap(),
            password_hash: PasswordHash::new(&Password::new("pw").unwrap())
                .unwrap(),
            first_name: Name::new("Alice").unwrap(),
            last_name: Name::new("Smith").unwrap(),
            email: Email::new("alice@example.com").unwrap(),
            is_admin,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn serializes_claims() {
        let session =
            Session::issue(&user("alice", false), Duration::from_secs(60));

        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["username"], "alice");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(
            json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(),
            60,
        );
    }

    #[test]
    fn acts_only_as_self_unless_admin() {
        let bob = Username::new("bob").unwrap();
        let alice = Username::new("alice").unwrap();

        let session = Session::issue(&user("alice", false), Duration::ZERO);
        assert!(session.may_act_as(&alice));
        assert!(!session.may_act_as(&bob));

        let admin = Session::issue(&user("root", true), Duration::ZERO);
        assert!(admin.may_act_as(&bob));
    }
}
