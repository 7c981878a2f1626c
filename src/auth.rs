use std::time::Duration;

use chrono::{DateTime, Utc};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AccessToken, AuthType, AuthUrl, Client, ClientId, ClientSecret, RefreshToken, Scope,
    StandardRevocableToken, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

/// Smappee's token endpoint only speaks the password and refresh-token grants, so
/// `BasicClient` is specialised with a response type that insists on a refresh token
/// and an expiry.
pub(crate) type GrantClient = Client<
    BasicErrorResponse,
    GrantResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

pub(crate) fn grant_client(
    client_id: &ClientId,
    client_secret: &ClientSecret,
    token_url: &str,
) -> crate::Result<GrantClient> {
    let token_url = TokenUrl::new(token_url.to_string())?;
    // No authorization endpoint is ever used, but oauth2 wants one.
    let auth_url = AuthUrl::from_url(token_url.url().clone());

    let client = GrantClient::new(
        client_id.clone(),
        Some(client_secret.clone()),
        auth_url,
        Some(token_url),
    )
    .set_auth_type(AuthType::RequestBody);

    Ok(client)
}

fn default_token_type() -> BasicTokenType {
    BasicTokenType::Bearer
}

/// Body of a successful password or refresh-token grant
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct GrantResponse {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    expires_in: u64,

    #[serde(default = "default_token_type")]
    token_type: BasicTokenType,
}

impl TokenResponse<BasicTokenType> for GrantResponse {
    fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    fn token_type(&self) -> &BasicTokenType {
        &self.token_type
    }

    fn expires_in(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.expires_in))
    }

    fn refresh_token(&self) -> Option<&RefreshToken> {
        Some(&self.refresh_token)
    }

    fn scopes(&self) -> Option<&Vec<Scope>> {
        None
    }
}

/// Tokens obtained from the last successful grant.
///
/// A session is never patched: every grant builds a fresh one, which replaces the
/// previous session as a whole.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) access_token: AccessToken,
    pub(crate) refresh_token: RefreshToken,
    pub(crate) expires_at: DateTime<Utc>,
}

impl Session {
    /// `received_at` is the instant the grant response arrived.
    pub(crate) fn from_grant(grant: GrantResponse, received_at: DateTime<Utc>) -> Self {
        let expires_at = chrono::Duration::from_std(Duration::from_secs(grant.expires_in))
            .ok()
            .and_then(|validity| received_at.checked_add_signed(validity))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Session {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
        }
    }

    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn grant(expires_in: u64) -> GrantResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": "T1",
            "refresh_token": "R1",
            "expires_in": expires_in,
        }))
        .unwrap()
    }

    #[test]
    fn expiration_is_measured_from_reception() {
        let received_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let session = Session::from_grant(grant(3600), received_at);

        assert_eq!(session.access_token.secret(), "T1");
        assert_eq!(session.refresh_token.secret(), "R1");
        assert_eq!(
            session.expires_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn session_expires_at_the_deadline() {
        let received_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let session = Session::from_grant(grant(60), received_at);

        assert!(!session.is_expired(received_at));
        assert!(!session.is_expired(received_at + chrono::Duration::seconds(59)));
        assert!(session.is_expired(received_at + chrono::Duration::seconds(60)));
        assert!(session.is_expired(received_at + chrono::Duration::days(1)));
    }

    #[test]
    fn huge_expires_in_saturates() {
        let session = Session::from_grant(grant(u64::MAX), Utc::now());
        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        assert_eq!(grant(1).token_type(), &BasicTokenType::Bearer);
    }

    #[test]
    fn grant_without_refresh_token_is_rejected() {
        let res = serde_json::from_value::<GrantResponse>(serde_json::json!({
            "access_token": "T1",
            "expires_in": 3600,
        }));
        assert!(res.is_err());
    }
}
