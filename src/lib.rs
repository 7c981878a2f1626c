use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use oauth2::reqwest::http_client;
use oauth2::{AccessToken, ClientId, ClientSecret, ResourceOwnerPassword, ResourceOwnerUsername};
use serde_json::Value;

pub mod api;
mod auth;
mod error;

use api::service_location::ServiceLocations;
use api::{Aggregation, Timestamp};
use auth::Session;
pub use error::{Error, Result};

const PRODUCTION_BASE_URL: &str = "https://app1pub.smappee.net";

/// Where the token and service location endpoints live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token_url: String,
    pub service_location_url: String,
}

impl Endpoints {
    pub fn from_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Endpoints {
            token_url: format!("{}/dev/v1/oauth2/token", base_url),
            service_location_url: format!("{}/dev/v1/servicelocation", base_url),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::from_base_url(PRODUCTION_BASE_URL)
    }
}

pub trait ApiClient {
    /// GET `path` below the service location collection and return the JSON body
    fn http_get(&mut self, path: &str, query_string: &[(String, String)]) -> Result<Value>;
}

#[derive(Debug)]
pub struct SmappeeApi {
    client_id: ClientId,
    client_secret: ClientSecret,
    endpoints: Endpoints,
    http_client: reqwest::blocking::Client,

    session: Option<Session>,
}

impl SmappeeApi {
    /// Client id and secret are handed out by Smappee support.
    pub fn new(client_id: String, client_secret: String) -> Self {
        SmappeeApi {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            endpoints: Endpoints::default(),
            http_client: reqwest::blocking::Client::new(),
            session: None,
        }
    }

    /// Reads `SMAPPEE_CLIENT_ID`, `SMAPPEE_CLIENT_SECRET` and, if set, `SMAPPEE_BASE_URL`.
    pub fn from_env_values() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id =
            lookup("SMAPPEE_CLIENT_ID").ok_or(Error::MissingEnv("SMAPPEE_CLIENT_ID"))?;
        let client_secret =
            lookup("SMAPPEE_CLIENT_SECRET").ok_or(Error::MissingEnv("SMAPPEE_CLIENT_SECRET"))?;

        let api = SmappeeApi::new(client_id, client_secret);
        Ok(match lookup("SMAPPEE_BASE_URL") {
            Some(base_url) => api.with_base_url(base_url),
            None => api,
        })
    }

    pub fn with_base_url(self, base_url: String) -> Self {
        self.with_endpoints(Endpoints::from_base_url(&base_url))
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Password grant: trades the Smappee account credentials for a token pair
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let client = auth::grant_client(
            &self.client_id,
            &self.client_secret,
            &self.endpoints.token_url,
        )?;

        let username = ResourceOwnerUsername::new(username.to_string());
        let password = ResourceOwnerPassword::new(password.to_string());
        let grant = client
            .exchange_password(&username, &password)
            .request(http_client)?;

        self.session = Some(Session::from_grant(grant, Utc::now()));
        info!("authenticated as {}", username.as_str());

        Ok(())
    }

    /// Refresh-token grant: replaces the whole session with a new token pair
    pub fn re_authenticate(&mut self) -> Result<()> {
        let refresh_token = match &self.session {
            Some(session) => session.refresh_token.clone(),
            None => return Err(Error::NotAuthenticated),
        };

        let client = auth::grant_client(
            &self.client_id,
            &self.client_secret,
            &self.endpoints.token_url,
        )?;
        let grant = client
            .exchange_refresh_token(&refresh_token)
            .request(http_client)?;

        let session = Session::from_grant(grant, Utc::now());
        info!("token refreshed, valid until {}", session.expires_at);
        self.session = Some(session);

        Ok(())
    }

    /// Runs `call` with a token that has not expired, refreshing the session first if
    /// needed.
    pub fn authenticated<T>(
        &mut self,
        call: impl FnOnce(&Self, &AccessToken) -> Result<T>,
    ) -> Result<T> {
        let expired = match &self.session {
            Some(session) => session.is_expired(Utc::now()),
            None => return Err(Error::NotAuthenticated),
        };
        if expired {
            debug!("access token expired, refreshing");
            self.re_authenticate()?;
        }

        let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;
        call(self, &session.access_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|session| session.access_token.secret().as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|session| session.refresh_token.secret().as_str())
    }

    pub fn token_expiration_time(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|session| session.expires_at)
    }

    pub fn get_service_locations(&mut self) -> Result<Value> {
        ServiceLocations::new(self).list()
    }

    pub fn get_service_location_info(&mut self, service_location_id: u64) -> Result<Value> {
        ServiceLocations::new(self).info(service_location_id)
    }

    pub fn get_consumption(
        &mut self,
        service_location_id: u64,
        start: impl Into<Timestamp>,
        end: impl Into<Timestamp>,
        aggregation: impl Into<Aggregation>,
    ) -> Result<Value> {
        ServiceLocations::new(self).consumption(
            service_location_id,
            start.into(),
            end.into(),
            aggregation.into(),
        )
    }

    pub fn get_events(
        &mut self,
        service_location_id: u64,
        appliance_id: u64,
        start: impl Into<Timestamp>,
        end: impl Into<Timestamp>,
        max_number: Option<u32>,
    ) -> Result<Value> {
        ServiceLocations::new(self).events(
            service_location_id,
            appliance_id,
            start.into(),
            end.into(),
            max_number,
        )
    }

    pub fn actuator_on(&mut self) -> Result<Value> {
        ServiceLocations::new(self).actuator_on()
    }

    pub fn actuator_off(&mut self) -> Result<Value> {
        ServiceLocations::new(self).actuator_off()
    }

    fn send_get(
        &self,
        url: &str,
        query_string: &[(String, String)],
        token: &AccessToken,
    ) -> Result<Value> {
        debug!("GET {} {:?}", url, query_string);
        let response = self
            .http_client
            .get(url)
            .query(&query_string)
            .bearer_auth(token.secret())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!("Error HTTP {} on {}: {}", status, url, body);
            return Err(Error::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("parsing reply of {}?{:?} => {:?}: {}", url, query_string, body, e);
            Error::Json(e)
        })
    }
}

impl ApiClient for SmappeeApi {
    fn http_get(&mut self, path: &str, query_string: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.endpoints.service_location_url, path);
        self.authenticated(|api, token| api.send_get(&url, query_string, token))
    }
}
