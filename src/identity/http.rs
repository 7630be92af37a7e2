//! Identity provider backed by the hosted auth/profile HTTP API.
//!
//! The request's `Cookie` and `Authorization` headers are forwarded as-is to
//! the session endpoint. Profiles are read from a REST endpoint that answers
//! with either a single row or an array of rows.

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use url::form_urlencoded;

use crate::config::schema::IdentityConfig;
use crate::identity::{
    IdentityError, IdentityProvider, ProfileLookup, Role, SessionCredentials, SessionUser,
};

#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    session_url: String,
    profile_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Many(Vec<ProfileRow>),
    One(ProfileRow),
}

impl ProfileBody {
    fn into_role(self) -> Option<String> {
        match self {
            ProfileBody::One(row) => row.role,
            ProfileBody::Many(rows) => rows.into_iter().next().and_then(|row| row.role),
        }
    }
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            client,
            session_url: config.session_url.clone(),
            profile_url: config.profile_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn profile_url_for(&self, user_id: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(user_id.as_bytes()).collect();
        self.profile_url.replace("{user_id}", &encoded)
    }

    fn with_api_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_user(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<Option<SessionUser>, IdentityError> {
        if credentials.is_empty() {
            return Ok(None);
        }

        let mut req = self.with_api_key(self.client.get(&self.session_url));
        if let Some(cookie) = &credentials.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        if let Some(auth) = &credentials.authorization {
            req = req.header(header::AUTHORIZATION, auth);
        }

        let res = req.send().await.map_err(IdentityError::Transport)?;
        match res.status() {
            status if status.is_success() => {
                let user = res.json::<SessionUser>().await.map_err(IdentityError::Decode)?;
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(IdentityError::Status(status.as_u16())),
        }
    }

    async fn profile_role(&self, user_id: &str) -> ProfileLookup {
        let req = self.with_api_key(self.client.get(self.profile_url_for(user_id)));

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => return ProfileLookup::TransportError(e.to_string()),
        };

        match res.status() {
            StatusCode::NOT_FOUND => return ProfileLookup::NotFound,
            status if !status.is_success() => {
                return ProfileLookup::TransportError(format!("profile lookup returned {status}"));
            }
            _ => {}
        }

        let body = match res.json::<ProfileBody>().await {
            Ok(body) => body,
            Err(e) => return ProfileLookup::TransportError(format!("invalid profile body: {e}")),
        };

        match body.into_role() {
            None => ProfileLookup::NotFound,
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => ProfileLookup::Found(role),
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Profile has unusable role");
                    ProfileLookup::NotFound
                }
            },
        }
    }
}
