//! Client global context

pub mod auth;
pub mod store;

use chrono::Utc;
use color_eyre::Result;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::Api;
use crate::config::Config;
use auth::Session;
use store::SessionStore;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not logged in")]
    Unauthenticated,
    #[error("Server issued a session token which cannot be decoded")]
    UndecodableToken,
}

/// API access together with the logged in session
#[derive(Debug)]
pub struct Context {
    api: Api,
    store: SessionStore,
    session: Option<Session>,
}

impl Context {
    pub fn new(api: Api, store: SessionStore, session: Option<Session>) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    /// Builds the API client and restores the stored session
    pub async fn open(config: &Config) -> Result<Self> {
        let api = Api::new(&config.api)?;
        let store = SessionStore::new(&config.session.path);

        let session = store.load().await?;
        if let Some(session) = &session
            && session.is_expired(Utc::now())
        {
            warn!(user = session.subject(), "Stored session has expired");
        }

        Ok(Self::new(api, store, session))
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Logged in session
    pub fn session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::Unauthenticated)
    }

    /// Logs in, replacing and storing the session
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session> {
        let token = self.api.login(email, password).await?;
        let session = Session::from_token(token).ok_or(Error::UndecodableToken)?;

        self.store.save(&session).await?;
        info!(role = %session.role(), "Logged in");
        Ok(self.session.insert(session))
    }

    /// Drops the session
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<()> {
        self.session = None;
        self.store.clear().await?;
        info!(path = ?self.store.path(), "Logged out");
        Ok(())
    }
}
