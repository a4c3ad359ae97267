//! Remote API access
//!
//! Every call resolves into an [`ApiResult`]. Server rejections come in different shapes - plain
//! text, `{"detail": "..."}` or a list of validation errors - and all of them are normalized into
//! [`Error::Rejected`] carrying the status code and a human readable message.

use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode, Url};
use rides::{
    CalendarDate, NewTrip, Reservation, ReservationId, ReservationRecord, Ticket, TicketDraft,
    Trip, TripId, TripStatus, User, UserId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config;
use crate::context::auth::Session;

#[cfg(test)]
pub(crate) mod tests;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid API base URL {0}")]
    InvalidBaseUrl(String),
    #[error("Cannot connect to the server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Malformed server response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status code of a rejected request
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// Builds the rejection error out of the response body
    pub fn rejected(status: StatusCode, body: &str) -> Self {
        Self::Rejected {
            status,
            message: rejection_message(status, body),
        }
    }
}

/// Result of a single API call
pub type ApiResult<T> = Result<T, Error>;

/// Extracts the message out of an error response body
fn rejection_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        if body.is_empty() {
            return status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned();
        }
        return body.to_owned();
    };

    match json.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(details)) => details
            .iter()
            .map(|detail| match detail.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_owned(),
                None => detail.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(detail) => detail.to_string(),
        None => json.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TripCreated {
    viagem: Trip,
}

#[derive(Debug, Deserialize)]
struct StatusChanged {
    viagem: ChangedTrip,
}

#[derive(Debug, Deserialize)]
struct ChangedTrip {
    status: TripStatus,
}

#[derive(Debug, Deserialize)]
struct ReservationCreated {
    reserva: Reservation,
}

#[derive(Debug, Deserialize)]
struct TicketOpened {
    ticket: Ticket,
}

/// API client
#[derive(Debug, Clone)]
pub struct Api {
    http: Client,
    /// Base URL without trailing slash
    base: String,
}

impl Api {
    pub fn new(config: &config::Api) -> ApiResult<Self> {
        Url::parse(&config.base_url).map_err(|_| Error::InvalidBaseUrl(config.base_url.clone()))?;

        let mut http = Client::builder();
        if let Some(timeout) = config.timeout() {
            http = http.timeout(timeout);
        }

        Ok(Self {
            http: http.build()?,
            base: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    /// Reads JSON body of a successful response
    async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%status, body, "Request rejected");
            return Err(Error::rejected(status, &body));
        }

        serde_json::from_str(&body).map_err(Into::into)
    }

    /// Checks the response status, ignoring the body of a successful response
    async fn check(response: Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        debug!(%status, body, "Request rejected");
        Err(Error::rejected(status, &body))
    }

    /// Registers a new user
    #[instrument(skip_all)]
    pub async fn register(&self, form: Form) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url("auth/registrar"))
            .multipart(form)
            .send()
            .await?;

        Self::check(response).await
    }

    /// Exchanges credentials for the session token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let response = self
            .http
            .post(self.url("auth/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;

        let login: LoginResponse = Self::read(response).await?;
        Ok(login.access_token)
    }

    /// Trips departing on the given day
    #[instrument(skip(self))]
    pub async fn trips_on(&self, date: CalendarDate) -> ApiResult<Vec<Trip>> {
        let response = self
            .http
            .get(self.url("viagens/"))
            .query(&[("data", date.to_string())])
            .send()
            .await?;

        Self::read(response).await
    }

    /// All the trips
    #[instrument(skip_all)]
    pub async fn trips(&self, session: &Session) -> ApiResult<Vec<Trip>> {
        let response = self
            .http
            .get(self.url("viagens/"))
            .bearer_auth(session.token())
            .send()
            .await?;

        Self::read(response).await
    }

    /// Offers a new trip as the session driver
    #[instrument(skip(self, session))]
    pub async fn create_trip(&self, session: &Session, trip: &NewTrip) -> ApiResult<Trip> {
        let response = self
            .http
            .post(self.url("viagens/"))
            .query(&trip.query())
            .bearer_auth(session.token())
            .send()
            .await?;

        let created: TripCreated = Self::read(response).await?;
        Ok(created.viagem)
    }

    /// Changes trip status, returning the status confirmed by the server
    #[instrument(skip(self, session))]
    pub async fn set_trip_status(
        &self,
        session: &Session,
        trip: TripId,
        status: TripStatus,
    ) -> ApiResult<TripStatus> {
        let response = self
            .http
            .put(self.url(&format!("viagens/{trip}/status")))
            .query(&[("status", status.as_str())])
            .bearer_auth(session.token())
            .send()
            .await?;

        let changed: StatusChanged = Self::read(response).await?;
        Ok(changed.viagem.status)
    }

    /// Reserves a seat on a trip
    #[instrument(skip(self, session))]
    pub async fn reserve(&self, session: &Session, trip: TripId) -> ApiResult<Reservation> {
        let response = self
            .http
            .post(self.url("reservas/"))
            .query(&[("viagem_id", trip.to_string())])
            .bearer_auth(session.token())
            .send()
            .await?;

        let created: ReservationCreated = Self::read(response).await?;
        Ok(created.reserva)
    }

    /// Cancels passenger's reservation
    #[instrument(skip(self, session))]
    pub async fn cancel_reservation(
        &self,
        session: &Session,
        reservation: ReservationId,
    ) -> ApiResult<()> {
        let response = self
            .http
            .put(self.url(&format!("reservas/{reservation}/cancelar")))
            .bearer_auth(session.token())
            .send()
            .await?;

        Self::check(response).await
    }

    /// Reservations of the session passenger
    #[instrument(skip_all)]
    pub async fn my_reservations(&self, session: &Session) -> ApiResult<Vec<ReservationRecord>> {
        let response = self
            .http
            .get(self.url("reservas/minhas"))
            .bearer_auth(session.token())
            .send()
            .await?;

        Self::read(response).await
    }

    /// All registered drivers
    #[instrument(skip_all)]
    pub async fn drivers(&self, session: &Session) -> ApiResult<Vec<User>> {
        let response = self
            .http
            .get(self.url("motoristas"))
            .bearer_auth(session.token())
            .send()
            .await?;

        Self::read(response).await
    }

    /// Single driver
    #[instrument(skip(self))]
    pub async fn driver(&self, driver: UserId) -> ApiResult<User> {
        let response = self
            .http
            .get(self.url(&format!("motoristas/{driver}/")))
            .send()
            .await?;

        Self::read(response).await
    }

    /// All registered passengers
    #[instrument(skip_all)]
    pub async fn passengers(&self, session: &Session) -> ApiResult<Vec<User>> {
        let response = self
            .http
            .get(self.url("passageiros"))
            .bearer_auth(session.token())
            .send()
            .await?;

        Self::read(response).await
    }

    /// Support tickets opened by the user
    #[instrument(skip(self, session))]
    pub async fn tickets(&self, session: &Session, user: Option<UserId>) -> ApiResult<Vec<Ticket>> {
        let mut request = self.http.get(self.url("suporte/"));
        if let Some(user) = user {
            request = request.query(&[("usuario_id", user.to_string())]);
        }

        let response = request.bearer_auth(session.token()).send().await?;
        Self::read(response).await
    }

    /// Opens a support ticket
    #[instrument(skip(self, session))]
    pub async fn open_ticket(&self, session: &Session, draft: &TicketDraft) -> ApiResult<Ticket> {
        let response = self
            .http
            .post(self.url("suporte/"))
            .query(&[
                ("assunto", draft.subject.as_str()),
                ("mensagem", draft.message.as_str()),
            ])
            .bearer_auth(session.token())
            .send()
            .await?;

        let opened: TicketOpened = Self::read(response).await?;
        Ok(opened.ticket)
    }
}
