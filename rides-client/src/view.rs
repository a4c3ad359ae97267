//! Screen state of the client
//!
//! Every view owns its state and updates it through `&mut self` operations which talk to the API.

pub mod account;
pub mod calendar;
pub mod profile;
pub mod support;
pub mod trip_form;

use rides::TripId;
use thiserror::Error;

use crate::api;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Trip(#[from] rides::trip::Error),
    #[error(transparent)]
    Ticket(#[from] rides::ticket::Error),
    #[error(transparent)]
    Registration(#[from] account::Error),
    #[error(transparent)]
    Api(#[from] api::Error),
    #[error("Trip {0} cannot be reserved")]
    NotBookable(TripId),
    #[error("Cannot determine the logged in user")]
    UnknownUser,
}

impl Error {
    /// Errors raised before anything is sent to the server
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Api(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
