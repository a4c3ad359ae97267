//! Trips offered by drivers

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::Departure;
use crate::status::TripStatus;
use crate::user::UserId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Trip record has no driver")]
    MissingDriver,
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Departure {0} is in the past")]
    DepartureInPast(NaiveDateTime),
    #[error("Trip needs at least one seat")]
    NoSeats,
    #[error("Drivers cannot set the {0} status")]
    StatusNotSettable(TripStatus),
}

/// Trip ID newtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(i64);

impl TripId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TripId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Driver owning a trip
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverRef {
    pub id: UserId,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
}

/// Trip as returned by the API
///
/// The driver is sent either as a nested `motorista` object or as a flat `motorista_id`.
#[derive(Debug, Deserialize)]
struct TripRecord {
    id: TripId,
    origem: String,
    destino: String,
    horario_partida: Departure,
    vagas_disponiveis: u32,
    status: TripStatus,
    #[serde(default)]
    motorista: Option<DriverRef>,
    #[serde(default)]
    motorista_id: Option<UserId>,
}

/// Scheduled ride offered by a driver
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TripRecord")]
pub struct Trip {
    pub id: TripId,
    pub origin: String,
    pub destination: String,
    pub departure: Departure,
    pub seats: u32,
    pub status: TripStatus,
    pub driver: DriverRef,
}

impl TryFrom<TripRecord> for Trip {
    type Error = Error;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        let driver = match (record.motorista, record.motorista_id) {
            (Some(driver), _) => driver,
            (None, Some(id)) => DriverRef { id, name: None },
            (None, None) => return Err(Error::MissingDriver),
        };

        Ok(Self {
            id: record.id,
            origin: record.origem,
            destination: record.destino,
            departure: record.horario_partida,
            seats: record.vagas_disponiveis,
            status: record.status,
            driver,
        })
    }
}

impl Trip {
    /// A seat can be reserved only on scheduled trips with seats left
    pub fn is_bookable(&self) -> bool {
        self.seats > 0 && self.status == TripStatus::Scheduled
    }

    pub fn is_driven_by(&self, user_id: UserId) -> bool {
        self.driver.id == user_id
    }

    /// Takes a single seat locally, never going below zero
    pub fn take_seat(&mut self) {
        self.seats = self.seats.saturating_sub(1);
    }
}

/// Trip form contents before validation
#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default(new = "true"))]
pub struct TripDraft {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub origin: String,
    pub destination: String,
    pub seats: Option<u32>,
}

impl TripDraft {
    /// Validates the draft against current local time
    ///
    /// The departure must not be earlier than `now`; departing exactly at `now` is accepted.
    pub fn validate(&self, now: NaiveDateTime) -> Result<NewTrip, Error> {
        let date = self.date.ok_or(Error::MissingField("date"))?;
        let time = self.time.ok_or(Error::MissingField("time"))?;

        let departure = date.and_time(time);
        if departure < now {
            return Err(Error::DepartureInPast(departure));
        }

        let origin = self.origin.trim();
        if origin.is_empty() {
            return Err(Error::MissingField("origin"));
        }

        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(Error::MissingField("destination"));
        }

        let seats = self.seats.ok_or(Error::MissingField("seats"))?;
        if seats == 0 {
            return Err(Error::NoSeats);
        }

        Ok(NewTrip {
            origin: origin.to_owned(),
            destination: destination.to_owned(),
            departure: Departure::from_datetime(departure),
            seats,
        })
    }
}

/// Validated trip ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub origin: String,
    pub destination: String,
    pub departure: Departure,
    pub seats: u32,
}

impl NewTrip {
    /// Query parameters of the trip creation request
    pub fn query(&self) -> [(&'static str, String); 4] {
        [
            ("origem", self.origin.clone()),
            ("destino", self.destination.clone()),
            ("horario_partida", self.departure.to_string()),
            ("vagas_disponiveis", self.seats.to_string()),
        ]
    }
}
