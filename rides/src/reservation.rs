//! Passenger reservations and the views derived from them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schedule::{Departure, sort_latest_first};
use crate::status::{ReservationStatus, TripStatus};
use crate::trip::{Trip, TripId};

/// Reservation ID newtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i64);

impl ReservationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReservationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Reservation as returned on creation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(rename = "viagem_id")]
    pub trip: TripId,
    pub status: ReservationStatus,
}

/// Passenger's reservation listing entry, with trip fields denormalized by the API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReservationRecord {
    #[serde(rename = "reserva_id")]
    pub id: ReservationId,
    #[serde(rename = "viagem_id")]
    pub trip: TripId,
    #[serde(rename = "origem")]
    pub origin: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "horario_partida")]
    pub departure: Departure,
    #[serde(rename = "status_reserva")]
    pub status: ReservationStatus,
    #[serde(rename = "status_viagem")]
    pub trip_status: TripStatus,
}

/// Reservation joined with its trip
///
/// Read-only view recomputed from the reservation records and the trips collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationView {
    pub id: ReservationId,
    pub trip: TripId,
    pub origin: String,
    pub destination: String,
    pub departure: Departure,
    pub status: ReservationStatus,
    /// Status of the joined trip, or the denormalized one if the trip is not known
    pub trip_status: TripStatus,
    pub driver_name: Option<String>,
}

impl ReservationView {
    /// Joins every record with the trip it refers to
    pub fn join(records: &[ReservationRecord], trips: &[Trip]) -> Vec<Self> {
        let trips: HashMap<TripId, &Trip> = trips.iter().map(|trip| (trip.id, trip)).collect();

        records
            .iter()
            .map(|record| {
                let trip = trips.get(&record.trip);
                if trip.is_none() {
                    debug!(reservation = %record.id, trip = %record.trip, "Trip not listed, keeping denormalized status");
                }

                Self {
                    id: record.id,
                    trip: record.trip,
                    origin: record.origin.clone(),
                    destination: record.destination.clone(),
                    departure: record.departure,
                    status: record.status,
                    trip_status: trip.map_or(record.trip_status, |trip| trip.status),
                    driver_name: trip.and_then(|trip| trip.driver.name.clone()),
                }
            })
            .collect()
    }

    pub fn category(&self) -> Category {
        use ReservationStatus as R;
        use TripStatus as T;

        match (self.status, self.trip_status) {
            (R::Cancelled, _) | (R::Confirmed, T::Cancelled) => Category::Cancelled,
            (R::Confirmed, T::Completed) => Category::Completed,
            (R::Confirmed, T::Scheduled | T::Confirmed) => Category::Active,
        }
    }
}

/// Where a reservation is listed on the passenger's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Confirmed reservation on an upcoming trip
    Active,
    /// Confirmed reservation on a completed trip
    Completed,
    /// Reservation cancelled by the passenger, or its trip cancelled by the driver
    Cancelled,
}

/// Reservations split by category, each latest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categorized {
    pub active: Vec<ReservationView>,
    pub completed: Vec<ReservationView>,
    pub cancelled: Vec<ReservationView>,
}

impl Categorized {
    /// Partitions the views, resolving departures in `year` for ordering
    pub fn partition(views: impl IntoIterator<Item = ReservationView>, year: i32) -> Self {
        let mut categorized = Self::default();
        for view in views {
            match view.category() {
                Category::Active => categorized.active.push(view),
                Category::Completed => categorized.completed.push(view),
                Category::Cancelled => categorized.cancelled.push(view),
            }
        }

        for list in [
            &mut categorized.active,
            &mut categorized.completed,
            &mut categorized.cancelled,
        ] {
            sort_latest_first(list, year, |view| &view.departure);
        }

        categorized
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len() + self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
