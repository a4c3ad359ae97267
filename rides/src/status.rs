//! Lifecycle statuses of trips, reservations and tickets

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Unknown status {0}")]
    UnknownStatus(String),
}

/// Trip status
///
/// Transitions are authored by the driver. There is no transition graph: any status the driver
/// may set can follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripStatus {
    #[serde(rename = "agendada")]
    Scheduled,
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "concluída")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl TripStatus {
    /// Statuses a driver is allowed to put a trip into
    pub const DRIVER_SETTABLE: [TripStatus; 3] = [Self::Scheduled, Self::Cancelled, Self::Completed];

    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "agendada",
            Self::Confirmed => "confirmada",
            Self::Completed => "concluída",
            Self::Cancelled => "cancelada",
        }
    }

    pub fn is_driver_settable(self) -> bool {
        Self::DRIVER_SETTABLE.contains(&self)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for TripStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agendada" | "scheduled" => Ok(Self::Scheduled),
            "confirmada" | "confirmed" => Ok(Self::Confirmed),
            "concluída" | "concluida" | "completed" => Ok(Self::Completed),
            "cancelada" | "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(Error::UnknownStatus(s.to_owned())),
        }
    }
}

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => f.write_str("confirmed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Support ticket status, changed by the support staff only
///
/// Staff may store any status, the ones not known here decode as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "aberto")]
    Open,
    #[serde(rename = "respondido")]
    Answered,
    #[serde(rename = "fechado")]
    Closed,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Answered => f.write_str("answered"),
            Self::Closed => f.write_str("closed"),
            Self::Other => f.write_str("other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_status_wire_names() {
        for status in [
            TripStatus::Scheduled,
            TripStatus::Confirmed,
            TripStatus::Completed,
            TripStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<TripStatus>().unwrap(), status);
        }
    }

    #[test]
    fn completed_parses_without_accent() {
        assert_eq!(
            "concluida".parse::<TripStatus>().unwrap(),
            TripStatus::Completed
        );
        assert_eq!(
            "Completed".parse::<TripStatus>().unwrap(),
            TripStatus::Completed
        );
    }

    #[test]
    fn only_three_statuses_are_driver_settable() {
        assert!(TripStatus::Scheduled.is_driver_settable());
        assert!(TripStatus::Cancelled.is_driver_settable());
        assert!(TripStatus::Completed.is_driver_settable());
        assert!(!TripStatus::Confirmed.is_driver_settable());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "lost".parse::<TripStatus>().unwrap_err(),
            Error::UnknownStatus("lost".to_owned())
        );
        serde_json::from_str::<ReservationStatus>(r#""pendente""#).unwrap_err();
    }
}
