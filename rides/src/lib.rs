//! Ride sharing domain model
//!
//! Trips offered by drivers, reservations made by passengers and support tickets, together with
//! the date handling and derived views the client builds on top of the remote API data.

pub mod reservation;
pub mod schedule;
pub mod status;
pub mod ticket;
pub mod trip;
pub mod user;

pub use reservation::{
    Categorized, Category, Reservation, ReservationId, ReservationRecord, ReservationView,
};
pub use schedule::{CalendarDate, Departure, MonthCursor};
pub use status::{ReservationStatus, TicketStatus, TripStatus};
pub use ticket::{Ticket, TicketDraft, TicketId};
pub use trip::{DriverRef, NewTrip, Trip, TripDraft, TripId};
pub use user::{Role, User, UserId};
