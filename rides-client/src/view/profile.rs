//! User profile with own trips or reservations

use rides::{
    Categorized, ReservationId, ReservationRecord, ReservationView, Role, Trip, TripId, TripStatus,
    User, UserId,
};
use rides::schedule::sort_latest_first;
use tracing::{info, instrument, warn};

use crate::api::Api;
use crate::context::auth::Session;
use crate::view::{Error, Result};

#[derive(Debug)]
pub struct ProfileView {
    role: Role,
    name: Option<String>,
    user_id: Option<UserId>,
    /// Driver's own trips, or all the trips for passengers
    trips: Vec<Trip>,
    reservations: Vec<ReservationRecord>,
}

impl ProfileView {
    pub fn new(session: &Session) -> Self {
        Self {
            role: session.role(),
            name: None,
            user_id: session.user_id(),
            trips: Vec::new(),
            reservations: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Loads the profile data depending on the session role
    #[instrument(skip_all)]
    pub async fn load(&mut self, api: &Api, session: &Session) -> Result<()> {
        let users = match self.role {
            Role::Driver => api.drivers(session).await?,
            Role::Passenger => api.passengers(session).await?,
        };

        let listed = User::find_by_email(&users, session.subject())
            .filter(|user| user.has_role(self.role));
        match listed {
            Some(user) => {
                self.name = Some(user.name.clone());
                self.user_id = Some(user.id);
            }
            None => warn!(user = session.subject(), "User not listed, using session data"),
        }

        match self.role {
            Role::Driver => {
                let user_id = self.user_id.ok_or(Error::UnknownUser)?;
                let trips = api.trips(session).await?;
                self.trips = trips
                    .into_iter()
                    .filter(|trip| trip.is_driven_by(user_id))
                    .collect();
            }
            Role::Passenger => {
                self.trips = api.trips(session).await?;
                self.reservations = api.my_reservations(session).await?;
            }
        }

        info!(
            trips = self.trips.len(),
            reservations = self.reservations.len(),
            "Profile loaded"
        );
        Ok(())
    }

    /// Trips latest first, departures resolved in `year`
    pub fn trips(&self, year: i32) -> Vec<&Trip> {
        let mut trips: Vec<_> = self.trips.iter().collect();
        sort_latest_first(&mut trips, year, |trip| &trip.departure);
        trips
    }

    /// Reservations joined with their trips, latest first
    pub fn reservations(&self, year: i32) -> Vec<ReservationView> {
        let mut views = ReservationView::join(&self.reservations, &self.trips);
        sort_latest_first(&mut views, year, |view| &view.departure);
        views
    }

    pub fn categorized(&self, year: i32) -> Categorized {
        Categorized::partition(ReservationView::join(&self.reservations, &self.trips), year)
    }

    /// Changes status of an own trip, applying the status confirmed by the server
    #[instrument(skip(self, api, session))]
    pub async fn set_trip_status(
        &mut self,
        api: &Api,
        session: &Session,
        trip: TripId,
        status: TripStatus,
    ) -> Result<TripStatus> {
        if !status.is_driver_settable() {
            return Err(rides::trip::Error::StatusNotSettable(status).into());
        }

        let confirmed = api.set_trip_status(session, trip, status).await?;
        if let Some(trip) = self.trips.iter_mut().find(|t| t.id == trip) {
            trip.status = confirmed;
        }

        info!(status = %confirmed, "Trip status changed");
        Ok(confirmed)
    }

    /// Cancels the reservation, dropping it from the profile
    #[instrument(skip(self, api, session))]
    pub async fn cancel_reservation(
        &mut self,
        api: &Api,
        session: &Session,
        reservation: ReservationId,
    ) -> Result<()> {
        api.cancel_reservation(session, reservation).await?;
        self.reservations.retain(|record| record.id != reservation);

        info!("Reservation cancelled");
        Ok(())
    }
}
