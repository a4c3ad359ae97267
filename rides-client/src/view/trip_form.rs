//! Trip offering form

use chrono::NaiveDateTime;
use rides::{CalendarDate, Trip, TripDraft};
use tracing::{info, instrument};

use crate::api::Api;
use crate::context::auth::Session;
use crate::view::Result;

#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub draft: TripDraft,
}

impl TripForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with the departure date taken from the calendar selection
    pub fn prefilled(date: CalendarDate) -> Self {
        let mut form = Self::new();
        form.draft.date = Some(date.date());
        form
    }

    /// Validates the draft against `now` and offers the trip
    ///
    /// Nothing is sent if the draft is invalid. The form is cleared only after the server accepts
    /// the trip.
    #[instrument(skip(self, api, session))]
    pub async fn submit(&mut self, api: &Api, session: &Session, now: NaiveDateTime) -> Result<Trip> {
        let trip = self.draft.validate(now)?;
        let created = api.create_trip(session, &trip).await?;

        info!(trip = %created.id, departure = %created.departure, "Trip offered");
        self.draft = TripDraft::new();
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::{HttpResponse, web};
    use chrono::{Days, NaiveDate, NaiveTime};
    use rides::Role;
    use serde_json::json;

    use super::*;
    use crate::api::tests::{mock, trip_json};
    use crate::context::auth::tests::session;
    use crate::view::Error;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    async fn counting_api(calls: web::Data<AtomicUsize>) -> Api {
        mock(move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(calls.clone()).route(
                "/viagens/",
                web::post().to(|calls: web::Data<AtomicUsize>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    HttpResponse::Ok().json(json!({
                        "mensagem": "Viagem criada com sucesso",
                        "viagem": trip_json(4, "15/03 - 10:00", 3, "agendada", 7),
                    }))
                }),
            );
        })
        .await
    }

    #[test]
    fn prefilled_date() {
        let form = TripForm::prefilled("15/03/2026".parse().unwrap());
        assert_eq!(form.draft.date, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(form.draft.time, None);
    }

    #[actix_web::test]
    async fn successful_submit_clears_form() {
        let calls = web::Data::new(AtomicUsize::new(0));
        let api = counting_api(calls.clone()).await;
        let session = session("ana@example.com", Role::Driver, 7);

        let mut form = TripForm::new();
        form.draft = TripDraft {
            date: now().date().checked_add_days(Days::new(1)),
            time: NaiveTime::from_hms_opt(10, 0, 0),
            origin: "A".to_owned(),
            destination: "B".to_owned(),
            seats: Some(3),
        };

        let trip = form.submit(&api, &session, now()).await.unwrap();
        assert_eq!(trip.seats, 3);
        assert_eq!(form.draft, TripDraft::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn past_departure_is_not_sent() {
        let calls = web::Data::new(AtomicUsize::new(0));
        let api = counting_api(calls.clone()).await;
        let session = session("ana@example.com", Role::Driver, 7);

        let mut form = TripForm::prefilled(CalendarDate::new(now().date()));
        form.draft.time = NaiveTime::from_hms_opt(9, 29, 0);
        form.draft.origin = "A".to_owned();
        form.draft.destination = "B".to_owned();
        form.draft.seats = Some(1);

        let err = form.submit(&api, &session, now()).await.unwrap_err();
        assert!(matches!(err, Error::Trip(rides::trip::Error::DepartureInPast(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // The draft is kept for correction
        assert_eq!(form.draft.origin, "A");

        form.draft.time = NaiveTime::from_hms_opt(9, 30, 0);
        form.submit(&api, &session, now()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn server_rejection_keeps_form() {
        let api = mock(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/viagens/",
                web::post().to(|| async {
                    HttpResponse::Forbidden().json(json!({ "detail": "Apenas motoristas podem criar viagens" }))
                }),
            );
        })
        .await;
        let session = session("bia@example.com", Role::Passenger, 2);

        let mut form = TripForm::prefilled(CalendarDate::new(now().date()));
        form.draft.time = NaiveTime::from_hms_opt(18, 0, 0);
        form.draft.origin = "A".to_owned();
        form.draft.destination = "B".to_owned();
        form.draft.seats = Some(2);

        let err = form.submit(&api, &session, now()).await.unwrap_err();
        assert_eq!(err.to_string(), "Apenas motoristas podem criar viagens");
        assert!(!err.is_validation());
        assert_eq!(form.draft.seats, Some(2));
    }
}
