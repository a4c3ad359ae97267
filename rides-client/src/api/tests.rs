//! API client tests against an in-process mock server

use std::sync::Mutex;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use assert_json_diff::assert_json_include;
use reqwest::StatusCode;
use rides::{
    CalendarDate, ReservationId, ReservationStatus, Role, TicketDraft, TicketStatus, TripDraft,
    TripId, TripStatus, UserId,
};
use serde_json::{Value, json};

use super::*;
use crate::config;
use crate::context::auth::tests::session;

/// Starts a mock API server with the given routes, returning the client connected to it
pub(crate) async fn mock<F>(routes: F) -> Api
where
    F: Fn(&mut web::ServiceConfig) + Clone + Send + 'static,
{
    let server = HttpServer::new(move || App::new().configure(routes.clone()))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    Api::new(&config::Api {
        base_url: format!("http://{addr}/"),
        timeout_secs: Some(5),
    })
    .unwrap()
}

/// Trip as serialized by the server
pub(crate) fn trip_json(id: i64, departure: &str, seats: u32, status: &str, driver: i64) -> Value {
    json!({
        "id": id,
        "origem": "Salvador",
        "destino": "Feira de Santana",
        "horario_partida": departure,
        "vagas_disponiveis": seats,
        "status": status,
        "motorista": { "id": driver, "nome": format!("Motorista {driver}") },
    })
}

/// Collects query strings of the requests hitting a route
#[derive(Default)]
pub(crate) struct Recorded(Mutex<Vec<Value>>);

impl Recorded {
    pub(crate) fn push(&self, request: &HttpRequest) {
        let query: Vec<(String, String)> =
            web::Query::<Vec<(String, String)>>::from_query(request.query_string())
                .unwrap()
                .into_inner();

        let query = query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        self.0.lock().unwrap().push(Value::Object(query));
    }

    pub(crate) fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[test]
fn rejection_messages() {
    let cases = [
        (StatusCode::BAD_REQUEST, r#"{"detail": "Vagas esgotadas"}"#, "Vagas esgotadas"),
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["query", "origem"], "msg": "field required"}, {"msg": "value is not a valid integer"}]}"#,
            "field required; value is not a valid integer",
        ),
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["query"]}]}"#,
            r#"{"loc":["query"]}"#,
        ),
        (StatusCode::BAD_REQUEST, r#"{"detail": {"code": 3}}"#, r#"{"code":3}"#),
        (StatusCode::BAD_REQUEST, r#"{"error": "nope"}"#, r#"{"error":"nope"}"#),
        (StatusCode::FORBIDDEN, "  Access denied\n", "Access denied"),
        (StatusCode::NOT_FOUND, "", "Not Found"),
        (StatusCode::INTERNAL_SERVER_ERROR, "   ", "Internal Server Error"),
    ];

    for (status, body, expected) in cases {
        let err = Error::rejected(status, body);
        assert_eq!(err.to_string(), expected, "{body:?}");
        assert_eq!(err.code(), Some(status.as_u16()));
    }
}

#[test]
fn invalid_base_url() {
    let err = Api::new(&config::Api {
        base_url: "not a url".to_owned(),
        timeout_secs: None,
    })
    .unwrap_err();

    assert!(matches!(err, Error::InvalidBaseUrl(_)));
    assert_eq!(err.code(), None);
}

#[actix_web::test]
async fn trips_on_date() {
    let api = mock(|cfg: &mut web::ServiceConfig| {
        cfg.route(
            "/viagens/",
            web::get().to(|query: web::Query<Vec<(String, String)>>| async move {
                let date = query
                    .iter()
                    .find(|(key, _)| key == "data")
                    .map(|(_, value)| value.as_str());

                match date {
                    Some("24/12/2025") => HttpResponse::Ok().json(json!([
                        trip_json(1, "24/12 - 08:00", 2, "agendada", 5),
                        trip_json(2, "24/12 - 18:30", 0, "agendada", 6),
                    ])),
                    _ => HttpResponse::Ok().json(json!([])),
                }
            }),
        );
    })
    .await;

    let trips = api
        .trips_on("24/12/2025".parse::<CalendarDate>().unwrap())
        .await
        .unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].id, TripId::new(1));
    assert_eq!(trips[0].departure.to_string(), "24/12 - 08:00");
    assert_eq!(trips[1].seats, 0);
    assert_eq!(trips[1].driver.id, UserId::new(6));

    let trips = api
        .trips_on("25/12/2025".parse::<CalendarDate>().unwrap())
        .await
        .unwrap();
    assert!(trips.is_empty());
}

#[actix_web::test]
async fn create_trip_sends_query_and_bearer() {
    let recorded = web::Data::new(Recorded::default());
    let data = recorded.clone();

    let api = mock(move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(data.clone()).route(
            "/viagens/",
            web::post().to(|request: HttpRequest, recorded: web::Data<Recorded>| async move {
                let authorized = request
                    .headers()
                    .get("authorization")
                    .and_then(|header| header.to_str().ok())
                    .is_some_and(|header| header.starts_with("Bearer "));

                if !authorized {
                    return HttpResponse::Unauthorized().json(json!({ "detail": "Not authenticated" }));
                }

                recorded.push(&request);
                HttpResponse::Ok().json(json!({
                    "mensagem": "Viagem criada com sucesso",
                    "viagem": trip_json(9, "10/01 - 10:00", 3, "agendada", 7),
                }))
            }),
        );
    })
    .await;

    let draft = TripDraft {
        date: Some(chrono::NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
        time: Some(chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
        origin: "Salvador".to_owned(),
        destination: "Feira de Santana".to_owned(),
        seats: Some(3),
    };
    let now = chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let session = session("ana@example.com", Role::Driver, 7);
    let trip = api
        .create_trip(&session, &draft.validate(now).unwrap())
        .await
        .unwrap();

    assert_eq!(trip.id, TripId::new(9));
    assert_eq!(trip.status, TripStatus::Scheduled);

    let requests = recorded.take();
    assert_eq!(requests.len(), 1);
    assert_json_include!(
        actual: &requests[0],
        expected: json!({
            "origem": "Salvador",
            "destino": "Feira de Santana",
            "horario_partida": "10/01 - 10:00",
            "vagas_disponiveis": "3",
        })
    );
}

#[actix_web::test]
async fn set_status_returns_server_status() {
    let recorded = web::Data::new(Recorded::default());
    let data = recorded.clone();

    let api = mock(move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(data.clone()).route(
            "/viagens/{id}/status",
            web::put().to(
                |request: HttpRequest, id: web::Path<i64>, recorded: web::Data<Recorded>| async move {
                    recorded.push(&request);
                    HttpResponse::Ok().json(json!({
                        "mensagem": "Status atualizado",
                        "viagem": { "id": id.into_inner(), "status": "concluída", "motorista": 7 },
                    }))
                },
            ),
        );
    })
    .await;

    let session = session("ana@example.com", Role::Driver, 7);
    let status = api
        .set_trip_status(&session, TripId::new(4), TripStatus::Completed)
        .await
        .unwrap();

    assert_eq!(status, TripStatus::Completed);
    assert_eq!(recorded.take(), [json!({ "status": "concluída" })]);
}

#[actix_web::test]
async fn reserve_and_cancel() {
    let api = mock(|cfg: &mut web::ServiceConfig| {
        cfg.route(
            "/reservas/",
            web::post().to(|query: web::Query<Vec<(String, String)>>| async move {
                let trip: i64 = query
                    .iter()
                    .find(|(key, _)| key == "viagem_id")
                    .and_then(|(_, value)| value.parse().ok())
                    .unwrap_or_default();

                if trip != 3 {
                    return HttpResponse::BadRequest().json(json!({ "detail": "Vagas esgotadas" }));
                }

                HttpResponse::Ok().json(json!({
                    "mensagem": "Reserva realizada",
                    "reserva": {
                        "id": 12,
                        "viagem_id": 3,
                        "passageiro_id": 2,
                        "status": "confirmada",
                        "horario_confirmacao": "2026-01-02T10:00:00",
                    },
                }))
            }),
        )
        .route(
            "/reservas/{id}/cancelar",
            web::put().to(|id: web::Path<i64>| async move {
                match id.into_inner() {
                    12 => HttpResponse::Ok().json(json!({ "mensagem": "Reserva cancelada" })),
                    _ => HttpResponse::NotFound().json(json!({ "detail": "Reserva não encontrada" })),
                }
            }),
        );
    })
    .await;

    let session = session("bia@example.com", Role::Passenger, 2);

    let reservation = api.reserve(&session, TripId::new(3)).await.unwrap();
    assert_eq!(reservation.id, ReservationId::new(12));
    assert_eq!(reservation.trip, TripId::new(3));
    assert_eq!(reservation.status, ReservationStatus::Confirmed);

    let err = api.reserve(&session, TripId::new(4)).await.unwrap_err();
    assert_eq!(err.code(), Some(400));
    assert_eq!(err.to_string(), "Vagas esgotadas");

    api.cancel_reservation(&session, ReservationId::new(12))
        .await
        .unwrap();

    let err = api
        .cancel_reservation(&session, ReservationId::new(13))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(404));
    assert_eq!(err.to_string(), "Reserva não encontrada");
}

#[actix_web::test]
async fn tickets() {
    let recorded = web::Data::new(Recorded::default());
    let data = recorded.clone();

    let api = mock(move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(data.clone()).service(
            web::resource("/suporte/")
                .route(web::get().to(|| async {
                    HttpResponse::Ok().json(json!([{
                        "id": 1,
                        "usuario_id": 2,
                        "assunto": "Pagamento",
                        "mensagem": "Cobrança duplicada",
                        "status": "respondido",
                        "criado_em": "2026-01-02T10:15:30.123456",
                    }]))
                }))
                .route(web::post().to(
                    |request: HttpRequest, recorded: web::Data<Recorded>| async move {
                        recorded.push(&request);
                        HttpResponse::Ok().json(json!({
                            "mensagem": "Ticket criado",
                            "ticket": {
                                "id": 2,
                                "usuario_id": 2,
                                "assunto": "Atraso",
                                "mensagem": "Motorista atrasou",
                                "status": "aberto",
                                "criado_em": "2026-01-03T08:00:00",
                            },
                        }))
                    },
                )),
        );
    })
    .await;

    let session = session("bia@example.com", Role::Passenger, 2);

    let tickets = api.tickets(&session, Some(UserId::new(2))).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].status, TicketStatus::Answered);
    assert_eq!(tickets[0].subject, "Pagamento");

    let ticket = api
        .open_ticket(&session, &TicketDraft::new("Atraso", "Motorista atrasou"))
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);

    assert_eq!(
        recorded.take(),
        [json!({ "assunto": "Atraso", "mensagem": "Motorista atrasou" })]
    );
}

#[actix_web::test]
async fn malformed_success_body() {
    let api = mock(|cfg: &mut web::ServiceConfig| {
        cfg.route(
            "/motoristas",
            web::get().to(|| async { HttpResponse::Ok().body("<html>proxy page</html>") }),
        );
    })
    .await;

    let session = session("ana@example.com", Role::Driver, 7);
    let err = api.drivers(&session).await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[actix_web::test]
async fn unreachable_server() {
    let api = Api::new(&config::Api {
        base_url: "http://127.0.0.1:9".to_owned(),
        timeout_secs: Some(2),
    })
    .unwrap();

    let err = api.driver(UserId::new(1)).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.code(), None);
}
