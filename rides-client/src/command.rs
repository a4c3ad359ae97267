//! Command line actions

use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveTime};
use clap::Subcommand;
use color_eyre::Result;
use rides::{
    CalendarDate, Categorized, MonthCursor, ReservationId, ReservationView, Role, TripDraft, TripId,
    TripStatus,
};

use crate::context::Context;
use crate::view::account::{self, Registration};
use crate::view::calendar::CalendarView;
use crate::view::profile::ProfileView;
use crate::view::support::SupportView;
use crate::view::trip_form::TripForm;

fn parse_time(time: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// `driver` or `passenger`
        #[arg(long)]
        role: Role,
        /// Driving license number, required for drivers
        #[arg(long)]
        license: Option<String>,
        #[arg(long)]
        car_model: Option<String>,
        #[arg(long)]
        plate: Option<String>,
        /// Identity document file, required for drivers
        #[arg(long)]
        document: Option<PathBuf>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Shows the logged in user
    Whoami,
    /// Shows the month grid and the trips of a day
    Calendar {
        /// Month as `YYYY-MM`, current one by default
        #[arg(long)]
        month: Option<MonthCursor>,
        /// Day as `dd/mm/yyyy`
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Offers a trip as a driver
    Offer {
        /// Departure day as `dd/mm/yyyy`
        #[arg(long)]
        date: CalendarDate,
        /// Departure time as `HH:MM`
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        seats: u32,
    },
    /// Reserves a seat on a trip departing on the given day
    Reserve {
        trip: TripId,
        #[arg(long)]
        date: CalendarDate,
    },
    /// Shows own trips or reservations
    Profile,
    /// Changes status of an own trip
    Status { trip: TripId, status: TripStatus },
    /// Cancels a reservation
    Cancel { reservation: ReservationId },
    /// Support tickets
    Support {
        #[command(subcommand)]
        command: SupportCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SupportCommand {
    /// Lists own tickets
    List,
    /// Opens a new ticket
    Open {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
}

impl Command {
    pub async fn run(self, context: &mut Context) -> Result<()> {
        let now = Local::now().naive_local();

        match self {
            Command::Register {
                name,
                email,
                password,
                phone,
                role,
                license,
                car_model,
                plate,
                document,
            } => {
                let registration = Registration {
                    name,
                    email,
                    password,
                    phone,
                    role,
                    license,
                    car_model,
                    plate,
                    document,
                };
                account::register(context.api(), registration).await?;
                println!("Account created, you can log in now");
            }
            Command::Login { email, password } => {
                let session = context.login(&email, &password).await?;
                println!("Logged in as {} ({})", session.subject(), session.role());
            }
            Command::Logout => {
                context.logout().await?;
                println!("Logged out");
            }
            Command::Whoami => {
                let session = context.session()?;
                println!("{} ({})", session.subject(), session.role());
                if let Some(id) = session.user_id() {
                    println!("User id: {id}");
                }
                if let Some(expires_at) = session.claims().expires_at {
                    println!("Session expires at {}", expires_at.with_timezone(&Local));
                }
            }
            Command::Calendar { month, date } => {
                let mut view = match context.session() {
                    Ok(session) => CalendarView::for_session(session, now.date()),
                    Err(_) => CalendarView::new(Role::Passenger, None, now.date()),
                };

                if let Some(month) = month {
                    view.show_month_of(month.first_day());
                }

                if let Some(date) = date {
                    view.show_month_of(date.date());
                    view.select_date(context.api(), date).await;
                }

                print!("{}", view.grid());
                if let Some(date) = view.selected() {
                    println!();
                    print_day(&view, date);
                }
            }
            Command::Offer {
                date,
                time,
                from,
                to,
                seats,
            } => {
                let session = context.session()?;
                let mut form = TripForm::prefilled(date);
                form.draft = TripDraft {
                    time: Some(time),
                    origin: from,
                    destination: to,
                    seats: Some(seats),
                    ..form.draft
                };

                let trip = form.submit(context.api(), session, now).await?;
                println!("Trip {} offered for {}", trip.id, trip.departure);
            }
            Command::Reserve { trip, date } => {
                let session = context.session()?;
                let mut view = CalendarView::for_session(session, date.date());
                view.select_date(context.api(), date).await;

                let reservation = view.reserve(context.api(), session, trip).await?;
                println!("Reservation {} confirmed", reservation.id);
            }
            Command::Profile => {
                let session = context.session()?;
                let mut view = ProfileView::new(session);
                view.load(context.api(), session).await?;
                print_profile(&view, now.year());
            }
            Command::Status { trip, status } => {
                let session = context.session()?;
                let mut view = ProfileView::new(session);
                let status = view
                    .set_trip_status(context.api(), session, trip, status)
                    .await?;
                println!("Trip {trip} is now {status}");
            }
            Command::Cancel { reservation } => {
                let session = context.session()?;
                let mut view = ProfileView::new(session);
                view.cancel_reservation(context.api(), session, reservation)
                    .await?;
                println!("Reservation {reservation} cancelled");
            }
            Command::Support { command } => {
                let session = context.session()?;
                let mut view = SupportView::new(session);

                if let SupportCommand::Open { subject, message } = command {
                    let ticket = view
                        .submit(context.api(), session, &subject, &message)
                        .await?;
                    println!("Ticket {} opened", ticket.id);
                } else {
                    view.refresh(context.api(), session).await;
                }

                for ticket in view.tickets() {
                    let created = ticket
                        .created_at
                        .map(|at| at.format("%d/%m/%Y %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_owned());
                    println!(
                        "#{} [{}] {} - {} ({})",
                        ticket.id,
                        ticket.status,
                        ticket.subject,
                        ticket.message.as_deref().unwrap_or(""),
                        created
                    );
                }
            }
        }

        Ok(())
    }
}

fn print_day(view: &CalendarView, date: CalendarDate) {
    if view.is_empty_day() {
        println!("No trips on {date}");
        return;
    }

    println!("Trips on {date}:");
    for entry in view.entries() {
        let trip = &entry.trip;
        let mut line = format!(
            "  #{} {} {} -> {}, {} seats left [{}]",
            trip.id,
            trip.departure.time_label(),
            trip.origin,
            trip.destination,
            trip.seats,
            trip.status
        );

        if let Some(driver) = view.driver_name(trip) {
            line.push_str(&format!(", driver {driver}"));
        }
        if entry.owned {
            line.push_str(", yours");
        }
        if view.can_reserve(trip.id) {
            line.push_str(", reservable");
        }

        println!("{line}");
    }
}

fn print_reservations(title: &str, views: &[ReservationView]) {
    println!("{title}:");
    if views.is_empty() {
        println!("  none");
    }

    for view in views {
        println!(
            "  #{} trip {} {} {} -> {} [{}]",
            view.id, view.trip, view.departure, view.origin, view.destination, view.trip_status
        );
    }
}

fn print_profile(view: &ProfileView, year: i32) {
    match view.name() {
        Some(name) => println!("{name} ({})", view.role()),
        None => println!("({})", view.role()),
    }

    match view.role() {
        Role::Driver => {
            println!("Trips:");
            for trip in view.trips(year) {
                println!(
                    "  #{} {} {} -> {}, {} seats left [{}]",
                    trip.id, trip.departure, trip.origin, trip.destination, trip.seats, trip.status
                );
            }
        }
        Role::Passenger => {
            let Categorized {
                active,
                completed,
                cancelled,
            } = view.categorized(year);

            print_reservations("Active", &active);
            print_reservations("Completed", &completed);
            print_reservations("Cancelled", &cancelled);
        }
    }
}
