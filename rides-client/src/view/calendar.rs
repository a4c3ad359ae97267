//! Monthly calendar with the trips of the selected day

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use rides::{CalendarDate, MonthCursor, Reservation, Role, Trip, TripId, UserId};
use tracing::{debug, info, instrument, warn};

use crate::api::{Api, ApiResult};
use crate::context::auth::Session;
use crate::view::{Error, Result};

/// Trip listed on the selected day
#[derive(Debug, Clone, PartialEq)]
pub struct TripEntry {
    pub trip: Trip,
    /// Trip offered by the viewer
    pub owned: bool,
}

/// Trips request issued by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripQuery {
    seq: u64,
    date: CalendarDate,
}

#[derive(Debug)]
pub struct CalendarView {
    role: Role,
    viewer: Option<UserId>,
    cursor: MonthCursor,
    selected: Option<CalendarDate>,
    entries: Vec<TripEntry>,
    loading: bool,
    /// Sequence number of the latest issued query
    latest: u64,
    driver_names: HashMap<UserId, String>,
}

impl CalendarView {
    pub fn new(role: Role, viewer: Option<UserId>, today: NaiveDate) -> Self {
        Self {
            role,
            viewer,
            cursor: MonthCursor::containing(today),
            selected: None,
            entries: Vec::new(),
            loading: false,
            latest: 0,
            driver_names: HashMap::new(),
        }
    }

    pub fn for_session(session: &Session, today: NaiveDate) -> Self {
        Self::new(session.role(), session.user_id(), today)
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn selected(&self) -> Option<CalendarDate> {
        self.selected
    }

    pub fn entries(&self) -> &[TripEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Selected day finished loading with no trips
    pub fn is_empty_day(&self) -> bool {
        self.selected.is_some() && !self.loading && self.entries.is_empty()
    }

    /// Moves the visible month, dropping the selection
    pub fn shift_month(&mut self, delta: i32) {
        self.cursor = self.cursor.shift(delta);
        self.selected = None;
        self.entries.clear();
        self.loading = false;
        // Results of queries still in flight belong to the previous selection
        self.latest += 1;
    }

    /// Shows the month containing `date`
    pub fn show_month_of(&mut self, date: NaiveDate) {
        let target = MonthCursor::containing(date);
        let delta = (target.year() - self.cursor.year()) * 12 + target.month() as i32
            - self.cursor.month() as i32;
        if delta != 0 {
            self.shift_month(delta);
        }
    }

    /// Selects the day and issues a new trips query for it
    pub fn begin_query(&mut self, date: CalendarDate) -> TripQuery {
        self.latest += 1;
        self.selected = Some(date);
        self.loading = true;

        TripQuery {
            seq: self.latest,
            date,
        }
    }

    /// Applies the query result unless a newer query was issued meanwhile
    ///
    /// Returns if the result was applied. Failures leave the day empty.
    pub fn complete_query(&mut self, query: TripQuery, result: ApiResult<Vec<Trip>>) -> bool {
        if query.seq != self.latest {
            debug!(date = %query.date, "Discarding stale trips result");
            return false;
        }

        self.loading = false;
        self.entries = match result {
            Ok(trips) => trips
                .into_iter()
                .map(|trip| TripEntry {
                    owned: self.viewer.is_some_and(|viewer| trip.is_driven_by(viewer)),
                    trip,
                })
                .collect(),
            Err(err) => {
                warn!(date = %query.date, %err, "Cannot fetch trips");
                Vec::new()
            }
        };

        true
    }

    /// Selects the day and loads its trips
    #[instrument(skip(self, api))]
    pub async fn select_date(&mut self, api: &Api, date: CalendarDate) {
        let query = self.begin_query(date);
        let result = api.trips_on(date).await;

        if self.complete_query(query, result) && self.role == Role::Passenger {
            self.resolve_driver_names(api).await;
        }
    }

    /// Fetches display names of the listed drivers not known yet
    async fn resolve_driver_names(&mut self, api: &Api) {
        let missing: BTreeSet<UserId> = self
            .entries
            .iter()
            .map(|entry| entry.trip.driver.id)
            .filter(|id| !self.driver_names.contains_key(id))
            .collect();

        for id in missing {
            match api.driver(id).await {
                Ok(driver) => {
                    self.driver_names.insert(id, driver.name);
                }
                Err(err) => warn!(driver = %id, %err, "Cannot resolve driver name"),
            }
        }
    }

    /// Display name of the trip driver
    pub fn driver_name<'a>(&'a self, trip: &'a Trip) -> Option<&'a str> {
        self.driver_names
            .get(&trip.driver.id)
            .map(String::as_str)
            .or(trip.driver.name.as_deref())
    }

    fn entry(&self, trip: TripId) -> Option<&TripEntry> {
        self.entries.iter().find(|entry| entry.trip.id == trip)
    }

    pub fn can_reserve(&self, trip: TripId) -> bool {
        self.role == Role::Passenger && self.entry(trip).is_some_and(|entry| entry.trip.is_bookable())
    }

    /// Reserves a seat on a listed trip
    #[instrument(skip(self, api, session))]
    pub async fn reserve(&mut self, api: &Api, session: &Session, trip: TripId) -> Result<Reservation> {
        if !self.can_reserve(trip) {
            return Err(Error::NotBookable(trip));
        }

        let reservation = api.reserve(session, trip).await?;
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.trip.id == trip) {
            entry.trip.take_seat();
        }

        info!(reservation = %reservation.id, "Seat reserved");
        Ok(reservation)
    }

    /// Renders the month grid, highlighting the selected day
    pub fn grid(&self) -> String {
        let selected = self
            .selected
            .map(CalendarDate::date)
            .filter(|date| self.cursor.contains(*date));

        let mut grid = format!("{:^28}\n", self.cursor.to_string());
        grid.push_str(" Su  Mo  Tu  We  Th  Fr  Sa \n");

        let mut column = self.cursor.leading_blanks();
        grid.push_str(&"    ".repeat(column as usize));

        for day in self.cursor.days() {
            if Some(day) == selected {
                grid.push_str(&format!("[{:>2}]", day.day()));
            } else {
                grid.push_str(&format!(" {:>2} ", day.day()));
            }

            column += 1;
            if column == 7 {
                grid.push('\n');
                column = 0;
            }
        }

        if column != 0 {
            grid.push('\n');
        }

        grid
    }
}
