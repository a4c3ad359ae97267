//! Support tickets

use rides::{Ticket, TicketDraft, UserId};
use tracing::{info, instrument, warn};

use crate::api::Api;
use crate::context::auth::Session;
use crate::view::Result;

#[derive(Debug)]
pub struct SupportView {
    user_id: Option<UserId>,
    tickets: Vec<Ticket>,
}

impl SupportView {
    pub fn new(session: &Session) -> Self {
        Self {
            user_id: session.user_id(),
            tickets: Vec::new(),
        }
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Reloads the user tickets, leaving the list empty on failure
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, api: &Api, session: &Session) {
        match api.tickets(session, self.user_id).await {
            Ok(tickets) => self.tickets = tickets,
            Err(err) => {
                warn!(%err, "Cannot fetch support tickets");
                self.tickets.clear();
            }
        }
    }

    /// Opens a ticket and reloads the list
    #[instrument(skip(self, api, session))]
    pub async fn submit(
        &mut self,
        api: &Api,
        session: &Session,
        subject: &str,
        message: &str,
    ) -> Result<Ticket> {
        let draft = TicketDraft::new(subject.trim(), message.trim());
        draft.validate()?;

        let ticket = api.open_ticket(session, &draft).await?;
        info!(ticket = %ticket.id, "Ticket opened");

        self.refresh(api, session).await;
        Ok(ticket)
    }
}
