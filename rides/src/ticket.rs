//! Support tickets

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::TicketStatus;
use crate::user::UserId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Ticket subject is empty")]
    EmptySubject,
    #[error("Ticket message is empty")]
    EmptyMessage,
}

/// Ticket ID newtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(rename = "usuario_id")]
    pub user: UserId,
    #[serde(rename = "assunto")]
    pub subject: String,
    #[serde(rename = "mensagem", default)]
    pub message: Option<String>,
    pub status: TicketStatus,
    #[serde(rename = "criado_em", default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Ticket about to be opened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketDraft {
    pub subject: String,
    pub message: String,
}

impl TicketDraft {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Both subject and message have to contain something else than whitespaces
    pub fn validate(&self) -> Result<(), Error> {
        if self.subject.trim().is_empty() {
            return Err(Error::EmptySubject);
        }

        if self.message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        Ok(())
    }
}
