use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::{FieldReader, ResourceKind};
use crate::cast;
use crate::client::ClubCollectClient;
use crate::error::ApiError;

/// A message in the conversation attached to an invoice.
#[derive(Debug, Clone)]
pub struct Ticket<'c> {
    client: &'c ClubCollectClient,
    date: DateTime<FixedOffset>,
    invoice_id: Option<String>,
    message: String,
    sender: String,
    ticket_id: String,
}

impl<'c> Ticket<'c> {
    /// `invoice_id` is the invoice the caller is working on. The service
    /// omits `invoice_id` from some responses, in which case this one is used.
    pub fn from_json(
        client: &'c ClubCollectClient,
        value: &Value,
        invoice_id: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut reader = FieldReader::new(ResourceKind::Ticket, value)?;
        let date = reader.field("date", cast::man_datetime);
        let invoice_id = reader.field("invoice_id", |name, value| {
            cast::opt_string(name, value, invoice_id.map(str::to_string))
        });
        let message = reader.field("message", cast::man_string);
        let sender = reader.field("sender", cast::man_string);
        let ticket_id = reader.field("ticket_id", cast::man_string);

        reader.finish(Self {
            client,
            date,
            invoice_id,
            message,
            sender,
            ticket_id,
        })
    }

    pub fn client(&self) -> &'c ClubCollectClient {
        self.client
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn invoice_id(&self) -> Option<&str> {
        self.invoice_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    /// Post a new message on the same invoice.
    pub fn reply(&self, message: &str) -> Result<Ticket<'c>, ApiError> {
        let invoice_id = self.invoice_id.as_deref().ok_or_else(|| {
            ApiError::new(
                format!("Ticket {} is not linked to an invoice", self.ticket_id),
                Vec::new(),
            )
        })?;
        self.client.tickets().create(invoice_id, message)
    }
}
