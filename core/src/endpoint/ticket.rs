use serde_json::Value;

use super::{Endpoint, PageInfo};
use crate::client::ClubCollectClient;
use crate::error::ApiError;
use crate::params::Params;
use crate::resource::Ticket;

/// Endpoint for the tickets attached to an invoice.
#[derive(Debug, Clone, Copy)]
pub struct TicketEndpoint<'c> {
    client: &'c ClubCollectClient,
}

impl<'c> TicketEndpoint<'c> {
    pub fn new(client: &'c ClubCollectClient) -> Self {
        Self { client }
    }

    /// Driver whose tickets default to `invoice_id` when the response omits it.
    fn driver<'a>(
        &self,
        invoice_id: &'a str,
    ) -> Endpoint<'c, impl Fn(&'c ClubCollectClient, &Value) -> Result<Ticket<'c>, ApiError> + 'a> {
        Endpoint::new(self.client, move |client: &'c ClubCollectClient, value: &Value| {
            Ticket::from_json(client, value, Some(invoice_id))
        })
    }

    /// Add a message to the invoice's conversation.
    pub fn create(&self, invoice_id: &str, message: &str) -> Result<Ticket<'c>, ApiError> {
        let body = Params::new().with("message", message);
        self.driver(invoice_id).rest_post(
            &["invoices", invoice_id, "ticket"],
            &self.client.auth_params(),
            &body,
        )
    }

    pub fn fetch_all(
        &self,
        invoice_id: &str,
        from: Option<u32>,
        to: Option<u32>,
    ) -> Result<Vec<Ticket<'c>>, ApiError> {
        self.driver(invoice_id).rest_get_pages(
            "tickets",
            from,
            to,
            &["invoices", invoice_id, "tickets"],
            &self.client.auth_params(),
        )
    }

    pub fn fetch_page_info(&self, invoice_id: &str) -> Result<PageInfo, ApiError> {
        self.driver(invoice_id).rest_get_page_info(
            &["invoices", invoice_id, "tickets"],
            &self.client.auth_params(),
        )
    }
}
