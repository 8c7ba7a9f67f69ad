use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::{FieldReader, ResourceKind};
use crate::cast;
use crate::client::ClubCollectClient;
use crate::error::ApiError;

/// A batch of invoices to be sent to members.
#[derive(Debug, Clone)]
pub struct Import<'c> {
    client: &'c ClubCollectClient,
    import_id: String,
    company_id: String,
    title: Option<String>,
    expected_invoices_count: Option<i64>,
    transmitted: bool,
    created_at: DateTime<FixedOffset>,
}

impl<'c> Import<'c> {
    pub fn from_json(client: &'c ClubCollectClient, value: &Value) -> Result<Self, ApiError> {
        let mut reader = FieldReader::new(ResourceKind::Import, value)?;
        let import_id = reader.field("import_id", cast::man_string);
        let company_id = reader.field("company_id", cast::man_string);
        let title = reader.field("title", |name, value| cast::opt_string(name, value, None));
        let expected_invoices_count = reader.field("expected_invoices_count", |name, value| {
            cast::opt_int(name, value, None)
        });
        let transmitted = reader.field("transmitted", cast::man_bool);
        let created_at = reader.field("created_at", cast::man_datetime);

        reader.finish(Self {
            client,
            import_id,
            company_id,
            title,
            expected_invoices_count,
            transmitted,
            created_at,
        })
    }

    pub fn client(&self) -> &'c ClubCollectClient {
        self.client
    }

    pub fn import_id(&self) -> &str {
        &self.import_id
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Invoices the import waits for before it may be transmitted from the UI.
    pub fn expected_invoices_count(&self) -> Option<i64> {
        self.expected_invoices_count
    }

    pub fn transmitted(&self) -> bool {
        self.transmitted
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    /// Fetch the current state of this import.
    pub fn refresh(&self) -> Result<Import<'c>, ApiError> {
        self.client.imports().fetch(&self.import_id)
    }

    pub fn update(&self, expected_invoices_count: Option<i64>) -> Result<Import<'c>, ApiError> {
        self.client
            .imports()
            .update(&self.import_id, expected_invoices_count)
    }

    pub fn transmit(&self) -> Result<Import<'c>, ApiError> {
        self.client.imports().transmit(&self.import_id)
    }

    pub fn delete(self) -> Result<(), ApiError> {
        self.client.imports().delete(&self.import_id)
    }
}
