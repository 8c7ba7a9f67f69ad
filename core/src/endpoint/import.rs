use serde_json::Value;

use super::{Endpoint, PageInfo};
use crate::client::ClubCollectClient;
use crate::error::ApiError;
use crate::params::Params;
use crate::resource::Import;

type ImportFactory<'c> = fn(&'c ClubCollectClient, &Value) -> Result<Import<'c>, ApiError>;

/// Endpoint for imports.
#[derive(Debug, Clone, Copy)]
pub struct ImportEndpoint<'c> {
    client: &'c ClubCollectClient,
}

impl<'c> ImportEndpoint<'c> {
    pub fn new(client: &'c ClubCollectClient) -> Self {
        Self { client }
    }

    fn driver(&self) -> Endpoint<'c, ImportFactory<'c>> {
        Endpoint::new(self.client, Import::from_json as ImportFactory<'c>)
    }

    /// Create an import for the client's company.
    ///
    /// With `expected_invoices_count` set, the import cannot be transmitted
    /// from the ClubCollect UI until that many invoices exist.
    pub fn create(
        &self,
        title: Option<&str>,
        expected_invoices_count: Option<i64>,
    ) -> Result<Import<'c>, ApiError> {
        let body = Params::new()
            .with("title", title)
            .with("company_id", self.client.company_id())
            .with("expected_invoices_count", expected_invoices_count);
        self.driver()
            .rest_post(&["imports"], &self.client.auth_params(), &body)
    }

    pub fn delete(&self, import_id: &str) -> Result<(), ApiError> {
        self.driver()
            .rest_delete(&["imports", import_id], &self.client.auth_params())
    }

    pub fn fetch(&self, import_id: &str) -> Result<Import<'c>, ApiError> {
        self.driver()
            .rest_get(&["imports", import_id], &self.client.auth_params())
    }

    /// Fetch pages `from..=to` of the company's imports; both ends default to
    /// the first and last page.
    pub fn fetch_all(&self, from: Option<u32>, to: Option<u32>) -> Result<Vec<Import<'c>>, ApiError> {
        self.driver().rest_get_pages(
            "imports",
            from,
            to,
            &["companies", self.client.company_id(), "imports"],
            &self.client.auth_params(),
        )
    }

    pub fn fetch_page_info(&self) -> Result<PageInfo, ApiError> {
        self.driver().rest_get_page_info(
            &["companies", self.client.company_id(), "imports"],
            &self.client.auth_params(),
        )
    }

    /// Start collecting the import's invoices.
    pub fn transmit(&self, import_id: &str) -> Result<Import<'c>, ApiError> {
        self.driver().rest_put(
            &["imports", import_id, "transmit"],
            &self.client.auth_params(),
            None,
        )
    }

    pub fn update(
        &self,
        import_id: &str,
        expected_invoices_count: Option<i64>,
    ) -> Result<Import<'c>, ApiError> {
        let body = Params::new().with("expected_invoices_count", expected_invoices_count);
        self.driver().rest_put(
            &["imports", import_id],
            &self.client.auth_params(),
            Some(&body),
        )
    }
}
