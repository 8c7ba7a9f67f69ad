//! Typed domain objects decoded from service responses.
//!
//! # Design
//! A resource is only ever built from one decoded JSON object, through its
//! `from_json` constructor. Construction reads every field in declaration
//! order with a [`FieldReader`], which records each failing cast instead of
//! stopping at the first one. If any field failed, the half-built value is
//! dropped and a single `ApiError` listing all failures is returned.
//!
//! Resources borrow the client that fetched them, so follow-up calls (refresh,
//! transmit, reply) run in the same context.

mod import;
mod ticket;

pub use import::Import;
pub use ticket::Ticket;

use serde_json::{Map, Value};

use crate::cast::CastError;
use crate::client::ClubCollectClient;
use crate::error::{ApiError, ErrorCause};

/// The kinds of resource this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Import,
    Ticket,
}

impl ResourceKind {
    /// Singular noun with article, as used in error messages.
    pub fn article_name(self) -> &'static str {
        match self {
            ResourceKind::Import => "an import",
            ResourceKind::Ticket => "a ticket",
        }
    }
}

/// Any resource returned by the service.
#[derive(Debug, Clone)]
pub enum Resource<'c> {
    Import(Import<'c>),
    Ticket(Ticket<'c>),
}

impl<'c> Resource<'c> {
    /// Build a resource of the given kind from a decoded object.
    pub fn from_json(
        kind: ResourceKind,
        client: &'c ClubCollectClient,
        value: &Value,
    ) -> Result<Self, ApiError> {
        match kind {
            ResourceKind::Import => Import::from_json(client, value).map(Resource::Import),
            ResourceKind::Ticket => Ticket::from_json(client, value, None).map(Resource::Ticket),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Import(_) => ResourceKind::Import,
            Resource::Ticket(_) => ResourceKind::Ticket,
        }
    }

    pub fn client(&self) -> &'c ClubCollectClient {
        match self {
            Resource::Import(import) => import.client(),
            Resource::Ticket(ticket) => ticket.client(),
        }
    }
}

impl<'c> From<Import<'c>> for Resource<'c> {
    fn from(import: Import<'c>) -> Self {
        Resource::Import(import)
    }
}

impl<'c> From<Ticket<'c>> for Resource<'c> {
    fn from(ticket: Ticket<'c>) -> Self {
        Resource::Ticket(ticket)
    }
}

/// Reads the fields of one JSON object, collecting cast failures.
pub(crate) struct FieldReader<'v> {
    kind: ResourceKind,
    object: &'v Map<String, Value>,
    failures: Vec<ErrorCause>,
}

impl<'v> FieldReader<'v> {
    pub(crate) fn new(kind: ResourceKind, value: &'v Value) -> Result<Self, ApiError> {
        match value.as_object() {
            Some(object) => Ok(Self {
                kind,
                object,
                failures: Vec::new(),
            }),
            None => Err(ApiError::new(
                failure_message(kind),
                vec![ErrorCause::Decode(format!("expected a JSON object, found {value}"))],
            )),
        }
    }

    /// Cast one field. On failure the error is recorded and a placeholder is
    /// returned; [`FieldReader::finish`] then discards the whole resource.
    pub(crate) fn field<T: Default>(
        &mut self,
        name: &str,
        cast: impl FnOnce(&str, Option<&Value>) -> Result<T, CastError>,
    ) -> T {
        match cast(name, self.object.get(name)) {
            Ok(value) => value,
            Err(err) => {
                self.failures.push(err.into());
                T::default()
            }
        }
    }

    pub(crate) fn finish<T>(self, resource: T) -> Result<T, ApiError> {
        if self.failures.is_empty() {
            Ok(resource)
        } else {
            Err(ApiError::new(failure_message(self.kind), self.failures))
        }
    }
}

fn failure_message(kind: ResourceKind) -> String {
    format!("Failed to create {}", kind.article_name())
}
