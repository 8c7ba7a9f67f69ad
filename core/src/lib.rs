//! Typed client for the ClubCollect collections API.
//!
//! # Overview
//! Every endpoint call goes through one generic driver ([`Endpoint`]) that
//! performs a blocking HTTP round trip, checks the status, decodes JSON and
//! hands each object to a factory building a typed resource ([`Import`],
//! [`Ticket`]). Field values are converted by the strict functions in
//! [`cast`]; any failure on the way reaches the caller as one [`ApiError`].
//!
//! # Design
//! - [`ClubCollectClient`] is read-only configuration plus a [`Transport`];
//!   resources and endpoints borrow it.
//! - The transport is a trait so tests can run without a network.
//!   [`UreqTransport`] is the default.
//! - Request parameters ([`Params`]) drop null entries before they reach the
//!   wire.
//! - Paginated reads fetch pages sequentially and are all-or-nothing.

pub mod cast;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;
pub mod resource;

pub use cast::{CastError, Decimal};
pub use client::{ClientConfig, ClubCollectClient};
pub use endpoint::{Endpoint, ImportEndpoint, PageInfo, TicketEndpoint};
pub use error::{ApiError, ErrorCause, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use params::Params;
pub use resource::{Import, Resource, ResourceKind, Ticket};
