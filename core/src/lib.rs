//! Client for the Easypanel control-plane API.
//!
//! # Overview
//! Easypanel exposes its operations as tRPC procedures under `/api/trpc/`.
//! Queries are GETs with their input JSON-encoded into an `input` query
//! parameter; mutations are POSTs with a JSON body. Both wrap their payload
//! as `{"json": ...}` and responses nest theirs under
//! `result.data.json`.
//!
//! # Design
//! - `PanelClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network, so request shapes
//!   and response handling are deterministic and testable on their own.
//! - `Easypanel` is the async façade that pairs a `PanelClient` with a
//!   `Transport` (by default `ReqwestTransport`) and runs the round-trip.
//! - Decoding is lenient: member names match case-insensitively, unknown
//!   members are ignored, missing members take their defaults. A query
//!   response without a payload is `None` from the `try_*` methods and the
//!   type's default from the plain ones.
//! - Any non-2xx status is an `ApiError::Status` carrying the URI, status
//!   and body. There are no retries.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod payload;
pub mod transport;
pub mod types;

pub use api::Easypanel;
pub use client::PanelClient;
pub use config::ClientConfig;
pub use endpoint::{Endpoint, ServiceAction, ServiceKind};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use payload::{FieldGroup, FieldValue, SparseFields};
pub use transport::{ReqwestTransport, Transport};
pub use types::*;
