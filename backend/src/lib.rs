//! Habitgrid backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds validated types and
//! the services behind the driving ports, `outbound` holds persistence and
//! security adapters, and `inbound` exposes the REST surface.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware attaching a `Trace-Id` header.
pub use middleware::trace::Trace;
