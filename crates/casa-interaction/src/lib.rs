//! Remote gateway for the Casa client.
//!
//! [`HttpPropertyService`] implements [`casa_core::PropertyService`] over the
//! backend's HTTP+JSON endpoints. Each call is one request/response exchange
//! with no retries and no state kept between calls.

pub mod http_property_service;

pub use http_property_service::HttpPropertyService;
