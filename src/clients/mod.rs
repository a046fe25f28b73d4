//! HTTP client types for API communication.
//!
//! This module provides the transport layer shared by the auth, search and
//! history clients.
//!
//! - [`HttpClient`]: The async HTTP client
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT)
//! - [`HttpError`]: Transport, validation and non-2xx failures
//!
//! # Retry Behavior
//!
//! The transport never retries. The only automatic retry in the SDK is the
//! single refresh-and-retry performed after a 401 on an authorized call.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
