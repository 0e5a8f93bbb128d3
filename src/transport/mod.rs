//! # Transport
//!
//! The transport collaborator only has to asynchronously return a response
//! or fail. Every call goes through an [`Interceptor`], which attaches
//! request metadata, keeps the in-flight count and normalizes failures.

mod credentials;
mod http;
mod inflight;
mod interceptor;
mod request;
mod scripted;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use http::{HttpTransport, HttpTransportBuilder};
pub use inflight::{InFlightGuard, InFlightTracker};
pub use interceptor::{Interceptor, REQUEST_ID_HEADER, SHOW_LOADING_HEADER};
pub use request::{Method, RequestBody, ResponseBody, ResponseKind, TransportRequest, TransportResponse};
pub use scripted::ScriptedTransport;

use crate::errors::TransportFailure;

/// Future returned by [`Transport::send`]
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportFailure>> + Send + 'a>>;

/// Sends one request.
///
/// Implementations return `Ok` only for success statuses; any other status
/// is a [`TransportFailure::Status`].
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: TransportRequest) -> TransportFuture<'a>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send<'a>(&'a self, request: TransportRequest) -> TransportFuture<'a> {
        (**self).send(request)
    }
}
