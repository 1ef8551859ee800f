//! # Transport Seam
//!
//! The client is deliberately agnostic about how requests reach the server:
//! connection establishment, per-endpoint handle caching and the XML-RPC
//! framing all live behind the [`Transport`] trait. The client only ever
//! asks for one thing: send this [`RpcRequest`] to this [`Endpoint`] and
//! hand back either a [`WireValue`] or a [`Fault`].
//!
//! Implementations address one logical endpoint per `(base url, kind)` pair
//! (`{url}/xmlrpc/{segment}`); creating handles lazily and caching them per
//! kind is their concern, not the client's.

use crate::{BoxError, value::WireValue};

/// The logical endpoint kinds exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Identity: `login` and `version`.
    Common,
    /// Business-object calls (`execute`).
    Object,
    /// Database administration.
    Db,
}

impl Endpoint {
    /// Path segment of the endpoint (`{url}/xmlrpc/{segment}`).
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Common => "common",
            Endpoint::Object => "object",
            Endpoint::Db => "db",
        }
    }
}

/// A named RPC method plus its ordered parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<WireValue>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Appends one parameter.
    pub fn param(mut self, value: WireValue) -> Self {
        self.params.push(value);
        self
    }
}

/// A protocol-level fault returned by the server.
///
/// Code and message are carried verbatim; the client surfaces faults to the
/// caller unmodified.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Server fault {code}: {message}")]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

/// Contract required of the transport collaborator.
///
/// # Returns
///
/// * `Ok(Ok(WireValue))` - The server answered with a value.
/// * `Ok(Err(Fault))` - The round trip completed but the server answered
///   with a protocol fault.
/// * `Err(BoxError)` - The round trip itself failed (connection problem).
///
/// Timeouts, cancellation and retries are transport concerns; the client
/// defines none.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(
        &mut self,
        endpoint: Endpoint,
        request: RpcRequest,
    ) -> Result<Result<WireValue, Fault>, BoxError>;
}
