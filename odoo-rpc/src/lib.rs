//! # Odoo RPC
//!
//! `odoo-rpc` is a dynamic client for the Odoo object API. It speaks to any
//! model (record type) the server exposes without compile-time knowledge of
//! its schema: callers pass `serde_json::Value` data in, the client marshals
//! it into the tagged wire representation, performs the call, and unmarshals
//! the response back into JSON.
//!
//! ## Key Components
//!
//! * **[`OdooClient`]:** The main entry point. It authenticates lazily,
//!   assembles the parameter preamble shared by every business-object call,
//!   and exposes the operation set (search, read, write, create, unlink,
//!   bulk load, external-id resolution).
//! * **[`WireValue`] & [`IntoWire`]:** The tagged wire value and the
//!   bidirectional converters between it and native JSON.
//! * **[`Transport`]:** The seam behind which the actual RPC transport
//!   (connection handling, XML-RPC framing) lives. The client is generic
//!   over it, so tests drive the full stack against an in-memory double.
//!
//! ## Version skew
//!
//! Servers older than 8.0 lack the combined `search_read` call; the client
//! detects the server version during authentication and transparently
//! emulates the operation with `search` followed by `read`.
//!
//! ## Concurrency
//!
//! A client instance holds mutable session state (the lazily-resolved user
//! id and server version) and a mutable model-wrapper table. Every operation
//! takes `&mut self`; sharing one client between concurrent callers requires
//! external synchronization.
//!
//! ## Re-exports
//!
//! This crate re-exports `indexmap` to ensure that consumers matching on
//! [`WireValue::Struct`] use a compatible version of the underlying map.

pub mod client;
pub mod config;
pub mod load;
pub mod model;
pub mod relation;
pub mod request;
pub mod session;
pub mod transport;
pub mod value;

// Re-exports
pub use indexmap;

pub use client::{ClientError, OdooClient, SearchOptions};
pub use config::ClientConfig;
pub use load::{LoadOneResult, LoadResult};
pub use model::{ModelRegistry, Record, RecordCtor};
pub use relation::RelationCommand;
pub use session::Session;
pub use transport::{Endpoint, Fault, RpcRequest, Transport};
pub use value::{IntoWire, ValueError, WireKind, WireValue};

/// Type alias for the standard boxed error used at the transport seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
