//! # Odoo Client
//!
//! The orchestrator. [`OdooClient`] authenticates lazily through
//! [`Session`], assembles the shared request preamble, marshals arguments
//! and responses through [`crate::value`], and exposes the public operation
//! set: the search family, read/create/write/unlink, field metadata, bulk
//! load, and external-id resolution.
//!
//! Every operation is one synchronous round trip (version emulation and
//! batched loads perform a small bounded number of sequential ones); nothing
//! retries, nothing runs in parallel.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::{
    BoxError, ClientConfig,
    load::{self, LoadOneResult, LoadResult},
    model::{ModelRegistry, Record, RecordCtor},
    request,
    session::Session,
    transport::{Endpoint, Fault, RpcRequest, Transport},
    value::{IntoWire, ValueError, WireValue},
};

/// The bookkeeping model that tracks external-id assignments.
const MODEL_DATA: &str = "ir.model.data";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot connect to Odoo database '{database}': {source}")]
    Connection { database: String, source: BoxError },
    #[error("Cannot find Odoo user id for username '{username}'")]
    Authentication { username: String },
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("Transport failure: {0}")]
    Transport(#[source] BoxError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Paging and ordering options for the search family.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub offset: i64,
    pub limit: i64,
    /// CSV list of fields to order by.
    pub order: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
            order: String::new(),
        }
    }
}

/// A client for one configured Odoo connection.
///
/// Generic over the [`Transport`] that moves requests. Holds mutable session
/// state (the lazily-resolved user id and server version) and the
/// model-wrapper table, so every operation takes `&mut self`: one owner at a
/// time, and sharing a client between concurrent callers requires external
/// synchronization.
#[derive(Debug, Clone)]
pub struct OdooClient<T> {
    transport: T,
    session: Session,
    models: ModelRegistry,
}

impl<T> OdooClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            session: Session::new(config),
            models: ModelRegistry::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Registers a wrapper constructor for a model name, effective for
    /// subsequent reads.
    pub fn add_model_mapping(&mut self, model: impl Into<String>, ctor: RecordCtor) {
        self.models.insert(model, ctor);
    }

    /// Registers a batch of wrapper constructors.
    pub fn add_model_map(&mut self, mappings: impl IntoIterator<Item = (String, RecordCtor)>) {
        self.models.extend(mappings);
    }

    /// Removes a wrapper constructor; the model falls back to the default.
    pub fn remove_model_mapping(&mut self, model: &str) {
        self.models.remove(model);
    }
}

impl<T: Transport> OdooClient<T> {
    /// Sends a request and unwraps protocol faults.
    async fn send(
        &mut self,
        endpoint: Endpoint,
        request: RpcRequest,
    ) -> Result<WireValue, ClientError> {
        let response = self
            .transport
            .send(endpoint, request)
            .await
            .map_err(ClientError::Transport)??;
        Ok(response)
    }

    /// Performs one business-object call: authenticate if needed, build the
    /// preamble, append the operation arguments, send on the object endpoint.
    async fn execute(
        &mut self,
        model: &str,
        action: &str,
        args: Vec<WireValue>,
    ) -> Result<WireValue, ClientError> {
        let user_id = self.session.authenticate(&mut self.transport).await?;
        let mut request = request::base_request(&self.session, user_id, Some(model), Some(action));
        request.params.extend(args);
        self.send(Endpoint::Object, request).await
    }

    /// Searches `model`, returning the matched internal ids.
    pub async fn search(
        &mut self,
        model: &str,
        criteria: impl IntoWire,
        opts: SearchOptions,
    ) -> Result<Vec<i64>, ClientError> {
        let response = self
            .execute(
                model,
                "search",
                vec![
                    criteria.into_wire()?,
                    WireValue::Int(opts.offset),
                    WireValue::Int(opts.limit),
                    WireValue::String(opts.order),
                ],
            )
            .await?;

        let ids = response.expect_array()?;
        ids.iter()
            .map(WireValue::expect_int)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Counts the records matching `criteria`.
    pub async fn search_count(
        &mut self,
        model: &str,
        criteria: impl IntoWire,
    ) -> Result<i64, ClientError> {
        let response = self
            .execute(model, "search_count", vec![criteria.into_wire()?])
            .await?;
        Ok(response.expect_int()?)
    }

    /// Searches and reads in one logical operation, returning row mappings.
    ///
    /// Servers older than 8.0 have no combined `search_read` call; against
    /// those the operation is emulated with `search` followed by `read`.
    /// Both paths return the same row shape.
    pub async fn search_read(
        &mut self,
        model: &str,
        criteria: impl IntoWire,
        opts: SearchOptions,
    ) -> Result<Vec<Map<String, Value>>, ClientError> {
        let criteria = criteria.into_wire()?;

        // Authenticate up front so the version gate has something to look at.
        self.session.authenticate(&mut self.transport).await?;

        if !self.session.supports_search_read() {
            log::debug!(
                "server '{}' predates search_read, emulating with search + read",
                self.session.server_version().unwrap_or_default()
            );
            let ids = self.search(model, criteria, opts).await?;
            return self.read_raw(model, &ids, Map::new()).await;
        }

        let response = self
            .execute(
                model,
                "search_read",
                vec![
                    criteria,
                    WireValue::Int(opts.offset),
                    WireValue::Int(opts.limit),
                    WireValue::String(opts.order),
                ],
            )
            .await?;
        rows_to_native(response)
    }

    /// Reads rows by id without wrapping them.
    async fn read_raw(
        &mut self,
        model: &str,
        ids: &[i64],
        options: Map<String, Value>,
    ) -> Result<Vec<Map<String, Value>>, ClientError> {
        let mut args = vec![WireValue::Array(
            ids.iter().map(|id| WireValue::Int(*id)).collect(),
        )];
        if !options.is_empty() {
            args.push(Value::Object(options).into_wire()?);
        }

        let response = self.execute(model, "read", args).await?;
        rows_to_native(response)
    }

    /// Reads rows by id and wraps each into the record type registered for
    /// `model`, preserving server-returned order. `options` (e.g. a `fields`
    /// projection) is forwarded only when non-empty.
    pub async fn read(
        &mut self,
        model: &str,
        ids: &[i64],
        options: Map<String, Value>,
    ) -> Result<Vec<Record>, ClientError> {
        let ctor = self.models.resolve(model);
        let rows = self.read_raw(model, ids, options).await?;
        Ok(rows.into_iter().map(ctor).collect())
    }

    /// Creates a record; the result is whatever the server returns
    /// (typically the new id).
    pub async fn create(
        &mut self,
        model: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let response = self
            .execute(model, "create", vec![Value::Object(fields).into_wire()?])
            .await?;
        Ok(response.into_native())
    }

    /// Writes field values to one record. The server method takes a list of
    /// ids; the single id travels as a one-element list.
    pub async fn write(
        &mut self,
        model: &str,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let response = self
            .execute(
                model,
                "write",
                vec![
                    WireValue::Array(vec![WireValue::Int(id)]),
                    Value::Object(fields).into_wire()?,
                ],
            )
            .await?;
        Ok(response.into_native())
    }

    /// Deletes one record.
    pub async fn unlink(&mut self, model: &str, id: i64) -> Result<Value, ClientError> {
        let response = self
            .execute(
                model,
                "unlink",
                vec![WireValue::Array(vec![WireValue::Int(id)])],
            )
            .await?;
        Ok(response.into_native())
    }

    /// Field metadata for `model`.
    pub async fn fields_get(&mut self, model: &str) -> Result<Map<String, Value>, ClientError> {
        let response = self.execute(model, "fields_get", Vec::new()).await?;
        let fields = response.expect_struct()?;
        Ok(fields
            .into_iter()
            .map(|(key, value)| (key, value.into_native()))
            .collect())
    }

    /// Server info from the `version` call. No authentication required.
    pub async fn version(&mut self) -> Result<Map<String, Value>, ClientError> {
        let response = self.send(Endpoint::Common, RpcRequest::new("version")).await?;
        let info = response.expect_struct()?;
        Ok(info
            .into_iter()
            .map(|(key, value)| (key, value.into_native()))
            .collect())
    }

    /// Resolves external ids (`module.name`, or a bare `name`) to internal
    /// ids via the `ir.model.data` bookkeeping model. Returns the ids in the
    /// order the server returns matching rows; empty input returns empty
    /// without a round trip, and no match returns empty rather than erroring.
    ///
    /// All per-module clauses are combined with AND, so one call is only
    /// reliable when every external id belongs to the same module. Mixing
    /// modules is a known limitation carried over from the upstream behavior.
    pub async fn get_resource_ids(
        &mut self,
        external_ids: &[&str],
        model: Option<&str>,
        opts: SearchOptions,
    ) -> Result<Vec<i64>, ClientError> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Partition names by module prefix; bare names form the no-module
        // bucket, which gets no module clause.
        let mut buckets: IndexMap<String, Vec<Value>> = IndexMap::new();
        for external_id in external_ids {
            let (module, name) = match external_id.split_once('.') {
                Some((module, name)) => (module, name),
                None => ("", *external_id),
            };
            buckets
                .entry(module.to_string())
                .or_default()
                .push(Value::String(name.to_string()));
        }

        let mut criteria: Vec<Value> = Vec::new();
        for (module, names) in buckets {
            if !module.is_empty() {
                criteria.push(json!(["module", "=", module]));
            }
            criteria.push(json!(["name", "in", names]));
        }
        if let Some(model) = model {
            criteria.push(json!(["model", "=", model]));
        }

        let ids = self.search(MODEL_DATA, Value::Array(criteria), opts).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.read_raw(MODEL_DATA, &ids, Map::new()).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("res_id").and_then(Value::as_i64))
            .collect())
    }

    /// Resolves a single external id; `None` when it does not exist.
    pub async fn get_resource_id(
        &mut self,
        external_id: &str,
        model: Option<&str>,
    ) -> Result<Option<i64>, ClientError> {
        let ids = self
            .get_resource_ids(&[external_id], model, SearchOptions::default())
            .await?;
        Ok(ids.into_iter().next())
    }

    /// Bulk upsert-by-external-id.
    ///
    /// Records are grouped by their key sequence (see
    /// [`load::group_records`]) and each group is sent as one `load` call
    /// carrying the key header and positional value rows. `ids` and
    /// `messages` accumulate in group order, then row order. A group whose
    /// response carries no list-shaped `ids` or `messages` (a boolean
    /// failure sentinel, say) contributes nothing to that accumulator rather
    /// than failing the batch.
    pub async fn load(
        &mut self,
        model: &str,
        records: Vec<Map<String, Value>>,
    ) -> Result<LoadResult, ClientError> {
        let groups = load::group_records(records);
        log::debug!("load: {} record group(s) for {model}", groups.len());

        let mut result = LoadResult::default();
        for group in groups {
            let keys = WireValue::Array(group.keys.into_iter().map(WireValue::String).collect());
            let rows = group
                .rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(IntoWire::into_wire)
                        .collect::<Result<Vec<_>, _>>()
                        .map(WireValue::Array)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(WireValue::Array)?;

            let response = self.execute(model, "load", vec![keys, rows]).await?;

            let WireValue::Struct(mut fields) = response else {
                continue;
            };
            if let Some(WireValue::Array(ids)) = fields.swap_remove("ids") {
                result.ids.extend(ids.into_iter().map(WireValue::into_native));
            }
            if let Some(WireValue::Array(messages)) = fields.swap_remove("messages") {
                result
                    .messages
                    .extend(messages.into_iter().map(WireValue::into_native));
            }
        }

        Ok(result)
    }

    /// [`OdooClient::load`] for a single record, unwrapping the first id.
    pub async fn load_one(
        &mut self,
        model: &str,
        record: Map<String, Value>,
    ) -> Result<LoadOneResult, ClientError> {
        let mut result = self.load(model, vec![record]).await?;
        let id = if result.ids.is_empty() {
            None
        } else {
            Some(result.ids.remove(0))
        };
        Ok(LoadOneResult {
            id,
            messages: result.messages,
        })
    }
}

/// Converts an array-of-structs response into native row mappings.
fn rows_to_native(response: WireValue) -> Result<Vec<Map<String, Value>>, ClientError> {
    let rows = response.expect_array()?;
    rows.into_iter()
        .map(|row| {
            let fields = row.expect_struct()?;
            Ok(fields
                .into_iter()
                .map(|(key, value)| (key, value.into_native()))
                .collect())
        })
        .collect::<Result<Vec<_>, ValueError>>()
        .map_err(Into::into)
}
