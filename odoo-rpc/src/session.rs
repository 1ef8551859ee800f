//! # Session
//!
//! Lazily-resolved identity for one `(url, database, credentials)` tuple.
//! Created with credentials only; the user id and server version are
//! populated exactly once, by the first operation that needs them, and then
//! cached for the life of the owning client. Nothing invalidates or
//! refreshes them.

use crate::{
    client::ClientError,
    config::ClientConfig,
    transport::{Endpoint, RpcRequest, Transport},
    value::WireValue,
};
use std::fmt;

/// Authentication state for one configured connection.
#[derive(Clone)]
pub struct Session {
    database: String,
    username: String,
    password: String,
    user_id: Option<i64>,
    server_version: Option<String>,
}

impl Session {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            user_id: None,
            server_version: None,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// The resolved user id, if authentication has happened yet.
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// The server version string captured during authentication.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// Resolves the user id, logging in on first use.
    ///
    /// Sends `login` with `(database, username, password)`, then probes
    /// `version` to capture the server version that drives version-gated
    /// behavior. Both results are cached; subsequent calls are no-ops.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Connection`] - the transport failed; wraps the cause
    ///   and names the database.
    /// * [`ClientError::Authentication`] - the server answered with a
    ///   non-positive user id; names the username.
    /// * [`ClientError::Fault`] - the server answered with a protocol fault.
    pub(crate) async fn authenticate<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<i64, ClientError> {
        if let Some(user_id) = self.user_id {
            return Ok(user_id);
        }

        let login = RpcRequest::new("login")
            .param(WireValue::String(self.database.clone()))
            .param(WireValue::String(self.username.clone()))
            .param(WireValue::String(self.password.clone()));

        let response = transport
            .send(Endpoint::Common, login)
            .await
            .map_err(|source| ClientError::Connection {
                database: self.database.clone(),
                source,
            })??;

        let user_id = response.expect_int()?;
        if user_id <= 0 {
            return Err(ClientError::Authentication {
                username: self.username.clone(),
            });
        }
        self.user_id = Some(user_id);

        // Version probe. A missing server_version key means a server old
        // enough to predate it; the empty string routes those to the
        // emulation paths.
        let response = transport
            .send(Endpoint::Common, RpcRequest::new("version"))
            .await
            .map_err(|source| ClientError::Connection {
                database: self.database.clone(),
                source,
            })??;

        let info = response.expect_struct()?;
        let server_version = match info.get("server_version") {
            Some(WireValue::String(version)) => version.clone(),
            _ => String::new(),
        };
        log::debug!("authenticated as uid {user_id}, server version '{server_version}'");
        self.server_version = Some(server_version);

        Ok(user_id)
    }

    /// Whether the server supports the combined `search_read` call.
    ///
    /// Lexical string comparison against "8.0".
    /// TODO: misroutes two-digit majors ("10.0" compares below "8.0");
    /// needs a numeric dotted-version compare once that matters.
    pub(crate) fn supports_search_read(&self) -> bool {
        self.server_version.as_deref().unwrap_or("") >= "8.0"
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // password deliberately absent
        f.debug_struct("Session")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}
