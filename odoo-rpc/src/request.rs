//! # Request Builder
//!
//! Every business-object call starts with the same parameter preamble:
//! `(database, user id, password)`, then the model name and the action to
//! perform on it. Factored here once and reused by every operation.

use crate::{
    session::Session,
    transport::RpcRequest,
    value::WireValue,
};

/// Assembles the standard `execute` preamble.
///
/// `model`, when given, is appended after the credentials; `action`, when
/// also given, directly after it. The caller appends the operation-specific
/// arguments. `user_id` is passed in explicitly so the builder stays free
/// of authentication concerns.
pub fn base_request(
    session: &Session,
    user_id: i64,
    model: Option<&str>,
    action: Option<&str>,
) -> RpcRequest {
    let mut request = RpcRequest::new("execute")
        .param(WireValue::String(session.database().to_string()))
        .param(WireValue::Int(user_id))
        .param(WireValue::String(session.password().to_string()));

    if let Some(model) = model {
        request = request.param(WireValue::String(model.to_string()));
        if let Some(action) = action {
            request = request.param(WireValue::String(action.to_string()));
        }
    }

    request
}
