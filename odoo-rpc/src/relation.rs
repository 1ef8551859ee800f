//! # Relation Commands
//!
//! Mutations to one2many and many2many fields do not travel as direct
//! values: they are encoded as `(opcode, id, payload)` triples placed inside
//! the field value handed to `create` or `write`. The builders here are pure
//! functions; each returns the one-element command list the server expects
//! for that mutation.
//!
//! ```
//! use serde_json::json;
//! use odoo_rpc::relation;
//!
//! let fields = json!({
//!     "name": "Acme",
//!     "category_id": relation::add_link(3),
//! });
//! assert_eq!(fields["category_id"], json!([[4, 3, 0]]));
//! ```

use crate::value::{IntoWire, ValueError, WireValue};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Map, Value};

/// The fixed opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Create = 0,
    Update = 1,
    Delete = 2,
    RemoveLink = 3,
    AddLink = 4,
    RemoveAllLinks = 5,
    ReplaceAllLinks = 6,
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    /// Encodes as the integer 0.
    None,
    Values(Map<String, Value>),
    Ids(Vec<i64>),
}

/// One relation mutation: the wire triple `[opcode, id, payload]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationCommand {
    opcode: Opcode,
    id: i64,
    payload: Payload,
}

impl RelationCommand {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The target record id; 0 for commands that address no existing record.
    pub fn target_id(&self) -> i64 {
        self.id
    }

    /// Encodes the command as its wire triple.
    pub fn to_wire(&self) -> Result<WireValue, ValueError> {
        let payload = match &self.payload {
            Payload::None => WireValue::Int(0),
            Payload::Values(values) => Value::Object(values.clone()).into_wire()?,
            Payload::Ids(ids) => {
                WireValue::Array(ids.iter().map(|id| WireValue::Int(*id)).collect())
            }
        };
        Ok(WireValue::Array(vec![
            WireValue::Int(self.opcode as i64),
            WireValue::Int(self.id),
            payload,
        ]))
    }
}

impl Serialize for RelationCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&(self.opcode as i64))?;
        seq.serialize_element(&self.id)?;
        match &self.payload {
            Payload::None => seq.serialize_element(&0)?,
            Payload::Values(values) => seq.serialize_element(values)?,
            Payload::Ids(ids) => seq.serialize_element(ids)?,
        }
        seq.end()
    }
}

/// `(0, 0, values)` — create a related record with these field values.
pub fn create(values: Map<String, Value>) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::Create,
        id: 0,
        payload: Payload::Values(values),
    }]
}

/// `(1, id, values)` — update the related record `id`.
pub fn update(id: i64, values: Map<String, Value>) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::Update,
        id,
        payload: Payload::Values(values),
    }]
}

/// `(2, id, 0)` — delete the related record `id` outright.
pub fn delete(id: i64) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::Delete,
        id,
        payload: Payload::None,
    }]
}

/// `(3, id, 0)` — drop the link to record `id`, keeping the record.
pub fn remove_link(id: i64) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::RemoveLink,
        id,
        payload: Payload::None,
    }]
}

/// `(4, id, 0)` — link the existing record `id`.
pub fn add_link(id: i64) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::AddLink,
        id,
        payload: Payload::None,
    }]
}

/// `(5, 0, 0)` — drop every link, keeping the records.
pub fn remove_all_links() -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::RemoveAllLinks,
        id: 0,
        payload: Payload::None,
    }]
}

/// `(6, 0, ids)` — replace every link with links to `ids`.
pub fn replace_all_links(ids: Vec<i64>) -> Vec<RelationCommand> {
    vec![RelationCommand {
        opcode: Opcode::ReplaceAllLinks,
        id: 0,
        payload: Payload::Ids(ids),
    }]
}
