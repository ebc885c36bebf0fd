//! JSON view of a tree, for inspection and tooling.
//!
//! A block becomes an array of entries so that order and repeated names survive.
//! Entries carrying a comment get an extra `comment` key.
//!
//! ```json
//! [
//!   { "param": "name", "value": "Ranger" },
//!   { "block": "engine", "entries": [ { "param": "speed", "value": "300" } ] }
//! ]
//! ```

use crate::block::BlockPar;
use crate::node::Node;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

impl Serialize for BlockPar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.all_count()))?;
        for node in self {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Param {
                name,
                value,
                comment,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("param", name)?;
                map.serialize_entry("value", value.as_str())?;
                if let Some(comment) = comment {
                    map.serialize_entry("comment", comment)?;
                }
                map.end()
            }
            Node::Block {
                name,
                child,
                comment,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("block", name)?;
                map.serialize_entry("entries", child)?;
                if let Some(comment) = comment {
                    map.serialize_entry("comment", comment)?;
                }
                map.end()
            }
            Node::Empty => serializer.serialize_unit(),
        }
    }
}

impl BlockPar {
    pub fn to_json_value(&self) -> serde_json::Value {
        // Serializing strings and arrays into a `Value` cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
