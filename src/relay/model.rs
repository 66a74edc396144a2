//! Wire model shared by inbound requests, forwarded calls and replies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A fault as it appears on the wire: a type tag plus opaque arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaultSpec {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub args: Value,
}

impl FaultSpec {
    pub fn new(kind: impl Into<String>, args: Value) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }
}

/// Faults to run before and after forwarding, in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FaultSet {
    #[serde(default)]
    pub before: Vec<FaultSpec>,
    #[serde(default)]
    pub after: Vec<FaultSpec>,
}

/// A routing instruction. The same shape is received and forwarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    /// Address of the node that should handle this route.
    pub designation: String,
    pub faults: FaultSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<ChildRoute>>,
    /// Fields this node does not understand, forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    pub fn new(designation: impl Into<String>) -> Self {
        Self {
            designation: designation.into(),
            faults: FaultSet::default(),
            routes: None,
            extra: Map::new(),
        }
    }

    pub fn with_before(mut self, fault: FaultSpec) -> Self {
        self.faults.before.push(fault);
        self
    }

    pub fn with_after(mut self, fault: FaultSpec) -> Self {
        self.faults.after.push(fault);
        self
    }

    pub fn with_route(mut self, child: Route) -> Self {
        self.routes
            .get_or_insert_with(Vec::new)
            .push(ChildRoute::Valid(child));
        self
    }

    /// Direct children, empty when `routes` is absent.
    pub fn children(&self) -> &[ChildRoute] {
        self.routes.as_deref().unwrap_or(&[])
    }
}

/// One entry of a route's `routes` list.
///
/// Children are decoded leniently: an entry that is not a valid route is kept
/// as raw JSON so that it only fails its own slot when forwarded, not the
/// whole request that carried it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildRoute {
    Valid(Route),
    Invalid { raw: Value, reason: String },
}

impl ChildRoute {
    /// Designation to report in logs; the raw `designation` string when the
    /// entry did not decode.
    pub fn designation(&self) -> &str {
        match self {
            ChildRoute::Valid(route) => &route.designation,
            ChildRoute::Invalid { raw, .. } => raw
                .get("designation")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>"),
        }
    }
}

impl<'de> Deserialize<'de> for ChildRoute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match Route::deserialize(&raw) {
            Ok(route) => ChildRoute::Valid(route),
            Err(e) => ChildRoute::Invalid {
                reason: e.to_string(),
                raw,
            },
        })
    }
}

impl Serialize for ChildRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChildRoute::Valid(route) => route.serialize(serializer),
            ChildRoute::Invalid { raw, .. } => raw.serialize(serializer),
        }
    }
}

/// Aggregated reply of one node. `response` has one slot per child route;
/// a failed child leaves `None` in its slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub service: String,
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: Vec<Option<Response>>,
}

impl Response {
    pub fn new(service: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            address: address.into(),
            errors: Vec::new(),
            response: Vec::new(),
        }
    }
}

// Some peers emit `null` for empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
