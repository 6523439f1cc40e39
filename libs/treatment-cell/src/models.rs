use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bookable treatment. Fields other than `name` and `slots` are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The part of a booking that occupies a slot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    #[serde(default)]
    pub treatment_name: String,
    #[serde(default)]
    pub slot_date: String,
    #[serde(default)]
    pub slot_time: String,
}

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
    /// Comma separated list of fields to keep, e.g. `name`.
    pub fields: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub slot_date: Option<String>,
}
