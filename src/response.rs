//! JSON envelopes printed by `softnas-cmd`.
//!
//! Every action answers with the same outer shape:
//!
//! ```text
//! {"success": true, "session_id": 12345,
//!  "result": {"success": true, "msg": "", "records": [...], "total": 4}}
//! ```
//!
//! Only the fields the collectors read are modelled; everything else is
//! ignored during deserialization.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::PluginError;

/// Outer envelope shared by all actions.
#[derive(Debug, Deserialize)]
pub struct Envelope<R> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub session_id: Option<u64>,
    pub result: Option<R>,
}

/// The `result` object of record-returning actions.
#[derive(Debug, Deserialize)]
pub struct RecordSet<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// The part of a failed answer that explains the failure.
#[derive(Debug, Default, Deserialize)]
struct Failure {
    #[serde(default)]
    msg: String,
}

/// Decodes a raw `softnas-cmd` answer.
///
/// Fails with [`PluginError::Response`] on malformed JSON and with
/// [`PluginError::Rejected`] when the outer envelope reports failure. The
/// rejection carries `result.msg` when the appliance gave one.
pub fn decode<R: DeserializeOwned>(action: &str, body: &str) -> Result<Envelope<R>, PluginError> {
    let envelope: Envelope<R> =
        serde_json::from_str(body).map_err(|e| PluginError::Response {
            action: action.to_string(),
            message: e.to_string(),
        })?;

    if envelope.success == Some(false) {
        let message = serde_json::from_str::<Envelope<Failure>>(body)
            .ok()
            .and_then(|failed| failed.result)
            .map(|failure| failure.msg)
            .unwrap_or_default();
        return Err(PluginError::Rejected {
            action: action.to_string(),
            message,
        });
    }

    Ok(envelope)
}

/// Decodes an answer carrying a record list and returns its records.
///
/// A `total` that disagrees with the number of records is logged and
/// otherwise ignored; callers always work with the records received.
pub fn decode_records<T: DeserializeOwned>(
    action: &str,
    body: &str,
) -> Result<Vec<T>, PluginError> {
    let envelope: Envelope<RecordSet<T>> = decode(action, body)?;
    let set = envelope.result.ok_or_else(|| PluginError::Response {
        action: action.to_string(),
        message: "missing result".to_string(),
    })?;

    if set.success == Some(false) {
        return Err(PluginError::Rejected {
            action: action.to_string(),
            message: set.msg,
        });
    }

    if let Some(total) = set.total
        && total != set.records.len()
    {
        warn!(
            "{}: total={} but {} records received",
            action,
            total,
            set.records.len()
        );
    }

    Ok(set.records)
}

/// One record of `overview`.
///
/// Storage records carry `storage_name`/`storage_data`, memory records carry
/// `memory_name`/`memory_data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewRecord {
    #[serde(default)]
    pub storage_name: Option<String>,
    #[serde(default)]
    pub storage_data: Option<f64>,
    #[serde(default)]
    pub memory_name: Option<String>,
    #[serde(default)]
    pub memory_data: Option<f64>,
}

/// One per-minute sample of `perfmon`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerfmonRecord {
    #[serde(default)]
    pub arc_hits: Option<f64>,
    #[serde(default)]
    pub arc_miss: Option<f64>,
    #[serde(default)]
    pub arc_read: Option<f64>,
    #[serde(default)]
    pub arc_hitpercent: Option<f64>,
}

/// A value that `softnas-cmd` prints either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Default for Reading {
    fn default() -> Self {
        Reading::Text(String::new())
    }
}

/// One record of `pooldetails`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolDetailRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "read_IOPS", default)]
    pub read_iops: Reading,
    #[serde(rename = "write_IOPS", default)]
    pub write_iops: Reading,
    #[serde(default)]
    pub read_bandwidth: Reading,
    #[serde(default)]
    pub write_bandwidth: Reading,
}
