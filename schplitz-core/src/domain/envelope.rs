//! Exchange envelope - the versioned unit two people pass between devices
//!
//! Three incompatible shapes exist on the wire, told apart by the numeric
//! `v` field:
//!
//! | v | outer fields                               | inner plaintext                 |
//! |---|--------------------------------------------|---------------------------------|
//! | 1 | `encrypted`                                | `{"expenses": [Expense]}`       |
//! | 2 | `question`, `encrypted`                    | `[CompactExpense]`              |
//! | 3 | `question`, `names`, `status`, `encrypted` | `{"e": [CompactExpense], "s"}`  |
//!
//! There is no default version: an envelope without a recognized `v` is
//! rejected before anything else is looked at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::expense::CompactExpense;
use super::result::{Error, Result};

/// Version written by this implementation
pub const CURRENT_VERSION: u64 = 3;

/// Sender's self-reported progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    #[default]
    JustStarted,
    AlmostDone,
    Done,
}

impl ShareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareStatus::JustStarted => "just_started",
            ShareStatus::AlmostDone => "almost_done",
            ShareStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShareStatus::JustStarted => "Just started",
            ShareStatus::AlmostDone => "Almost done",
            ShareStatus::Done => "Done",
        }
    }
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "just_started" => Ok(ShareStatus::JustStarted),
            "almost_done" => Ok(ShareStatus::AlmostDone),
            "done" => Ok(ShareStatus::Done),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// v1: encrypted blob only, question implied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeV1 {
    pub encrypted: String,
}

/// v2: question plus encrypted blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeV2 {
    pub question: String,
    pub encrypted: String,
}

/// v3: question, both participant names and sender status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeV3 {
    pub question: String,
    pub names: [String; 2],
    pub status: ShareStatus,
    pub encrypted: String,
}

/// Inner plaintext of a v3 envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadV3 {
    pub e: Vec<CompactExpense>,
    pub s: ShareStatus,
}

/// An outer envelope, one variant per schema version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    V1(EnvelopeV1),
    V2(EnvelopeV2),
    V3(EnvelopeV3),
}

impl Envelope {
    pub fn version(&self) -> u64 {
        match self {
            Envelope::V1(_) => 1,
            Envelope::V2(_) => 2,
            Envelope::V3(_) => 3,
        }
    }

    pub fn encrypted(&self) -> &str {
        match self {
            Envelope::V1(e) => &e.encrypted,
            Envelope::V2(e) => &e.encrypted,
            Envelope::V3(e) => &e.encrypted,
        }
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            Envelope::V1(_) => None,
            Envelope::V2(e) => Some(&e.question),
            Envelope::V3(e) => Some(&e.question),
        }
    }

    /// Read the version tag and hand the object to that version's decoder
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::malformed("Envelope must be a JSON object"))?;

        let version = match obj.get("v") {
            Some(JsonValue::Number(n)) => n
                .as_u64()
                .ok_or_else(|| Error::UnsupportedVersion(n.to_string()))?,
            Some(other) => return Err(Error::UnsupportedVersion(other.to_string())),
            None => return Err(Error::UnsupportedVersion("missing".to_string())),
        };

        match version {
            1 => decode_v1(obj).map(Envelope::V1),
            2 => decode_v2(obj).map(Envelope::V2),
            3 => decode_v3(obj).map(Envelope::V3),
            other => Err(Error::UnsupportedVersion(other.to_string())),
        }
    }

    /// Parse envelope JSON text
    pub fn from_str_json(text: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| Error::malformed(format!("Envelope is not valid JSON: {}", e)))?;
        Self::from_json(&value)
    }

    pub fn to_json(&self) -> JsonValue {
        let (mut value, version) = match self {
            Envelope::V1(e) => (serde_json::json!({ "encrypted": e.encrypted }), 1),
            Envelope::V2(e) => (
                serde_json::json!({ "question": e.question, "encrypted": e.encrypted }),
                2,
            ),
            Envelope::V3(e) => (
                serde_json::json!({
                    "question": e.question,
                    "names": e.names,
                    "status": e.status,
                    "encrypted": e.encrypted,
                }),
                3,
            ),
        };
        value["v"] = JsonValue::from(version);
        value
    }
}

type JsonObject = serde_json::Map<String, JsonValue>;

fn required_encrypted(obj: &JsonObject) -> Result<String> {
    obj.get("encrypted")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed("Missing encrypted data"))
}

fn required_question(obj: &JsonObject) -> Result<String> {
    obj.get("question")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed("Missing security question"))
}

fn decode_v1(obj: &JsonObject) -> Result<EnvelopeV1> {
    Ok(EnvelopeV1 {
        encrypted: required_encrypted(obj)?,
    })
}

fn decode_v2(obj: &JsonObject) -> Result<EnvelopeV2> {
    let encrypted = required_encrypted(obj)?;
    let question = required_question(obj)?;
    Ok(EnvelopeV2 { question, encrypted })
}

fn decode_v3(obj: &JsonObject) -> Result<EnvelopeV3> {
    let encrypted = required_encrypted(obj)?;
    let question = required_question(obj)?;

    let names = obj
        .get("names")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::malformed("Missing participant names"))?;
    let names: Vec<String> = names
        .iter()
        .filter_map(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let names: [String; 2] = names
        .try_into()
        .map_err(|_| Error::malformed("Expected exactly two participant names"))?;

    let status = obj
        .get("status")
        .cloned()
        .map(serde_json::from_value::<ShareStatus>)
        .transpose()
        .map_err(|_| Error::malformed("Invalid status"))?
        .ok_or_else(|| Error::malformed("Missing status"))?;

    Ok(EnvelopeV3 {
        question,
        names,
        status,
        encrypted,
    })
}
