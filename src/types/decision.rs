use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::record::{Attribute, AttributeValue, Direction, InputLagClass, SpecRecord};
use crate::scene::PenaltyOp;
use crate::types::identifiers::{CatalogVersion, RecordId};

/// A selection request as received from a caller.
///
/// Deserialization only fails when the document is not an object. A field
/// of the wrong type is left unset and recorded in `malformed`, so the
/// request can still be answered with INVALID_INPUT.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PickRequest {
    pub request_id: Option<String>,
    pub size_inch: Option<i64>,
    pub scene: Option<String>,
    /// Brand allow-list; a single string is accepted too.
    pub brand: Vec<String>,
    pub budget: Option<f64>,
    pub ids: Option<Vec<String>>,
    /// Fields that were present but could not be read.
    #[serde(skip)]
    pub malformed: Vec<InputIssue>,
}

impl PickRequest {
    pub fn new(size_inch: i64, scene: impl Into<String>) -> Self {
        Self {
            size_inch: Some(size_inch),
            scene: Some(scene.into()),
            ..Self::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand.push(brand.into());
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The recorded problem with `field`, if it could not be read.
    pub fn malformed_field(&self, field: &str) -> Option<&InputIssue> {
        self.malformed.iter().find(|issue| issue.field == field)
    }

    /// Drop a recorded problem once `field` has been set by other means.
    pub fn clear_malformed(&mut self, field: &str) {
        self.malformed.retain(|issue| issue.field != field);
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let mut malformed = Vec::new();
        let mut read = |name: &str| fields.remove(name).filter(|v| !v.is_null());

        let request_id = field(read("request_id"), "request_id", text, &mut malformed);
        let size_inch = field(read("size_inch"), "size_inch", whole_inches, &mut malformed);
        let scene = field(read("scene"), "scene", text, &mut malformed);
        let brand = field(read("brand"), "brand", text_list, &mut malformed);
        let budget = field(read("budget"), "budget", number, &mut malformed);
        let ids = field(read("ids"), "ids", text_list, &mut malformed);

        Self {
            request_id,
            size_inch,
            scene,
            brand: brand.unwrap_or_default(),
            budget,
            ids,
            malformed,
        }
    }
}

impl<'de> Deserialize<'de> for PickRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_fields(fields))
    }
}

fn field<T>(
    value: Option<Value>,
    name: &str,
    parse: fn(Value) -> Result<T, String>,
    malformed: &mut Vec<InputIssue>,
) -> Option<T> {
    match parse(value?) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            malformed.push(InputIssue {
                field: name.to_string(),
                message,
            });
            None
        }
    }
}

fn text(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(format!("must be a string, got {other}")),
    }
}

fn text_list(value: Value) -> Result<Vec<String>, String> {
    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(format!("must contain only strings, got {other}")),
            })
            .collect(),
        other => Err(format!("must be a string or a list of strings, got {other}")),
    }
}

/// Integral JSON numbers only; `75.0` is accepted, `75.5` and `"75"` are not.
fn whole_inches(value: Value) -> Result<i64, String> {
    let whole = match &value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    };
    whole.ok_or_else(|| format!("must be a whole number of inches, got {value}"))
}

fn number(value: Value) -> Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("must be a number, got {value}"))
}

/// The constraints actually applied, echoed back in every outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub size_inch: Option<i64>,
    pub size_tolerance_inch: u32,
    pub budget: Option<f64>,
    pub brands: Vec<String>,
    pub ids: Option<Vec<RecordId>>,
}

/// One problem with a request. Any issue makes the outcome INVALID_INPUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputIssue {
    pub field: String,
    pub message: String,
}

/// Internal: one attribute's share of a candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub attribute: Attribute,
    pub raw: Option<AttributeValue>,
    /// In [0, 100].
    pub normalized: f64,
    pub weight: f64,
    /// `normalized * weight / 100`.
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPenalty {
    pub attribute: Attribute,
    pub op: PenaltyOp,
    pub value: Option<f64>,
    pub multiplier: f64,
}

/// Internal: a record scored under one scene, not yet ranked.
/// Holds a reference to the catalog record instead of cloning it.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub record: &'a SpecRecord,
    pub scene: String,

    /// Sum of contributions before penalties.
    pub base_score: f64,
    pub score: f64,
    pub breakdown: Vec<BreakdownEntry>,
    pub penalties: Vec<AppliedPenalty>,
}

/// One justification tuple for downstream rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub attribute: Attribute,
    pub raw: Option<AttributeValue>,
    pub normalized: f64,
    pub contribution: f64,
    pub direction: Direction,
    /// The record does not document this attribute; the neutral floor was used.
    pub missing: bool,
}

/// Something a shopper should double-check about a pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Risk {
    /// A weighted attribute the record does not document.
    Undocumented { attribute: Attribute, weight: f64 },
    /// A weighted feature flag the record documents as absent.
    Unsupported { attribute: Attribute },
    /// A scene penalty rule matched.
    Penalized {
        attribute: Attribute,
        op: PenaltyOp,
        value: Option<f64>,
        multiplier: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
    C,
}

impl Slot {
    pub const ORDER: [Slot; 3] = [Slot::A, Slot::B, Slot::C];
}

/// A ranked candidate placed in a decision slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPick {
    pub slot: Slot,
    pub id: RecordId,
    pub brand: String,
    pub model: String,
    pub size_inch: u32,
    pub release_year: u16,
    pub price: Option<f64>,
    pub input_lag_class: Option<InputLagClass>,
    pub score: f64,
    pub explanation: Vec<Explanation>,
    pub risks: Vec<Risk>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Ok,
    NoMatch,
    Degraded,
    InvalidInput,
}

/// The final result of one selection request. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub request_id: String,
    pub status: DecisionStatus,
    pub scene: Option<String>,
    pub constraints: Constraints,
    pub slots: Vec<SlotPick>,

    pub candidates_considered: usize,
    pub candidates_matched: usize,
    pub warning_count: usize,
    pub catalog_version: Option<CatalogVersion>,

    pub issues: Vec<InputIssue>,
    pub unknown_ids: Vec<RecordId>,
    pub message: Option<String>,
}

/// A full ranked candidate, as returned by the ranking report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: RecordId,
    pub brand: String,
    pub model: String,
    pub size_inch: u32,
    pub release_year: u16,
    pub price: Option<f64>,
    pub base_score: f64,
    pub score: f64,
    pub breakdown: Vec<BreakdownEntry>,
    pub penalties: Vec<AppliedPenalty>,
}

/// Outcome of a ranking request: every survivor in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub request_id: String,
    pub status: DecisionStatus,
    pub scene: Option<String>,
    pub constraints: Constraints,
    pub candidates: Vec<RankedEntry>,
    pub candidates_matched: usize,
    pub warning_count: usize,
    pub catalog_version: Option<CatalogVersion>,
    pub issues: Vec<InputIssue>,
}

/// Outcome of a constraint-only search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub request_id: String,
    pub status: DecisionStatus,
    pub constraints: Constraints,
    pub count: usize,
    pub records: Vec<SpecRecord>,
    pub issues: Vec<InputIssue>,
}
