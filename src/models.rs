use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single answer: a number on the questionnaire scale or the label of a
/// choice (`"Yes"`). Serialized untagged, so stored answers read
/// `{"q1":"Yes","q2":8}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(u32),
    Text(String),
}

impl From<u32> for AnswerValue {
    fn from(value: u32) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Question id -> answer.
pub type Answers = BTreeMap<String, AnswerValue>;

// ============ Submission Models ============

/// Contact block of the client form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub company: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    /// Technology Service Distributor the request came through.
    pub tsd_request_name: Option<String>,
}

/// A submission that passed validation and is ready to be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub contact: Contact,
    pub answers: Answers,
}

/// Values shown in the client form, either prefilled from the query string
/// or echoed back after a rejected submission. Only answers that resolve
/// against the questionnaire are kept, in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub company: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub tsd: String,
    pub consent: bool,
    pub answers: Answers,
}

// ============ Storage Models ============

/// One persisted submission. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub ts: DateTime<Utc>,
    pub brand_name: String,
    pub contact: Contact,
    /// Rounded overall readiness score, 0..=100.
    pub score_overall: u8,
    pub tier: String,
    /// Pillar name -> rounded pillar score.
    pub pillar_scores: BTreeMap<String, u8>,
    pub answers: Answers,
}

// ============ API Models ============

/// Body of `POST /api/v1/score`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub answers: BTreeMap<String, serde_json::Value>,
}

impl LeadRecord {
    /// Builds the record for a scored submission.
    pub fn from_submission(
        submission: ValidSubmission,
        card: &crate::scoring::ScoreCard,
        tier: &str,
        brand_name: &str,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            ts,
            brand_name: brand_name.to_string(),
            contact: submission.contact,
            score_overall: card.rounded(),
            tier: tier.to_string(),
            pillar_scores: card
                .pillars
                .iter()
                .map(|p| (p.name.clone(), crate::scoring::round_score(p.score)))
                .collect(),
            answers: submission.answers,
        }
    }
}
