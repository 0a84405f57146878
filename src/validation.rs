//! Client form validation and query-string prefill.

use crate::errors::AppError;
use crate::models::{AnswerValue, Answers, Contact, FormValues, ValidSubmission};
use crate::questionnaire::Questionnaire;
use crate::scoring::resolve_answers;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    // RFC 5322 simplified: local@domain.tld
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
        )
        .expect("email regex is valid")
    })
}

/// Basic work-email check: non-empty, has an `@` and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.contains('@') && email_regex().is_match(email)
}

fn field(form: &HashMap<String, String>, key: &str) -> String {
    form.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn is_checked(value: Option<&String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "on" | "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Reads question answers out of raw string values.
///
/// `key_for` maps a question id to the field name to look up. Blank values
/// count as unanswered. Values are kept as entered; whether they resolve is
/// decided by `scoring::resolve_answers`.
pub fn parse_answers<F>(questionnaire: &Questionnaire, values: &HashMap<String, String>, key_for: F) -> Answers
where
    F: Fn(&str) -> String,
{
    questionnaire
        .questions()
        .filter_map(|question| {
            let raw = values.get(&key_for(&question.id))?.trim();
            if raw.is_empty() {
                None
            } else {
                Some((question.id.clone(), AnswerValue::Text(raw.to_string())))
            }
        })
        .collect()
}

/// Converts JSON answer values into `Answers`.
///
/// Non-negative integers become numbers and everything else is kept as text,
/// so `2.5` or `"Maybe"` fail later with the same message a form would get.
pub fn answers_from_json(raw: &BTreeMap<String, serde_json::Value>) -> Answers {
    raw.iter()
        .map(|(id, value)| {
            let answer = match value {
                serde_json::Value::String(text) => AnswerValue::Text(text.clone()),
                other => match other.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    Some(n) => AnswerValue::Number(n),
                    None => AnswerValue::Text(other.to_string()),
                },
            };
            (id.clone(), answer)
        })
        .collect()
}

/// Keeps the answers that resolve, in canonical form.
fn resolvable(questionnaire: &Questionnaire, answers: Answers) -> Answers {
    questionnaire
        .questions()
        .filter_map(|question| {
            let answer = answers.get(&question.id)?;
            question
                .resolve(questionnaire.scale, answer)
                .ok()
                .map(|(canonical, _)| (question.id.clone(), canonical))
        })
        .collect()
}

/// Form values echoed back into the page. Contact fields are kept as
/// entered; answers that do not resolve are dropped.
pub fn form_values(questionnaire: &Questionnaire, form: &HashMap<String, String>) -> FormValues {
    let answers = parse_answers(questionnaire, form, |id| id.to_string());
    FormValues {
        company: field(form, "company"),
        name: field(form, "name"),
        email: field(form, "email"),
        role: field(form, "role"),
        phone: field(form, "phone"),
        tsd: field(form, "tsd"),
        consent: is_checked(form.get("consent")),
        answers: resolvable(questionnaire, answers),
    }
}

/// Prefill for the client form from query parameters.
///
/// Contact fields use `company`, `name`, `email`, `role`, `phone`, `tsd`;
/// answers use the lowercase question id (`a1=4`, `q1=yes`). Invalid answers
/// are dropped.
pub fn prefill_from_query(questionnaire: &Questionnaire, params: &HashMap<String, String>) -> FormValues {
    let answers = parse_answers(questionnaire, params, |id| id.to_lowercase());
    FormValues {
        company: field(params, "company"),
        name: field(params, "name"),
        email: field(params, "email"),
        role: field(params, "role"),
        phone: field(params, "phone"),
        tsd: field(params, "tsd"),
        consent: false,
        answers: resolvable(questionnaire, answers),
    }
}

/// Validates a submitted client form.
///
/// Every problem is reported at once, one message per question. Answers are
/// checked by the same rules scoring applies and stored in canonical form.
pub fn validate_submission(
    questionnaire: &Questionnaire,
    form: &HashMap<String, String>,
) -> Result<ValidSubmission, AppError> {
    let mut problems = Vec::new();

    if !is_checked(form.get("consent")) {
        problems.push("Please provide consent to proceed.".to_string());
    }

    let email = field(form, "email");
    if !is_valid_email(&email) {
        problems.push("Please enter a valid work email.".to_string());
    }

    let company = field(form, "company");
    let name = field(form, "name");
    let role = field(form, "role");
    if name.is_empty() || role.is_empty() || company.is_empty() {
        problems.push("Please fill in all required fields (Name, Email, Role, Company).".to_string());
    }

    let answers = parse_answers(questionnaire, form, |id| id.to_string());
    let resolved = match resolve_answers(questionnaire, &answers) {
        Ok(resolved) => Some(resolved),
        Err(err) => {
            if let Some(messages) = err.validation_messages() {
                problems.extend(messages.iter().cloned());
            }
            None
        }
    };

    let resolved = match resolved {
        Some(resolved) if problems.is_empty() => resolved,
        _ => return Err(AppError::Validation(problems)),
    };

    Ok(ValidSubmission {
        contact: Contact {
            company,
            name,
            email,
            role,
            phone: non_empty(field(form, "phone")),
            tsd_request_name: non_empty(field(form, "tsd")),
        },
        answers: resolved.canonical,
    })
}
