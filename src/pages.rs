//! Server-rendered HTML for the single page route.

use crate::models::{AnswerValue, FormValues, LeadRecord};
use crate::questionnaire::{AnswerScale, Question, Questionnaire};
use axum::http::StatusCode;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// Rows shown in the admin listing.
pub const ADMIN_LISTING_LIMIT: usize = 25;

fn layout(brand_name: &str, body: &str) -> String {
    let brand = text(brand_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{brand}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }}
        .notice {{ padding: .75rem 1rem; border-radius: 6px; margin: 1rem 0; }}
        .error {{ background: #fde8e8; }}
        .success {{ background: #e3f9e5; }}
        .warning {{ background: #fff7e0; }}
        label {{ display: block; margin: .5rem 0 .25rem; font-weight: 600; }}
        input[type=text], input[type=email] {{ width: 100%; padding: .4rem; }}
        input[type=range], select {{ width: 100%; }}
        table {{ border-collapse: collapse; width: 100%; font-size: .9rem; }}
        th, td {{ border-bottom: 1px solid #d9e2ec; padding: .35rem; text-align: left; }}
        footer {{ margin-top: 2rem; font-size: .8rem; color: #627d98; }}
    </style>
</head>
<body>
    <h1>{brand}</h1>
{body}
    <footer>Powered by XplainIQ - Engineering Predictable Go-To-Market Outcomes.</footer>
</body>
</html>
"#
    )
}

fn text_input(out: &mut String, name: &str, label: &str, value: &str, kind: &str) {
    let _ = writeln!(
        out,
        r#"    <label for="{name}">{label}</label>
    <input type="{kind}" id="{name}" name="{name}" value="{value}">"#,
        name = name,
        label = text(label),
        kind = kind,
        value = attr(value),
    );
}

fn choice_input(out: &mut String, question: &Question, selected: Option<&AnswerValue>) {
    let id = attr(&question.id);
    let _ = writeln!(
        out,
        r#"    <label for="{id}"><strong>{label}:</strong> {question}</label>
    <select id="{id}" name="{id}">
        <option value="">Select...</option>"#,
        id = id,
        label = text(&question.id),
        question = text(&question.text),
    );
    for choice in &question.choices {
        let is_selected = matches!(selected, Some(AnswerValue::Text(label)) if *label == choice.label);
        let _ = writeln!(
            out,
            r#"        <option value="{value}"{selected}>{label}</option>"#,
            value = attr(&choice.label),
            selected = if is_selected { " selected" } else { "" },
            label = text(&choice.label),
        );
    }
    let _ = writeln!(out, "    </select>");
}

fn range_input(out: &mut String, question: &Question, scale: AnswerScale, selected: Option<&AnswerValue>) {
    let value = match selected {
        Some(AnswerValue::Number(n)) => *n,
        _ => u32::from(scale.default),
    };
    let _ = writeln!(
        out,
        r#"    <label for="{id}"><strong>{label}:</strong> {question}</label>
    <input type="range" id="{id}" name="{id}" min="{min}" max="{max}" step="1" value="{value}">"#,
        id = attr(&question.id),
        label = text(&question.id),
        question = text(&question.text),
        min = scale.min,
        max = scale.max,
        value = value,
    );
}

/// The client questionnaire form.
///
/// `errors` are shown above the form; `warning` is used for the resubmission
/// cooldown notice.
pub fn client_form(
    brand_name: &str,
    questionnaire: &Questionnaire,
    values: &FormValues,
    errors: &[String],
    warning: Option<&str>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "    <p>Please answer the questions below. Our advisors will review your submission and send your personalized report via email within 2-3 business days.</p>"
    );

    if let Some(warning) = warning {
        let _ = writeln!(
            body,
            r#"    <div class="notice warning">{}</div>"#,
            text(warning)
        );
    }
    if !errors.is_empty() {
        let _ = writeln!(body, r#"    <div class="notice error"><ul>"#);
        for error in errors {
            let _ = writeln!(body, "        <li>{}</li>", text(error));
        }
        let _ = writeln!(body, "    </ul></div>");
    }

    let _ = writeln!(body, r#"    <form id="readiness-form" method="post" action="/">"#);
    let _ = writeln!(body, "    <h3>Contact Information</h3>");
    text_input(&mut body, "name", "Your Name*", &values.name, "text");
    text_input(&mut body, "email", "Work Email*", &values.email, "email");
    text_input(&mut body, "role", "Title / Role*", &values.role, "text");
    text_input(&mut body, "phone", "Phone (optional)", &values.phone, "text");
    text_input(&mut body, "tsd", "TSD request name", &values.tsd, "text");
    text_input(&mut body, "company", "Company Name*", &values.company, "text");

    let _ = writeln!(body, "    <h3>Assessment Questions</h3>");
    let scale = questionnaire.scale;
    let _ = writeln!(
        body,
        "    <p><small>Rate each statement from {} (Strongly Disagree) to {} (Strongly Agree)</small></p>",
        scale.min, scale.max
    );
    for pillar in &questionnaire.pillars {
        let _ = writeln!(body, "    <h4>{}</h4>", text(&pillar.name));
        for question in &pillar.questions {
            let selected = values.answers.get(&question.id);
            if question.is_categorical() {
                choice_input(&mut body, question, selected);
            } else {
                range_input(&mut body, question, scale, selected);
            }
        }
    }

    let checked = if values.consent { " checked" } else { "" };
    let _ = writeln!(
        body,
        r#"    <label><input type="checkbox" name="consent" value="on"{}> I consent to my responses being reviewed and to being contacted about my results.</label>
    <p><small>* Required fields</small></p>
    <button type="submit">Submit Assessment</button>
    </form>"#,
        checked
    );

    layout(brand_name, &body)
}

/// Shown after a submission was stored.
pub fn confirmation(brand_name: &str) -> String {
    let body = r#"    <div class="notice success"><strong>Thank you for your submission!</strong></div>
    <p>Our advisors will review your responses and send your personalized Channel Readiness Report via email within 2-3 business days.</p>"#;
    layout(brand_name, body)
}

/// Admin listing. `leads` holds `(position, record)` pairs in file order.
pub fn admin_page(brand_name: &str, leads: &[(usize, LeadRecord)]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "    <p><em>Admin mode active</em></p>");
    let _ = writeln!(body, "    <h2>Latest Submissions</h2>");

    if leads.is_empty() {
        let _ = writeln!(
            body,
            r#"    <div class="notice">No submissions yet. Ask a client to submit their assessment.</div>"#
        );
        return layout(brand_name, &body);
    }

    let _ = writeln!(
        body,
        r#"    <p>{} total. <a href="/leads.csv?admin=1">Export All Leads (CSV)</a></p>"#,
        leads.len()
    );
    let _ = writeln!(
        body,
        "    <table>\n        <tr><th>#</th><th>Submitted</th><th>Company</th><th>Name</th><th>Email</th><th>Score</th><th>Tier</th><th>Report</th></tr>"
    );
    for (position, record) in leads.iter().rev().take(ADMIN_LISTING_LIMIT) {
        let _ = writeln!(
            body,
            r#"        <tr><td>{pos}</td><td>{ts}</td><td>{company}</td><td>{name}</td><td>{email}</td><td>{score}</td><td>{tier}</td><td><a href="/leads/{pos}/report?admin=1">View</a></td></tr>"#,
            pos = position,
            ts = record.ts.format("%Y-%m-%d %H:%M"),
            company = text(&record.contact.company),
            name = text(&record.contact.name),
            email = text(&record.contact.email),
            score = record.score_overall,
            tier = text(&record.tier),
        );
    }
    let _ = writeln!(body, "    </table>");

    layout(brand_name, &body)
}

/// Failure page: `title` names what went wrong, `message` explains it.
pub fn error_page(brand_name: &str, title: &str, status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"    <div class="notice error"><strong>{} ({}):</strong> {}</div>
    <p><a href="/">Back to the assessment</a></p>"#,
        text(title),
        status.as_u16(),
        text(message)
    );
    layout(brand_name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::Contact;
    use crate::questionnaire::Choice;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn test_markup_in_values_is_escaped() {
        let q = Questionnaire::default();
        let values = FormValues {
            email: r#"x"><script>alert(1)</script>"#.into(),
            ..Default::default()
        };
        let errors = vec!["<b>Tom & Jerry</b>".to_string()];

        let html = client_form("Brand <One>", &q, &values, &errors, None);
        assert!(html.contains(r#"value="x&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;""#));
        assert!(html.contains("<li>&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</li>"));
        assert!(html.contains("<h1>Brand &lt;One&gt;</h1>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_admin_page_escapes_stored_fields() {
        let record = LeadRecord {
            ts: Utc::now(),
            brand_name: "Brand".into(),
            contact: Contact {
                company: "<img src=x onerror=alert(1)>".into(),
                name: "A & B".into(),
                email: "ab@example.com".into(),
                role: "Owner".into(),
                phone: None,
                tsd_request_name: None,
            },
            score_overall: 50,
            tier: "Developing".into(),
            pillar_scores: BTreeMap::new(),
            answers: BTreeMap::new(),
        };

        let html = admin_page("Brand", &[(1, record)]);
        assert!(html.contains("<td>&lt;img src=x onerror=alert(1)&gt;</td>"));
        assert!(html.contains("<td>A &amp; B</td>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_error_page_uses_given_title() {
        let html = error_page("Brand", "Please wait", StatusCode::TOO_MANY_REQUESTS, "Try <later>");
        assert!(html.contains("<strong>Please wait (429):</strong> Try &lt;later&gt;"));
        assert!(!html.contains("Submission error"));
    }

    #[test]
    fn test_choice_questions_render_as_select() {
        let mut q = Questionnaire::default();
        q.pillars[0].questions[0].choices = vec![
            Choice { label: "Yes".into(), value: 5 },
            Choice { label: "No".into(), value: 1 },
        ];
        let mut values = FormValues::default();
        values.answers.insert("A1".into(), AnswerValue::from("No"));

        let html = client_form("Brand", &q, &values, &[], None);
        assert!(html.contains(r#"<select id="A1" name="A1">"#));
        assert!(html.contains(r#"<option value="Yes">Yes</option>"#));
        assert!(html.contains(r#"<option value="No" selected>No</option>"#));
        assert!(!html.contains(r#"type="range" id="A1""#));
        assert!(html.contains(r#"type="range" id="A2""#));
    }

    #[test]
    fn test_form_uses_scale_default_and_prefill() {
        let q = Questionnaire::default();
        let mut values = FormValues {
            company: "<Acme>".into(),
            ..Default::default()
        };
        values.answers.insert("A1".into(), AnswerValue::Number(5));

        let html = client_form("Brand", &q, &values, &[], None);
        assert!(html.contains(r#"name="A1" min="1" max="5" step="1" value="5""#));
        assert!(html.contains(r#"name="A2" min="1" max="5" step="1" value="3""#));
        assert!(html.contains("&lt;Acme&gt;"));
        assert!(!html.contains("<Acme>"));
    }

    #[test]
    fn test_admin_page_empty_notice() {
        let html = admin_page("Brand", &[]);
        assert!(html.contains("No submissions yet"));
        assert!(!html.contains("<form"));
    }
}
