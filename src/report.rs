//! Plain-text readiness report for a stored lead.

use crate::models::LeadRecord;
use crate::questionnaire::Questionnaire;
use crate::scoring::{
    assessment_label, pillar_commentary, pillar_scores_from_record, recommend_actions,
    strengths_and_gaps,
};
use std::fmt::Write;

const RULE: &str = "--------------------------------------------------";

/// Renders the advisor-facing follow-up report for one lead.
pub fn render_text_report(questionnaire: &Questionnaire, record: &LeadRecord) -> String {
    let pillars = pillar_scores_from_record(questionnaire, record);
    let (strengths, gaps) = strengths_and_gaps(&pillars);
    let recommendations = recommend_actions(questionnaire, &pillars);
    let contact = &record.contact;

    // Writing into a String cannot fail
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.brand_name);
    let _ = writeln!(out, "{} - {}", questionnaire.title, contact.company);
    let _ = writeln!(out, "Submitted: {}", record.ts.format("%B %d, %Y %H:%M UTC"));
    if let Some(ref tsd) = contact.tsd_request_name {
        let _ = writeln!(out, "Technology Service Distributor: {}", tsd);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Contact: {}", contact.name);
    let _ = writeln!(out, "Email:   {}", contact.email);
    let _ = writeln!(out, "Title:   {}", contact.role);
    let _ = writeln!(out, "Phone:   {}", contact.phone.as_deref().unwrap_or("-"));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "CHANNEL READINESS SCORE: {} / 100", record.score_overall);
    let _ = writeln!(out, "Maturity Level: {}", record.tier);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);

    let _ = writeln!(out, "PILLAR SCORES:");
    for pillar in &pillars {
        let _ = writeln!(
            out,
            "  * {}: {} ({})",
            pillar.name,
            pillar.score.round(),
            assessment_label(pillar.score)
        );
        let _ = writeln!(out, "    {}", pillar_commentary(&pillar.name, pillar.score));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "AREAS OF STRENGTH:");
    for strength in &strengths {
        let _ = writeln!(out, "  * {}", strength);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "DEVELOPMENT PRIORITIES:");
    for gap in &gaps {
        let _ = writeln!(out, "  * {}", gap);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "STRATEGIC RECOMMENDATIONS (NEXT 90 DAYS):");
    for (i, rec) in recommendations.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, rec);
    }

    out
}
