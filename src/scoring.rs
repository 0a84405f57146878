//! Readiness scoring.
//!
//! Each pillar scores the mean of its answers as a percentage of the scale
//! maximum; the overall score is the mean of the pillar scores. Both are
//! always within 0..=100 and depend only on the answers and questionnaire.

use crate::errors::AppError;
use crate::models::{Answers, LeadRecord};
use crate::questionnaire::{Pillar, Questionnaire};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarScore {
    pub name: String,
    pub score: f64,
    pub answers: Answers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub pillars: Vec<PillarScore>,
    pub overall: f64,
}

impl ScoreCard {
    /// Overall score rounded half away from zero.
    pub fn rounded(&self) -> u8 {
        round_score(self.overall)
    }
}

/// Everything the JSON API and admin report show for one score card.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub score: u8,
    pub overall: f64,
    pub tier: String,
    pub pillars: Vec<PillarScore>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Answers checked against the questionnaire: canonical form plus scale value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnswers {
    /// What gets stored and echoed back (`"Yes"`, `8`).
    pub canonical: Answers,
    pub values: BTreeMap<String, u8>,
}

/// Checks every answer against its question.
///
/// Reports one message per question: missing when a required question has no
/// answer, otherwise the reason its answer does not resolve. Answers to
/// unknown question ids are ignored.
pub fn resolve_answers(questionnaire: &Questionnaire, answers: &Answers) -> Result<ResolvedAnswers, AppError> {
    let mut resolved = ResolvedAnswers {
        canonical: Answers::new(),
        values: BTreeMap::new(),
    };
    let mut problems = Vec::new();

    for question in questionnaire.questions() {
        match answers.get(&question.id) {
            None if question.required => {
                problems.push(format!("Missing answer for {}", question.id));
            }
            None => {}
            Some(answer) => match question.resolve(questionnaire.scale, answer) {
                Ok((canonical, value)) => {
                    resolved.canonical.insert(question.id.clone(), canonical);
                    resolved.values.insert(question.id.clone(), value);
                }
                Err(message) => problems.push(message),
            },
        }
    }

    if problems.is_empty() {
        Ok(resolved)
    } else {
        Err(AppError::Validation(problems))
    }
}

/// Computes the score card for a set of answers.
///
/// Fails with `AppError::Validation` when a required question is unanswered or
/// any answer does not resolve (see `resolve_answers`).
pub fn compute_score(questionnaire: &Questionnaire, answers: &Answers) -> Result<ScoreCard, AppError> {
    let resolved = resolve_answers(questionnaire, answers)?;
    let scale_max = f64::from(questionnaire.scale.max);

    let pillars: Vec<PillarScore> = questionnaire
        .pillars
        .iter()
        .map(|pillar| {
            let values: Vec<f64> = pillar
                .questions
                .iter()
                .filter_map(|q| resolved.values.get(&q.id).map(|v| f64::from(*v)))
                .collect();

            // A pillar with nothing answered scores 0
            let score = if values.is_empty() {
                0.0
            } else {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                mean / scale_max * 100.0
            };

            PillarScore {
                name: pillar.name.clone(),
                score,
                answers: answers_for(pillar, &resolved.canonical),
            }
        })
        .collect();

    let overall = pillars.iter().map(|p| p.score).sum::<f64>() / pillars.len() as f64;

    Ok(ScoreCard { pillars, overall })
}

fn answers_for(pillar: &Pillar, answers: &Answers) -> Answers {
    pillar
        .questions
        .iter()
        .filter_map(|q| answers.get(&q.id).map(|v| (q.id.clone(), v.clone())))
        .collect()
}

/// Rebuilds pillar scores from a stored lead, in questionnaire order.
///
/// Pillars missing from the record (e.g. after a questionnaire change) score 0.
pub fn pillar_scores_from_record(questionnaire: &Questionnaire, record: &LeadRecord) -> Vec<PillarScore> {
    questionnaire
        .pillars
        .iter()
        .map(|pillar| PillarScore {
            name: pillar.name.clone(),
            score: f64::from(record.pillar_scores.get(&pillar.name).copied().unwrap_or(0)),
            answers: answers_for(pillar, &record.answers),
        })
        .collect()
}

pub fn pillar_commentary(pillar_name: &str, score: f64) -> String {
    if score >= 80.0 {
        format!("{} is strong and scalable - keep reinforcing what works.", pillar_name)
    } else if score >= 60.0 {
        format!(
            "{} shows a solid foundation with room to standardize and scale.",
            pillar_name
        )
    } else if score >= 40.0 {
        format!(
            "{} is emerging - formalize structure, cadence, and measurement.",
            pillar_name
        )
    } else {
        format!(
            "{} is underdeveloped - prioritize core mechanics and minimum viable structure.",
            pillar_name
        )
    }
}

pub fn assessment_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Strong"
    } else if score >= 60.0 {
        "Solid Foundation"
    } else if score >= 40.0 {
        "Emerging"
    } else {
        "Needs Development"
    }
}

/// Top two pillars and bottom three pillars by score.
///
/// Ties keep questionnaire order.
pub fn strengths_and_gaps(pillars: &[PillarScore]) -> (Vec<String>, Vec<String>) {
    let mut sorted: Vec<&PillarScore> = pillars.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    let strengths = sorted.iter().take(2).map(|p| p.name.clone()).collect();
    let gaps = sorted
        .iter()
        .skip(sorted.len().saturating_sub(3))
        .map(|p| p.name.clone())
        .collect();

    (strengths, gaps)
}

/// Actions for the three weakest pillars, weakest first.
pub fn recommend_actions(questionnaire: &Questionnaire, pillars: &[PillarScore]) -> Vec<String> {
    let mut sorted: Vec<&PillarScore> = pillars.iter().collect();
    sorted.sort_by(|a, b| a.score.total_cmp(&b.score));

    sorted
        .into_iter()
        .take(3)
        .map(|p| {
            questionnaire
                .pillars
                .iter()
                .find(|pillar| pillar.name == p.name)
                .and_then(|pillar| pillar.recommendation.clone())
                .unwrap_or_else(|| {
                    format!(
                        "Prioritize foundational improvements in {} to enable scale.",
                        p.name.to_lowercase()
                    )
                })
        })
        .collect()
}

pub fn summarize(questionnaire: &Questionnaire, card: ScoreCard) -> ScoreSummary {
    let (strengths, gaps) = strengths_and_gaps(&card.pillars);
    let recommendations = recommend_actions(questionnaire, &card.pillars);

    ScoreSummary {
        score: card.rounded(),
        overall: card.overall,
        tier: questionnaire.tier_for(card.overall).to_string(),
        pillars: card.pillars,
        strengths,
        gaps,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerValue;
    use crate::questionnaire::{Choice, Question};

    fn uniform(value: u32) -> Answers {
        Questionnaire::default()
            .questions()
            .map(|q| (q.id.clone(), AnswerValue::Number(value)))
            .collect()
    }

    #[test]
    fn test_uniform_answers_score_linearly() {
        let q = Questionnaire::default();
        assert_eq!(compute_score(&q, &uniform(5)).unwrap().rounded(), 100);
        assert_eq!(compute_score(&q, &uniform(3)).unwrap().rounded(), 60);
        assert_eq!(compute_score(&q, &uniform(1)).unwrap().rounded(), 20);
    }

    #[test]
    fn test_pillar_mean() {
        let q = Questionnaire::default();
        let mut answers = uniform(3);
        answers.insert("A1".into(), AnswerValue::Number(5));
        answers.insert("A2".into(), AnswerValue::Number(4));

        let card = compute_score(&q, &answers).unwrap();
        assert_eq!(card.pillars[0].score, 90.0);
        assert_eq!(card.pillars[1].score, 60.0);
        assert!((card.overall - 66.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_answers_listed() {
        let q = Questionnaire::default();
        let mut answers = uniform(4);
        answers.remove("C2");
        answers.remove("E1");

        match compute_score(&q, &answers) {
            Err(AppError::Validation(problems)) => {
                assert_eq!(problems, vec!["Missing answer for C2", "Missing answer for E1"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let q = Questionnaire::default();
        let mut answers = uniform(4);
        answers.insert("B1".into(), AnswerValue::Number(6));
        assert!(matches!(compute_score(&q, &answers), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_one_message_per_bad_answer() {
        let q = Questionnaire::default();
        let mut answers = uniform(4);
        answers.insert("A1".into(), AnswerValue::from("four"));
        answers.insert("A2".into(), AnswerValue::from("300"));

        match compute_score(&q, &answers) {
            Err(AppError::Validation(problems)) => assert_eq!(
                problems,
                vec![
                    "Answer for A1 must be a whole number",
                    "Answer for A2 must be between 1 and 5"
                ]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_categorical_answer_scores_choice_value() {
        let mut q = Questionnaire::default();
        q.pillars[0].questions[0] = Question {
            id: "A1".into(),
            text: "Do you sell through partners today?".into(),
            required: true,
            choices: vec![
                Choice { label: "Yes".into(), value: 5 },
                Choice { label: "No".into(), value: 1 },
            ],
        };
        let mut answers = uniform(3);
        answers.insert("A1".into(), AnswerValue::from("yes"));

        let card = compute_score(&q, &answers).unwrap();
        assert!((card.pillars[0].score - 80.0).abs() < 1e-9);
        assert_eq!(card.pillars[0].answers.get("A1"), Some(&AnswerValue::from("Yes")));
    }

    #[test]
    fn test_optional_unanswered_pillar_scores_zero() {
        let mut q = Questionnaire::default();
        for question in &mut q.pillars[4].questions {
            question.required = false;
        }
        let mut answers = uniform(5);
        answers.remove("E1");
        answers.remove("E2");

        let card = compute_score(&q, &answers).unwrap();
        assert_eq!(card.pillars[4].score, 0.0);
        assert_eq!(card.rounded(), 80);
    }

    #[test]
    fn test_strengths_gaps_and_recommendations() {
        let q = Questionnaire::default();
        let mut answers = uniform(3);
        answers.insert("B1".into(), AnswerValue::Number(5));
        answers.insert("B2".into(), AnswerValue::Number(5));
        answers.insert("D1".into(), AnswerValue::Number(1));
        answers.insert("D2".into(), AnswerValue::Number(1));

        let card = compute_score(&q, &answers).unwrap();
        let (strengths, gaps) = strengths_and_gaps(&card.pillars);
        assert_eq!(
            strengths,
            vec!["B. Partner Program Design", "A. Channel Strategy & Alignment"]
        );
        assert_eq!(
            gaps,
            vec![
                "C. Partner Enablement & Engagement",
                "E. Growth Readiness",
                "D. Sales & Operations Integration"
            ]
        );

        let recs = recommend_actions(&q, &card.pillars);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Separate channel pipeline tracking"));
        assert!(recs[1].starts_with("Clarify the partner role"));
    }

    #[test]
    fn test_recommendation_fallback() {
        let mut q = Questionnaire::default();
        q.pillars[0].recommendation = None;
        let mut answers = uniform(5);
        answers.insert("A1".into(), AnswerValue::Number(1));

        let card = compute_score(&q, &answers).unwrap();
        let recs = recommend_actions(&q, &card.pillars);
        assert_eq!(
            recs[0],
            "Prioritize foundational improvements in a. channel strategy & alignment to enable scale."
        );
    }

    #[test]
    fn test_commentary_and_labels() {
        assert_eq!(assessment_label(80.0), "Strong");
        assert_eq!(assessment_label(79.9), "Solid Foundation");
        assert_eq!(assessment_label(40.0), "Emerging");
        assert_eq!(assessment_label(0.0), "Needs Development");
        assert!(pillar_commentary("X", 45.0).contains("is emerging"));
        assert!(pillar_commentary("X", 10.0).contains("underdeveloped"));
    }
}
