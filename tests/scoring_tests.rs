/// Scoring scenarios against the built-in and custom questionnaires
use channel_readiness::errors::AppError;
use channel_readiness::models::{AnswerValue, Answers};
use channel_readiness::questionnaire::{AnswerScale, Choice, Pillar, Question, Questionnaire, TierBand};
use channel_readiness::scoring::{compute_score, summarize};

fn answers(pairs: &[(&str, u32)]) -> Answers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), AnswerValue::Number(*v)))
        .collect()
}

/// Two-question questionnaire on a 0..=10 scale
fn custom_questionnaire() -> Questionnaire {
    Questionnaire {
        title: "Mini".to_string(),
        scale: AnswerScale {
            min: 0,
            max: 10,
            default: 5,
        },
        pillars: vec![
            Pillar {
                name: "Commitment".to_string(),
                questions: vec![Question {
                    id: "q1".to_string(),
                    text: "Is leadership committed?".to_string(),
                    required: true,
                    choices: vec![],
                }],
                recommendation: None,
            },
            Pillar {
                name: "Capacity".to_string(),
                questions: vec![Question {
                    id: "q2".to_string(),
                    text: "How much capacity do you have?".to_string(),
                    required: true,
                    choices: vec![],
                }],
                recommendation: Some("Hire a partner manager.".to_string()),
            },
        ],
        tiers: vec![
            TierBand {
                name: "Low".to_string(),
                min: 0,
                max: 49,
            },
            TierBand {
                name: "High".to_string(),
                min: 50,
                max: 100,
            },
        ],
    }
}

#[test]
fn custom_questionnaire_scores_against_its_scale() {
    let q = custom_questionnaire();
    assert!(q.validate().is_ok());

    let card = compute_score(&q, &answers(&[("q1", 10), ("q2", 8)])).unwrap();
    assert_eq!(card.pillars[0].score, 100.0);
    assert_eq!(card.pillars[1].score, 80.0);
    assert_eq!(card.rounded(), 90);
    assert_eq!(q.tier_for(card.overall), "High");
}

/// Same questionnaire with q1 answered Yes or No
fn yes_no_questionnaire() -> Questionnaire {
    let mut q = custom_questionnaire();
    q.pillars[0].questions[0].choices = vec![
        Choice {
            label: "Yes".to_string(),
            value: 10,
        },
        Choice {
            label: "No".to_string(),
            value: 0,
        },
    ];
    q
}

#[test]
fn yes_no_answer_mixes_with_numeric_answer() {
    let q = yes_no_questionnaire();
    assert!(q.validate().is_ok());

    let mut answers = answers(&[("q2", 8)]);
    answers.insert("q1".to_string(), AnswerValue::from("Yes"));
    let card = compute_score(&q, &answers).unwrap();
    assert_eq!(card.rounded(), 90);
    assert_eq!(card.pillars[0].answers.get("q1"), Some(&AnswerValue::from("Yes")));

    answers.insert("q1".to_string(), AnswerValue::from("no"));
    assert_eq!(compute_score(&q, &answers).unwrap().rounded(), 40);
}

#[test]
fn yes_no_question_rejects_numbers() {
    let q = yes_no_questionnaire();
    match compute_score(&q, &answers(&[("q1", 8), ("q2", 8)])) {
        Err(AppError::Validation(problems)) => {
            assert_eq!(problems, vec!["Answer for q1 must be one of: Yes, No"])
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn missing_q1_rejected() {
    let q = custom_questionnaire();
    match compute_score(&q, &answers(&[("q2", 8)])) {
        Err(AppError::Validation(problems)) => assert_eq!(problems, vec!["Missing answer for q1"]),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn unknown_answers_ignored() {
    let q = custom_questionnaire();
    let card = compute_score(&q, &answers(&[("q1", 4), ("q2", 4), ("zz", 200)])).unwrap();
    assert_eq!(card.rounded(), 40);
}

#[test]
fn summary_for_mixed_builtin_answers() {
    let q = Questionnaire::default();
    let card = compute_score(
        &q,
        &answers(&[
            ("A1", 5),
            ("A2", 5),
            ("B1", 4),
            ("B2", 4),
            ("C1", 3),
            ("C2", 3),
            ("D1", 2),
            ("D2", 2),
            ("E1", 1),
            ("E2", 2),
        ]),
    )
    .unwrap();

    let summary = summarize(&q, card);
    assert_eq!(summary.score, 62);
    assert_eq!(summary.tier, "Established");
    assert_eq!(summary.strengths[0], "A. Channel Strategy & Alignment");
    assert_eq!(summary.gaps.last().unwrap(), "E. Growth Readiness");
    assert!(summary.recommendations[0].starts_with("Baseline partner P&L"));
}
