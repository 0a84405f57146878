//! Questionnaire definition: pillars, questions, answer scale and tier bands.
//!
//! The scoring formula is driven entirely by this structure. A built-in
//! Channel Readiness questionnaire is used unless `QUESTIONNAIRE_PATH` points
//! at a JSON file of the same shape.

use crate::models::AnswerValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Inclusive integer answer scale (e.g. 1 = strongly disagree, 5 = strongly agree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScale {
    pub min: u8,
    pub max: u8,
    /// Initial slider position on the client form.
    pub default: u8,
}

impl AnswerScale {
    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Labelled options for a categorical question. Empty means the answer
    /// is a number on the scale.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

/// One option of a categorical question and the scale value it scores as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: u8,
}

impl Question {
    pub fn is_categorical(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Resolves an answer to its canonical form and scale value.
    ///
    /// Choice labels match case-insensitively and are returned with the
    /// configured spelling. Numeric answers may arrive as numbers or digit
    /// strings. The error is the message shown to the user.
    pub fn resolve(&self, scale: AnswerScale, answer: &AnswerValue) -> Result<(AnswerValue, u8), String> {
        if self.is_categorical() {
            let text = match answer {
                AnswerValue::Text(text) => text.trim(),
                AnswerValue::Number(_) => "",
            };
            return self
                .choices
                .iter()
                .find(|c| c.label.eq_ignore_ascii_case(text))
                .map(|c| (AnswerValue::Text(c.label.clone()), c.value))
                .ok_or_else(|| {
                    let labels: Vec<&str> = self.choices.iter().map(|c| c.label.as_str()).collect();
                    format!("Answer for {} must be one of: {}", self.id, labels.join(", "))
                });
        }

        let number = match answer {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(text) => text.trim().parse::<u32>().ok(),
        }
        .ok_or_else(|| format!("Answer for {} must be a whole number", self.id))?;

        match u8::try_from(number) {
            Ok(value) if scale.contains(value) => Ok((AnswerValue::Number(number), value)),
            _ => Err(format!(
                "Answer for {} must be between {} and {}",
                self.id, scale.min, scale.max
            )),
        }
    }
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pillar {
    pub name: String,
    pub questions: Vec<Question>,
    /// 90-day action suggested when this pillar is among the weakest.
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Named band of the rounded overall score, both bounds inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierBand {
    pub name: String,
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub title: String,
    pub scale: AnswerScale,
    pub pillars: Vec<Pillar>,
    pub tiers: Vec<TierBand>,
}

impl Questionnaire {
    /// The five-pillar Channel Readiness questionnaire.
    pub fn channel_readiness() -> Self {
        fn q(id: &str, text: &str) -> Question {
            Question {
                id: id.to_string(),
                text: text.to_string(),
                required: true,
                choices: Vec::new(),
            }
        }
        fn pillar(name: &str, questions: Vec<Question>, recommendation: &str) -> Pillar {
            Pillar {
                name: name.to_string(),
                questions,
                recommendation: Some(recommendation.to_string()),
            }
        }
        fn tier(name: &str, min: u8, max: u8) -> TierBand {
            TierBand {
                name: name.to_string(),
                min,
                max,
            }
        }

        Self {
            title: "Channel Readiness Assessment".to_string(),
            scale: AnswerScale {
                min: 1,
                max: 5,
                default: 3,
            },
            pillars: vec![
                pillar(
                    "A. Channel Strategy & Alignment",
                    vec![
                        q("A1", "Do you have a clearly defined purpose for selling through partners (beyond revenue expansion)?"),
                        q("A2", "Are your targeted partner types (TA, VAR, MSP, SI, etc.) well-defined and prioritized?"),
                    ],
                    "Clarify the partner role by segment and set a 12-month channel thesis with 3 measurable outcomes.",
                ),
                pillar(
                    "B. Partner Program Design",
                    vec![
                        q("B1", "Do you have a partner program with tiering, incentives, rules of engagement, or performance criteria?"),
                        q("B2", "Can you clearly articulate what makes your offer unique and profitable for partners?"),
                    ],
                    "Publish a simple one-pager: tiers, incentives, rules of engagement, and co-marketing paths.",
                ),
                pillar(
                    "C. Partner Enablement & Engagement",
                    vec![
                        q("C1", "Do you provide training, sales playbooks, or co-branded marketing assets?"),
                        q("C2", "How consistently do you communicate and collaborate with active partners?"),
                    ],
                    "Stand up a 30-60-90 enablement cadence: onboarding kit, monthly enablement call, quarterly MDF campaign.",
                ),
                pillar(
                    "D. Sales & Operations Integration",
                    vec![
                        q("D1", "Are internal sales/ops aligned to support channel transactions (quoting, order flow, support)?"),
                        q("D2", "Do you track partner pipeline separately with forecast accuracy goals?"),
                    ],
                    "Separate channel pipeline tracking; define lead routing/quoting SLAs; add 'channel' to forecast reviews.",
                ),
                pillar(
                    "E. Growth Readiness",
                    vec![
                        q("E1", "Does senior leadership actively sponsor the channel model?"),
                        q("E2", "Are tools, systems, and staffing sufficient to support 2-3x partner growth?"),
                    ],
                    "Baseline partner P&L and capacity; set tooling minimums (PRM/CRM views) and resource triggers for 2-3x growth.",
                ),
            ],
            tiers: vec![
                tier("Emerging", 0, 39),
                tier("Developing", 40, 59),
                tier("Established", 60, 79),
                tier("Optimized", 80, 100),
            ],
        }
    }

    /// Loads and validates a questionnaire from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read questionnaire {}: {}", path.display(), e)
        })?;
        let questionnaire: Self = serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("Invalid questionnaire JSON in {}: {}", path.display(), e)
        })?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    /// Checks the structural rules scoring relies on.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pillars.is_empty() {
            anyhow::bail!("Questionnaire must define at least one pillar");
        }
        if self.scale.min >= self.scale.max {
            anyhow::bail!(
                "Answer scale min ({}) must be below max ({})",
                self.scale.min,
                self.scale.max
            );
        }
        if !self.scale.contains(self.scale.default) {
            anyhow::bail!(
                "Answer scale default {} is outside {}..={}",
                self.scale.default,
                self.scale.min,
                self.scale.max
            );
        }

        let mut seen = HashSet::new();
        for pillar in &self.pillars {
            if pillar.questions.is_empty() {
                anyhow::bail!("Pillar '{}' has no questions", pillar.name);
            }
            for question in &pillar.questions {
                if question.id.trim().is_empty() {
                    anyhow::bail!("Pillar '{}' has a question without an id", pillar.name);
                }
                if !seen.insert(question.id.as_str()) {
                    anyhow::bail!("Duplicate question id '{}'", question.id);
                }
                let mut labels = HashSet::new();
                for choice in &question.choices {
                    if choice.label.trim().is_empty() {
                        anyhow::bail!("Question '{}' has a choice without a label", question.id);
                    }
                    if !labels.insert(choice.label.to_lowercase()) {
                        anyhow::bail!(
                            "Question '{}' repeats choice '{}'",
                            question.id,
                            choice.label
                        );
                    }
                    if !self.scale.contains(choice.value) {
                        anyhow::bail!(
                            "Choice '{}' of question '{}' scores {} outside {}..={}",
                            choice.label,
                            question.id,
                            choice.value,
                            self.scale.min,
                            self.scale.max
                        );
                    }
                }
            }
        }

        // Tiers must tile 0..=100 in ascending order
        let mut next = 0u16;
        for band in &self.tiers {
            if u16::from(band.min) != next || band.max < band.min {
                anyhow::bail!(
                    "Tier '{}' ({}-{}) leaves a gap or overlap at {}",
                    band.name,
                    band.min,
                    band.max,
                    next
                );
            }
            next = u16::from(band.max) + 1;
        }
        if next != 101 {
            anyhow::bail!("Tier bands must cover scores 0 through 100");
        }

        Ok(())
    }

    /// All questions in display order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pillars.iter().flat_map(|p| p.questions.iter())
    }

    /// Tier name for a score, using the score rounded to the nearest integer.
    pub fn tier_for(&self, score: f64) -> &str {
        let rounded = score.round();
        self.tiers
            .iter()
            .find(|band| f64::from(band.min) <= rounded && rounded <= f64::from(band.max))
            .map(|band| band.name.as_str())
            .unwrap_or("Unknown")
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::channel_readiness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_questionnaire_is_valid() {
        let q = Questionnaire::channel_readiness();
        assert!(q.validate().is_ok());
        assert_eq!(q.pillars.len(), 5);
        assert_eq!(q.questions().count(), 10);
    }

    #[test]
    fn test_tier_boundaries() {
        let q = Questionnaire::default();
        assert_eq!(q.tier_for(0.0), "Emerging");
        assert_eq!(q.tier_for(39.4), "Emerging");
        assert_eq!(q.tier_for(39.5), "Developing");
        assert_eq!(q.tier_for(59.0), "Developing");
        assert_eq!(q.tier_for(60.0), "Established");
        assert_eq!(q.tier_for(79.9), "Optimized");
        assert_eq!(q.tier_for(100.0), "Optimized");
        assert_eq!(q.tier_for(140.0), "Unknown");
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let mut q = Questionnaire::default();
        q.pillars[1].questions[0].id = "A1".to_string();
        let err = q.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate question id 'A1'"));
    }

    #[test]
    fn test_tier_gap_rejected() {
        let mut q = Questionnaire::default();
        q.tiers[1].min = 41;
        assert!(q.validate().is_err());

        let mut q = Questionnaire::default();
        q.tiers.pop();
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_scale_default_must_be_in_range() {
        let mut q = Questionnaire::default();
        q.scale.default = 9;
        assert!(q.validate().is_err());
    }

    fn yes_no() -> Question {
        Question {
            id: "q1".into(),
            text: "Do you have a partner program?".into(),
            required: true,
            choices: vec![
                Choice { label: "Yes".into(), value: 10 },
                Choice { label: "No".into(), value: 0 },
            ],
        }
    }

    const TEN: AnswerScale = AnswerScale { min: 0, max: 10, default: 5 };

    #[test]
    fn test_resolve_choice_labels() {
        let q = yes_no();
        assert_eq!(
            q.resolve(TEN, &AnswerValue::from(" yes ")),
            Ok((AnswerValue::from("Yes"), 10))
        );
        assert_eq!(
            q.resolve(TEN, &AnswerValue::from("Maybe")).unwrap_err(),
            "Answer for q1 must be one of: Yes, No"
        );
        assert!(q.resolve(TEN, &AnswerValue::Number(10)).is_err());
    }

    #[test]
    fn test_resolve_numbers() {
        let q = Questionnaire::default();
        let a1 = q.questions().next().unwrap();
        let scale = q.scale;
        assert_eq!(a1.resolve(scale, &AnswerValue::from("4")), Ok((AnswerValue::Number(4), 4)));
        assert_eq!(
            a1.resolve(scale, &AnswerValue::from("four")).unwrap_err(),
            "Answer for A1 must be a whole number"
        );
        assert_eq!(
            a1.resolve(scale, &AnswerValue::Number(300)).unwrap_err(),
            "Answer for A1 must be between 1 and 5"
        );
    }

    #[test]
    fn test_choice_outside_scale_rejected() {
        let mut q = Questionnaire::default();
        let mut question = yes_no();
        question.id = "Z1".into();
        q.pillars[0].questions.push(question);
        let err = q.validate().unwrap_err();
        assert!(err.to_string().contains("outside 1..=5"));
    }

    #[test]
    fn test_from_file_round_trips_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questionnaire.json");
        let json = serde_json::to_string_pretty(&Questionnaire::default()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = Questionnaire::from_file(&path).unwrap();
        assert_eq!(loaded.pillars[4].questions[1].id, "E2");
        assert_eq!(loaded.scale, Questionnaire::default().scale);
    }

    #[test]
    fn test_from_file_defaults_required_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.json");
        std::fs::write(
            &path,
            r#"{
                "title": "Mini",
                "scale": {"min": 0, "max": 10, "default": 5},
                "pillars": [{"name": "Only", "questions": [{"id": "q1", "text": "Ready?"}]}],
                "tiers": [{"name": "Low", "min": 0, "max": 49}, {"name": "High", "min": 50, "max": 100}]
            }"#,
        )
        .unwrap();

        let loaded = Questionnaire::from_file(&path).unwrap();
        assert!(loaded.pillars[0].questions[0].required);
        assert!(loaded.pillars[0].recommendation.is_none());
    }
}
