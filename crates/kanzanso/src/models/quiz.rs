//! Self-assessment quizzes: questions, submissions and results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Document;
use crate::validate;

/// The quiz kinds offered by the service, in display order.
pub const QUIZ_TYPES: [QuizType; 5] = [
    QuizType::InitialAssessment,
    QuizType::WeeklyCheckin,
    QuizType::AnxietyFocused,
    QuizType::DepressionFocused,
    QuizType::DailyMood,
];

/// Kind of quiz, which decides the questions asked and how a total is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    /// The first, general assessment.
    InitialAssessment,
    /// A short weekly check-in.
    WeeklyCheckin,
    /// Anxiety screening.
    AnxietyFocused,
    /// Depression screening.
    DepressionFocused,
    /// A quick daily mood check.
    DailyMood,
}

impl QuizType {
    /// Wire name, also used as the question category of focused quizzes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialAssessment => "initial_assessment",
            Self::WeeklyCheckin => "weekly_checkin",
            Self::AnxietyFocused => "anxiety_focused",
            Self::DepressionFocused => "depression_focused",
            Self::DailyMood => "daily_mood",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        QUIZ_TYPES.into_iter().find(|t| t.as_str() == name)
    }

    /// Read a total score for this kind of quiz.
    #[must_use]
    pub fn interpret(self, total: u32) -> &'static str {
        match self {
            Self::InitialAssessment => match total {
                10..=16 => "DISORDER FREE: You don't seem to be suffering from any symptoms, and overall you are balanced and happy. Remember that mental health issues affect a lot of people, so keep an eye on your friends and family to make sure they're well and happy.",
                17..=24 => "ANXIETY: You are a serious worrier, and you fear that a panic attack could strike at any time. This holds you back from living your life to the full. Confiding in those around you and talking about your worries can help, and meditation and breathing exercises may calm your racing mind.",
                25..=32 => "ANTISOCIAL: You prefer to be on your own and you struggle to develop relationships with others. You lack empathy and you don't exhibit any emotions. Getting to the root of this problem will help you to understand it and tackle it, so speak up.",
                _ => "DEPRESSION: You are burdened by feelings of hopelessness and helplessness, and you aren't truly engaged in life. You deserve to be happy and healthy, and talking to a doctor could go a long way towards getting you to a more content place.",
            },
            Self::WeeklyCheckin => match total {
                0..=10 => "GREAT WEEK: You've had a great week with low stress levels. Keep up the good work!",
                11..=15 => "GOOD WEEK: You've had a good week overall, with some minor stressors. Continue your self-care practices.",
                16..=20 => "MODERATE WEEK: You've experienced moderate stress this week. Consider adding more relaxation activities.",
                _ => "CHALLENGING WEEK: This week has been challenging for you. Focus on self-care and consider talking to someone about your feelings.",
            },
            Self::AnxietyFocused => match total {
                0..=10 => "MINIMAL ANXIETY: You're experiencing minimal anxiety symptoms. Continue your healthy coping strategies.",
                11..=15 => "MILD ANXIETY: You're experiencing mild anxiety. Try incorporating breathing exercises and mindfulness.",
                16..=20 => "MODERATE ANXIETY: You're experiencing moderate anxiety. Regular meditation and possibly talking to a counselor could help.",
                _ => "SEVERE ANXIETY: You're experiencing significant anxiety symptoms. We recommend seeking professional support.",
            },
            Self::DepressionFocused => match total {
                0..=10 => "MINIMAL DEPRESSION: You're showing minimal signs of depression. Maintain your positive activities.",
                11..=15 => "MILD DEPRESSION: You're showing some signs of low mood. Try to increase physical activity and social connections.",
                16..=20 => "MODERATE DEPRESSION: You're showing moderate signs of depression. Consider speaking with a mental health professional.",
                _ => "SEVERE DEPRESSION: You're showing significant signs of depression. We strongly recommend seeking professional support.",
            },
            Self::DailyMood => match total {
                0..=5 => "GREAT DAY: Today is going well for you! Enjoy the positive feelings.",
                6..=8 => "GOOD DAY: You're having a good day with some minor challenges.",
                9..=11 => "OKAY DAY: Your day has been okay, with some ups and downs.",
                _ => "TOUGH DAY: Today has been challenging. Be kind to yourself and practice self-care.",
            },
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest weight a single option may carry.
pub const MAX_OPTION_SCORE: u32 = 10;

/// Highest total a stored result may carry.
pub const MAX_QUIZ_SCORE: u32 = 100;

fn default_quiz_type() -> String {
    QuizType::InitialAssessment.as_str().to_string()
}

/// A multiple-choice question. `scores[i]` is the weight of `options[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique id.
    pub id: String,
    /// The question.
    pub text: String,
    /// Answer choices in display order.
    pub options: Vec<String>,
    /// Weight of each option, aligned with `options`.
    pub scores: Vec<u32>,
    /// Topic, such as `anxiety` or `sleep`.
    pub category: String,
    /// Quiz this question belongs to.
    #[serde(default = "default_quiz_type")]
    pub quiz_type: String,
}

impl Document for Question {
    const COLLECTION: &'static str = "questions";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or replacing a [`Question`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    /// The question.
    pub text: String,
    /// Answer choices in display order.
    pub options: Vec<String>,
    /// Weight of each option, aligned with `options`.
    pub scores: Vec<u32>,
    /// Grouping label.
    pub category: String,
    /// Defaults to `initial_assessment`.
    pub quiz_type: Option<String>,
}

impl QuestionDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("text", &self.text, 500)?;
        validate::required("category", &self.category, 50)?;
        if self.options.is_empty() {
            return Err(Error::validation("options", "must not be empty"));
        }
        if self.options.len() != self.scores.len() {
            return Err(Error::validation(
                "scores",
                format!(
                    "must have one score per option ({} options, {} scores)",
                    self.options.len(),
                    self.scores.len()
                ),
            ));
        }
        for &score in &self.scores {
            validate::in_range("scores", score, 0, MAX_OPTION_SCORE)?;
        }
        Ok(())
    }
}

/// Answers to a quiz, as question id to chosen option index.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    /// Unknown kinds are scored as `initial_assessment`.
    pub quiz_type: String,
    /// Question id to chosen option index.
    pub answers: BTreeMap<String, i64>,
}

/// A scored quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Quiz kind, by wire name.
    pub quiz_type: String,
    /// Sum of the chosen option weights.
    pub score: u32,
    /// Totals per question category.
    pub category_scores: BTreeMap<String, u32>,
    /// Reading of the total score.
    pub interpretation: Option<String>,
    /// Suggested next steps as free text.
    pub recommendations: Option<String>,
    /// When the quiz was taken.
    pub taken_at: DateTime<Utc>,
}

impl Document for QuizResult {
    const COLLECTION: &'static str = "quiz_results";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for recording a result scored by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultDraft {
    /// Quiz kind, by wire name.
    pub quiz_type: String,
    /// Total computed by the client, 0 to 100.
    pub score: i64,
    /// Totals per question category.
    #[serde(default)]
    pub category_scores: BTreeMap<String, u32>,
    /// Reading of the total score.
    pub interpretation: Option<String>,
    /// Suggested next steps as free text.
    pub recommendations: Option<String>,
}

impl QuizResultDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("quizType", &self.quiz_type, 50)?;
        validate::in_range("score", self.score, 0, i64::from(MAX_QUIZ_SCORE))?;
        validate::optional_max_len("interpretation", self.interpretation.as_deref(), 2000)?;
        validate::optional_max_len("recommendations", self.recommendations.as_deref(), 2000)
    }
}

/// Chart data for a user's recent scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Whose results these are.
    pub user_id: String,
    /// Human-readable summary.
    pub message: String,
    /// Chart data.
    pub data: ProgressChart,
}

/// Labels and series of a [`ProgressReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressChart {
    /// One label per result, oldest first.
    pub labels: Vec<String>,
    /// Series plotted against `labels`.
    pub datasets: Vec<ProgressSeries>,
}

/// One series of a [`ProgressChart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSeries {
    /// Series name.
    pub label: String,
    /// One score per label.
    pub data: Vec<u32>,
}

/// A suggested next step after a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to do.
    pub text: String,
    /// App route for it.
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_type_names_round_trip() {
        for quiz_type in QUIZ_TYPES {
            assert_eq!(QuizType::parse(quiz_type.as_str()), Some(quiz_type));
        }
        assert_eq!(QuizType::parse("personality"), None);
    }

    #[test]
    fn test_quiz_type_serde_matches_as_str() {
        let json = serde_json::to_string(&QuizType::WeeklyCheckin).unwrap();
        assert_eq!(json, "\"weekly_checkin\"");
    }

    #[test]
    fn test_initial_assessment_bands() {
        let t = QuizType::InitialAssessment;
        assert!(t.interpret(10).starts_with("DISORDER FREE"));
        assert!(t.interpret(16).starts_with("DISORDER FREE"));
        assert!(t.interpret(17).starts_with("ANXIETY"));
        assert!(t.interpret(25).starts_with("ANTISOCIAL"));
        assert!(t.interpret(33).starts_with("DEPRESSION"));
        // Below the scale is read as the last band too
        assert!(t.interpret(4).starts_with("DEPRESSION"));
    }

    #[test]
    fn test_threshold_bands() {
        assert!(QuizType::WeeklyCheckin.interpret(10).starts_with("GREAT WEEK"));
        assert!(QuizType::WeeklyCheckin.interpret(21).starts_with("CHALLENGING WEEK"));
        assert!(QuizType::AnxietyFocused.interpret(15).starts_with("MILD ANXIETY"));
        assert!(QuizType::DepressionFocused.interpret(20).starts_with("MODERATE DEPRESSION"));
        assert!(QuizType::DailyMood.interpret(5).starts_with("GREAT DAY"));
        assert!(QuizType::DailyMood.interpret(9).starts_with("OKAY DAY"));
        assert!(QuizType::DailyMood.interpret(12).starts_with("TOUGH DAY"));
    }

    #[test]
    fn test_question_quiz_type_default() {
        let json = r#"{"id": "q1", "text": "How?", "options": ["a"], "scores": [1], "category": "mood"}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.quiz_type, "initial_assessment");
    }

    #[test]
    fn test_question_draft_scores_match_options() {
        let draft = QuestionDraft {
            text: "How often do you feel tense?".to_string(),
            options: vec!["Never".to_string(), "Often".to_string()],
            scores: vec![1],
            category: "anxiety_focused".to_string(),
            quiz_type: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_question_draft_scores_are_bounded() {
        let mut draft = QuestionDraft {
            text: "How rested do you feel?".to_string(),
            options: vec!["Very".to_string(), "Not at all".to_string()],
            scores: vec![0, MAX_OPTION_SCORE],
            category: "daily_mood".to_string(),
            quiz_type: None,
        };
        assert!(draft.validate().is_ok());

        draft.scores = vec![1, u32::MAX];
        assert!(matches!(
            draft.validate(),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_result_draft_score_range() {
        let draft = QuizResultDraft {
            quiz_type: "daily_mood".to_string(),
            score: 101,
            category_scores: BTreeMap::new(),
            interpretation: None,
            recommendations: None,
        };
        assert!(draft.validate().is_err());

        let ok = QuizResultDraft { score: 42, ..draft };
        assert!(ok.validate().is_ok());
    }
}
