//! Core types for the quiz platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analytics::accuracy;
use crate::error::{Result, ValidationError};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(ValidationError::InvalidValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Where an answer was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    Study,
    Exam,
}

impl AnswerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Exam => "exam",
        }
    }
}

impl Default for AnswerMode {
    fn default() -> Self {
        Self::Study
    }
}

impl FromStr for AnswerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "study" => Ok(Self::Study),
            "exam" => Ok(Self::Exam),
            other => Err(ValidationError::InvalidValue {
                field: "mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Correct/total counter for one category or certification track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn new(correct: u32, total: u32) -> Self {
        Self { correct, total }
    }

    /// Rounded percentage, 0 when nothing was answered.
    pub fn accuracy(&self) -> u32 {
        accuracy(u64::from(self.correct), u64::from(self.total))
    }
}

/// Rollup of a user's study progress.
///
/// The client computes this document and pushes it wholesale. The server
/// checks its shape but never reconciles it with the answer log, so the
/// totals here can drift from what `UserAnswer` rows say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressDocument {
    pub total_answered: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub questions_answered: Vec<String>,
    pub marked_for_review: Vec<String>,
    pub streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    pub category_progress: BTreeMap<String, Tally>,
    pub certification_progress: BTreeMap<String, Tally>,
}

impl ProgressDocument {
    /// Check internal shape: no tally may claim more correct than total.
    pub fn validate(&self) -> Result<()> {
        if self.total_correct > self.total_answered {
            return Err(ValidationError::TotalsOverflow {
                correct: self.total_correct,
                answered: self.total_answered,
            });
        }

        let tallies = self
            .category_progress
            .iter()
            .chain(self.certification_progress.iter());
        for (key, tally) in tallies {
            if key.trim().is_empty() {
                return Err(ValidationError::Empty { field: "progress key" });
            }
            if tally.correct > tally.total {
                return Err(ValidationError::TallyOverflow {
                    key: key.clone(),
                    correct: tally.correct,
                    total: tally.total,
                });
            }
        }

        Ok(())
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(u64::from(self.total_correct), u64::from(self.total_answered))
    }
}

/// One answered question, appended to the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    pub question_id: String,
    pub selected_index: u32,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub mode: AnswerMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<i64>,
}

impl AnswerEvent {
    pub fn validate(&self) -> Result<()> {
        if self.question_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "questionId" });
        }
        Ok(())
    }
}

/// Answer recorded inside a closed exam run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAnswer {
    pub question_id: String,
    #[serde(default)]
    pub selected_index: Option<u32>,
    pub is_correct: bool,
}

/// A finished simulated-exam run as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_questions: u32,
    pub correct_answers: u32,
    #[serde(default)]
    pub answers: Vec<ExamAnswer>,
    #[serde(default = "default_exam_mode")]
    pub mode: String,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub certification: Option<String>,
}

fn default_exam_mode() -> String {
    "standard".to_string()
}

impl ExamRecord {
    pub fn validate(&self) -> Result<()> {
        if self.finished_at < self.started_at {
            return Err(ValidationError::InvalidValue {
                field: "finishedAt",
                value: self.finished_at.to_rfc3339(),
            });
        }
        if self.correct_answers > self.total_questions {
            return Err(ValidationError::TotalsOverflow {
                correct: self.correct_answers,
                answered: self.total_questions,
            });
        }
        if self.mode.trim().is_empty() {
            return Err(ValidationError::Empty { field: "mode" });
        }
        Ok(())
    }

    /// Score as a rounded percentage.
    pub fn score(&self) -> u32 {
        accuracy(
            u64::from(self.correct_answers),
            u64::from(self.total_questions),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_round_trip_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.as_str(), "user");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_progress_document_defaults_missing_fields() {
        let doc: ProgressDocument = serde_json::from_str(r#"{"totalAnswered": 4}"#).unwrap();
        assert_eq!(doc.total_answered, 4);
        assert!(doc.category_progress.is_empty());
        assert_eq!(doc.last_study_date, None);
    }

    #[test]
    fn test_progress_document_camel_case_maps() {
        let json = r#"{
            "totalAnswered": 3,
            "totalCorrect": 2,
            "totalIncorrect": 1,
            "questionsAnswered": ["q1", "q2", "q3"],
            "categoryProgress": {"networking": {"correct": 2, "total": 3}},
            "certificationProgress": {"ccna": {"correct": 2, "total": 3}}
        }"#;
        let doc: ProgressDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.category_progress["networking"], Tally::new(2, 3));
        assert_eq!(doc.certification_progress["ccna"].accuracy(), 67);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_progress_validate_rejects_overflowing_tally() {
        let mut doc = ProgressDocument::default();
        doc.category_progress
            .insert("security".to_string(), Tally::new(5, 4));

        let err = doc.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::TallyOverflow {
                key: "security".to_string(),
                correct: 5,
                total: 4
            }
        );
    }

    #[test]
    fn test_progress_validate_rejects_overflowing_totals() {
        let doc = ProgressDocument {
            total_answered: 1,
            total_correct: 2,
            ..Default::default()
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_answer_event_requires_question_id() {
        let event = AnswerEvent {
            question_id: "  ".to_string(),
            selected_index: 0,
            is_correct: true,
            timestamp: Utc::now(),
            mode: AnswerMode::Study,
            exam_id: None,
        };
        assert_eq!(
            event.validate().unwrap_err(),
            ValidationError::Empty { field: "questionId" }
        );
    }

    #[test]
    fn test_exam_record_score_and_validation() {
        let start = Utc::now();
        let exam = ExamRecord {
            started_at: start,
            finished_at: start + Duration::minutes(30),
            total_questions: 3,
            correct_answers: 1,
            answers: Vec::new(),
            mode: "timed".to_string(),
            time_limit_minutes: Some(60),
            certification: Some("ccna".to_string()),
        };
        assert!(exam.validate().is_ok());
        assert_eq!(exam.score(), 33);

        let backwards = ExamRecord {
            finished_at: start - Duration::minutes(1),
            ..exam
        };
        assert!(backwards.validate().is_err());
    }
}
