//! Request bodies and factory functions shared by the API tests.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use quiz_backend::models::{NewUser, Role};

pub fn new_user(username: &str, role: Role, password_hash: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: password_hash.to_string(),
        display_name: username.to_string(),
        role,
    }
}

/// Body for POST /api/users/:id/answers.
pub fn answer_request(question_id: &str, is_correct: bool) -> Value {
    json!({
        "questionId": question_id,
        "selectedIndex": 2,
        "isCorrect": is_correct,
        "timestamp": Utc::now().to_rfc3339(),
        "mode": "study",
    })
}

/// Body for POST /api/users/:id/exams with `correct` of `total` right.
pub fn exam_request(total: u32, correct: u32) -> Value {
    let finished = Utc::now();
    let started = finished - Duration::minutes(30);
    let answers: Vec<Value> = (0..total)
        .map(|i| {
            json!({
                "questionId": format!("q{}", i),
                "selectedIndex": 0,
                "isCorrect": i < correct,
            })
        })
        .collect();

    json!({
        "startedAt": started.to_rfc3339(),
        "finishedAt": finished.to_rfc3339(),
        "totalQuestions": total,
        "correctAnswers": correct,
        "answers": answers,
        "mode": "timed",
        "timeLimitMinutes": 45,
        "certification": "ccna",
    })
}

/// Body for PUT /api/users/:id/progress.
pub fn progress_document(answered: u32, correct: u32) -> Value {
    json!({
        "totalAnswered": answered,
        "totalCorrect": correct,
        "totalIncorrect": answered - correct,
        "questionsAnswered": ["q1", "q2"],
        "markedForReview": ["q2"],
        "streak": 3,
        "categoryProgress": { "routing": { "correct": correct, "total": answered } },
        "certificationProgress": { "ccna": { "correct": correct, "total": answered } },
    })
}

pub fn register_request(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "secret-pass",
        "displayName": "New Learner",
    })
}
