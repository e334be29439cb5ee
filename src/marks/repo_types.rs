use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_MARKS: u8 = 100;

/// Subjects on the marks form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subject {
    Maths,
    Science,
    English,
    Hindi,
    History,
    Civics,
    Geography,
}

impl Subject {
    pub const ALL: [Subject; 7] = [
        Subject::Maths,
        Subject::Science,
        Subject::English,
        Subject::Hindi,
        Subject::History,
        Subject::Civics,
        Subject::Geography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Maths => "Maths",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::Hindi => "Hindi",
            Subject::History => "History",
            Subject::Civics => "Civics",
            Subject::Geography => "Geography",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .iter()
            .copied()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| format!("unknown subject {:?}", s))
    }
}

/// One (Subject, Marks) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRow {
    pub subject: Subject,
    pub marks: u8,
}

/// A user's marks table, rows in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct MarkSheet {
    rows: Vec<MarkRow>,
}

impl MarkSheet {
    pub fn new(rows: Vec<MarkRow>) -> Self {
        Self { rows }
    }

    /// One row per subject in form order; absent subjects score 0.
    pub fn from_scores(scores: &BTreeMap<Subject, i64>) -> Result<Self, AppError> {
        let mut rows = Vec::with_capacity(Subject::ALL.len());
        for subject in Subject::ALL {
            let raw = scores.get(&subject).copied().unwrap_or(0);
            let marks = u8::try_from(raw)
                .ok()
                .filter(|&m| m <= MAX_MARKS)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Marks for {} must be between 0 and {}",
                        subject, MAX_MARKS
                    ))
                })?;
            rows.push(MarkRow { subject, marks });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MarkRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn score(&self, subject: Subject) -> Option<u8> {
        self.rows
            .iter()
            .find(|row| row.subject == subject)
            .map(|row| row.marks)
    }

    /// Pairs as a map, for order-independent comparisons.
    pub fn to_map(&self) -> BTreeMap<Subject, u8> {
        self.rows.iter().map(|r| (r.subject, r.marks)).collect()
    }
}
