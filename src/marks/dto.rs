use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::marks::repo_types::{MarkSheet, Subject};

/// Slider values from the marks form.
#[derive(Debug, Deserialize)]
pub struct SubmitMarksRequest {
    pub marks: BTreeMap<Subject, i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitMarksResponse {
    pub message: String,
    pub marks: MarkSheet,
}
