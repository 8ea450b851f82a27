use super::error::IngestError;
use super::generate::split_subjects;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Student,
    Teacher,
}

impl ImportKind {
    pub fn parse(s: &str) -> Result<Self, IngestError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(ImportKind::Student),
            "teacher" => Ok(ImportKind::Teacher),
            _ => Err(IngestError::UnknownKind(s.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Student => "student",
            ImportKind::Teacher => "teacher",
        }
    }
}

/// One data row keyed by canonical field name.
///
/// `row` is the 1-based position among data rows (header excluded) and is
/// fixed before any row is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl CanonicalRecord {
    #[allow(dead_code)]
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub row: usize,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub grade_level: String,
    pub section: String,
    pub parent_email: String,
    pub parent_contact: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Columns outside the record shape, keyed by their header text.
    pub extra: BTreeMap<String, String>,
}

impl StudentRecord {
    pub fn from_canonical(mut rec: CanonicalRecord) -> Self {
        StudentRecord {
            row: rec.row,
            first_name: rec.take("firstName"),
            middle_name: rec.take("middleName"),
            last_name: rec.take("lastName"),
            username: rec.take("username"),
            email: rec.take("email"),
            grade_level: rec.take("gradeLevel"),
            section: rec.take("section"),
            parent_email: rec.take("parentEmail"),
            parent_contact: rec.take("parentContact"),
            password: rec.take("password"),
            extra: rec.fields,
        }
    }

    pub fn is_nameless(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherRole {
    Adviser,
    SubjectTeacher,
}

const TEACHER_ROLES: &[(&str, TeacherRole)] = &[
    ("adviser", TeacherRole::Adviser),
    ("subject_teacher", TeacherRole::SubjectTeacher),
];

impl TeacherRole {
    /// Exact match against the lowercased input.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        TEACHER_ROLES
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, role)| *role)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeacherRole::Adviser => "adviser",
            TeacherRole::SubjectTeacher => "subject_teacher",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub row: usize,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub grade_level: String,
    pub section: String,
    pub subjects: Vec<String>,
    pub bio: String,
    pub extra: BTreeMap<String, String>,
}

impl TeacherRecord {
    pub fn from_canonical(mut rec: CanonicalRecord) -> Self {
        let subjects = split_subjects(&rec.take("subjects"));
        TeacherRecord {
            row: rec.row,
            first_name: rec.take("firstName"),
            middle_name: rec.take("middleName"),
            last_name: rec.take("lastName"),
            username: rec.take("username"),
            email: rec.take("email"),
            password: rec.take("password"),
            role: rec.take("role"),
            grade_level: rec.take("gradeLevel"),
            section: rec.take("section"),
            subjects,
            bio: rec.take("bio"),
            extra: rec.fields,
        }
    }

    /// Blank roles fall back to subject teacher; unknown text is `None`.
    pub fn role(&self) -> Option<TeacherRole> {
        if self.role.trim().is_empty() {
            return Some(TeacherRole::SubjectTeacher);
        }
        TeacherRole::parse(&self.role)
    }

    pub fn is_nameless(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

fn display_name(first: &str, middle: &str, last: &str) -> String {
    [first, middle, last]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub row: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        ValidationError {
            row,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    #[allow(dead_code)]
    pub fn errors_for_row(&self, row: usize) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.row == row)
    }
}

/// Records that passed validation, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImportBatch {
    Students(Vec<StudentRecord>),
    Teachers(Vec<TeacherRecord>),
}

impl ImportBatch {
    pub fn kind(&self) -> ImportKind {
        match self {
            ImportBatch::Students(_) => ImportKind::Student,
            ImportBatch::Teachers(_) => ImportKind::Teacher,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ImportBatch::Students(v) => v.len(),
            ImportBatch::Teachers(v) => v.len(),
        }
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted(ImportBatch),
    Rejected(ValidationReport),
}

impl IngestOutcome {
    #[allow(dead_code)]
    pub fn report(&self) -> ValidationReport {
        match self {
            IngestOutcome::Accepted(_) => ValidationReport::from_errors(Vec::new()),
            IngestOutcome::Rejected(report) => report.clone(),
        }
    }

    #[allow(dead_code)]
    pub fn batch(&self) -> Option<&ImportBatch> {
        match self {
            IngestOutcome::Accepted(batch) => Some(batch),
            IngestOutcome::Rejected(_) => None,
        }
    }
}
