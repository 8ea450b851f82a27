use super::generate::EMAIL_DOMAIN;
use super::record::{StudentRecord, TeacherRecord, TeacherRole, ValidationError, ValidationReport};
use once_cell::sync::Lazy;
use regex::Regex;

pub const VALID_GRADES: &[&str] = &[
    "kindergarten",
    "grade 1",
    "grade 2",
    "grade 3",
    "grade 4",
    "grade 5",
    "grade 6",
];

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Lowercases, collapses whitespace, and turns a bare integer into `grade N`.
pub fn normalize_grade(value: &str) -> String {
    let collapsed = value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if !collapsed.is_empty() && collapsed.chars().all(|c| c.is_ascii_digit()) {
        return format!("grade {}", collapsed.trim_start_matches('0'));
    }
    collapsed
}

pub fn is_valid_grade(value: &str) -> bool {
    let normalized = normalize_grade(value);
    VALID_GRADES.iter().any(|g| *g == normalized)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value.trim())
}

pub fn student_errors(rec: &StudentRecord) -> Vec<ValidationError> {
    let row = rec.row;
    let mut errors = Vec::new();
    if blank(&rec.first_name) {
        errors.push(ValidationError::new(row, "First Name is required"));
    }
    if blank(&rec.last_name) {
        errors.push(ValidationError::new(row, "Last Name is required"));
    }
    if !blank(&rec.email) && !rec.email.contains(EMAIL_DOMAIN) {
        errors.push(ValidationError::new(
            row,
            format!("Email must use the {} domain", EMAIL_DOMAIN),
        ));
    }
    if blank(&rec.grade_level) {
        errors.push(ValidationError::new(row, "Grade Level is required"));
    }
    if blank(&rec.section) {
        errors.push(ValidationError::new(row, "Section is required"));
    }
    errors
}

pub fn teacher_errors(rec: &TeacherRecord) -> Vec<ValidationError> {
    let row = rec.row;
    let mut errors = Vec::new();
    if blank(&rec.first_name) {
        errors.push(ValidationError::new(row, "First Name is required"));
    }
    if blank(&rec.last_name) {
        errors.push(ValidationError::new(row, "Last Name is required"));
    }
    if blank(&rec.email) {
        errors.push(ValidationError::new(row, "Email is required"));
    }
    if blank(&rec.password) {
        errors.push(ValidationError::new(row, "Password is required"));
    }
    if !blank(&rec.email) && !is_valid_email(&rec.email) {
        errors.push(ValidationError::new(
            row,
            format!("Invalid email format: {}", rec.email.trim()),
        ));
    }
    if !blank(&rec.role) && TeacherRole::parse(&rec.role).is_none() {
        errors.push(ValidationError::new(
            row,
            format!(
                "Invalid role \"{}\". Must be \"adviser\" or \"subject_teacher\"",
                rec.role.trim()
            ),
        ));
    }
    if !blank(&rec.grade_level) && !is_valid_grade(&rec.grade_level) {
        errors.push(ValidationError::new(
            row,
            format!(
                "Invalid grade level \"{}\". Use Kindergarten or Grade 1-6; put subject names in the Subjects column",
                rec.grade_level.trim()
            ),
        ));
    }
    errors
}

pub fn validate_students(records: &[StudentRecord]) -> ValidationReport {
    ValidationReport::from_errors(records.iter().flat_map(student_errors).collect())
}

pub fn validate_teachers(records: &[TeacherRecord]) -> ValidationReport {
    ValidationReport::from_errors(records.iter().flat_map(teacher_errors).collect())
}
