use super::record::{StudentRecord, TeacherRecord};

pub const EMAIL_DOMAIN: &str = "@wmsu.edu.ph";

/// Placeholder credential for accounts created without one. Accounts created
/// with it are flagged to change it on first sign-in.
pub const DEFAULT_PASSWORD: &str = "wmsu2024";

fn local_part(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

pub fn generate_username(first: &str, last: &str) -> String {
    format!("{}.{}", local_part(first), local_part(last))
}

pub fn generate_email(first: &str, last: &str) -> String {
    format!("{}{}", generate_username(first, last), EMAIL_DOMAIN)
}

/// Fills blank email, username and password. Supplied values are kept.
pub fn fill_student(rec: &mut StudentRecord, default_password: &str) {
    if rec.email.trim().is_empty() {
        rec.email = generate_email(&rec.first_name, &rec.last_name);
    }
    if rec.username.trim().is_empty() {
        rec.username = generate_username(&rec.first_name, &rec.last_name);
    }
    if rec.password.trim().is_empty() {
        rec.password = default_password.to_string();
    }
}

/// Fills blank username and password. Email is left alone: teacher accounts
/// need one supplied by the file.
pub fn fill_teacher(rec: &mut TeacherRecord, default_password: &str) {
    if rec.username.trim().is_empty() {
        rec.username = generate_username(&rec.first_name, &rec.last_name);
    }
    if rec.password.trim().is_empty() {
        rec.password = default_password.to_string();
    }
}

/// Splits on `;` or `,`. Order and duplicates are kept.
pub fn split_subjects(text: &str) -> Vec<String> {
    text.split(|c| c == ';' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
