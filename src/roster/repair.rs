use super::record::TeacherRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Lowercase fragments that identify a subject name typed into Grade Level.
/// `math` covers the common short form, which `mathematics` cannot match as a
/// substring.
pub const SUBJECT_KEYWORDS: &[&str] = &[
    "filipino",
    "english",
    "mathematics",
    "math",
    "science",
    "makabansa",
    "gmrc",
    "mapeh",
    "araling panlipunan",
    "edukasyon sa pagpapakatao",
    "arpan",
    "mother tongue",
];

/// Section written when a subject swap leaves no trustworthy section.
pub const UNKNOWN_SECTION: &str = "unknown";

static GRADE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:grade\s+\d+|kindergarten|\d+)$").expect("grade pattern")
});

/// Outcome of inspecting a teacher's grade/section pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repair {
    NoChange,
    /// Grade Level held a subject and Section held the grade.
    SubjectSwap { subject: String, grade: String },
    /// Grade Level and Section were exchanged.
    PlainSwap { grade: String, section: String },
}

pub fn is_subject_name(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    !lower.is_empty() && SUBJECT_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn looks_like_grade(value: &str) -> bool {
    GRADE_LIKE.is_match(&value.trim().to_lowercase())
}

/// Subject detection wins over the plain swap when both would fire.
pub fn diagnose(grade_level: &str, section: &str) -> Repair {
    if is_subject_name(grade_level) {
        return Repair::SubjectSwap {
            subject: grade_level.to_string(),
            grade: section.to_string(),
        };
    }
    if looks_like_grade(section) {
        return Repair::PlainSwap {
            grade: section.to_string(),
            section: grade_level.to_string(),
        };
    }
    Repair::NoChange
}

impl Repair {
    pub fn is_change(&self) -> bool {
        !matches!(self, Repair::NoChange)
    }

    pub fn apply(&self, rec: &mut TeacherRecord) {
        match self {
            Repair::NoChange => {}
            Repair::SubjectSwap { subject, grade } => {
                rec.grade_level = grade.clone();
                rec.section = UNKNOWN_SECTION.to_string();
                let known = rec
                    .subjects
                    .iter()
                    .any(|s| s.trim().eq_ignore_ascii_case(subject.trim()));
                if !known {
                    rec.subjects.push(subject.clone());
                }
            }
            Repair::PlainSwap { grade, section } => {
                rec.grade_level = grade.clone();
                rec.section = section.clone();
            }
        }
    }
}

/// Diagnoses and applies in one step, returning the decision taken.
pub fn repair_teacher(rec: &mut TeacherRecord) -> Repair {
    let decision = diagnose(&rec.grade_level, &rec.section);
    decision.apply(rec);
    decision
}
