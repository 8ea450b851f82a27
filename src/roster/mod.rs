//! Bulk roster ingestion.
//!
//! Raw upload bytes go through tokenize, canonicalize, derive, repair and
//! validate in one synchronous pass. Nothing here touches storage; callers
//! persist an accepted `ImportBatch` themselves and must not persist anything
//! from a rejected upload.

pub mod error;
pub mod generate;
pub mod headers;
pub mod record;
pub mod repair;
pub mod tokenizer;
pub mod validate;

pub use error::IngestError;
pub use record::{
    ImportBatch, ImportKind, IngestOutcome, StudentRecord, TeacherRecord, TeacherRole,
    ValidationError, ValidationReport,
};
pub use repair::Repair;

use record::CanonicalRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Written into records that leave Password blank.
    pub default_password: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            default_password: generate::DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Everything the pipeline produced, before the accept/reject decision.
#[derive(Clone, Debug)]
pub struct Prepared {
    /// Records after derivation and repair, in source order.
    pub records: ImportBatch,
    pub report: ValidationReport,
    /// Data rows that carried no first or last name and were skipped.
    pub dropped_rows: Vec<usize>,
    /// Repair decisions that changed a teacher record, keyed by row.
    pub repairs: Vec<(usize, Repair)>,
}

impl Prepared {
    pub fn into_outcome(self) -> IngestOutcome {
        if self.report.is_valid {
            IngestOutcome::Accepted(self.records)
        } else {
            IngestOutcome::Rejected(self.report)
        }
    }
}

fn canonical_rows(text: &str) -> Result<Vec<CanonicalRecord>, IngestError> {
    let rows = tokenizer::tokenize(text)?;
    let mut iter = rows.iter();
    let header = iter.next().ok_or(IngestError::NoDataRows)?;
    let fields = headers::canonicalize_headers(header);
    Ok(iter
        .enumerate()
        .map(|(i, row)| headers::zip_record(&fields, row, i + 1))
        .collect())
}

pub fn prepare(bytes: &[u8], kind: ImportKind, opts: &ImportOptions) -> Result<Prepared, IngestError> {
    let text = tokenizer::decode(bytes);
    let rows = canonical_rows(&text)?;
    let total = rows.len();
    let mut dropped_rows = Vec::new();
    let mut repairs = Vec::new();

    let (records, report) = match kind {
        ImportKind::Student => {
            let mut students = Vec::with_capacity(total);
            for rec in rows.into_iter().map(StudentRecord::from_canonical) {
                if rec.is_nameless() {
                    dropped_rows.push(rec.row);
                    continue;
                }
                students.push(rec);
            }
            for rec in students.iter_mut() {
                generate::fill_student(rec, &opts.default_password);
            }
            let report = validate::validate_students(&students);
            (ImportBatch::Students(students), report)
        }
        ImportKind::Teacher => {
            let mut teachers = Vec::with_capacity(total);
            for rec in rows.into_iter().map(TeacherRecord::from_canonical) {
                if rec.is_nameless() {
                    dropped_rows.push(rec.row);
                    continue;
                }
                teachers.push(rec);
            }
            for rec in teachers.iter_mut() {
                generate::fill_teacher(rec, &opts.default_password);
                let decision = repair::repair_teacher(rec);
                if decision.is_change() {
                    tracing::debug!(row = rec.row, ?decision, "repaired teacher columns");
                    repairs.push((rec.row, decision));
                }
            }
            let report = validate::validate_teachers(&teachers);
            (ImportBatch::Teachers(teachers), report)
        }
    };

    if !dropped_rows.is_empty() {
        tracing::debug!(?dropped_rows, "skipped rows without first or last name");
    }
    tracing::info!(
        kind = kind.as_str(),
        rows = total,
        kept = records.len(),
        errors = report.errors.len(),
        "roster prepared"
    );

    Ok(Prepared {
        records,
        report,
        dropped_rows,
        repairs,
    })
}

/// Runs the whole pipeline. The only `Err` is a structural failure; content
/// problems come back as `IngestOutcome::Rejected`.
pub fn ingest(bytes: &[u8], kind: ImportKind, opts: &ImportOptions) -> Result<IngestOutcome, IngestError> {
    prepare(bytes, kind, opts).map(Prepared::into_outcome)
}
