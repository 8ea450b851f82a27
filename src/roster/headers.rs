use super::record::CanonicalRecord;
use super::tokenizer::RawRow;
use std::collections::BTreeMap;

/// Display header -> canonical field. Matching is exact (case and wording).
pub const HEADER_MAP: &[(&str, &str)] = &[
    ("First Name", "firstName"),
    ("Middle Name", "middleName"),
    ("Last Name", "lastName"),
    ("Username", "username"),
    ("Email", "email"),
    ("Password", "password"),
    ("Role", "role"),
    ("Subjects", "subjects"),
    ("Grade Level", "gradeLevel"),
    ("Section", "section"),
    ("Created At", "createdAt"),
    ("Updated At", "updatedAt"),
    ("Parent Email", "parentEmail"),
    ("Parent Contact", "parentContact"),
    ("Bio", "bio"),
];

/// Unknown headers pass through verbatim.
pub fn canonical_field(header: &str) -> &str {
    HEADER_MAP
        .iter()
        .find(|(label, _)| *label == header)
        .map(|(_, field)| *field)
        .unwrap_or(header)
}

pub fn canonicalize_headers(header_row: &RawRow) -> Vec<String> {
    header_row
        .iter()
        .map(|h| canonical_field(h).to_string())
        .collect()
}

/// Zips a data row against the canonical header list.
///
/// Short rows pad with "", surplus fields are ignored, and a repeated
/// canonical name keeps the later column.
pub fn zip_record(fields: &[String], row: &RawRow, row_number: usize) -> CanonicalRecord {
    let mut out = BTreeMap::new();
    for (i, name) in fields.iter().enumerate() {
        let value = row.get(i).cloned().unwrap_or_default();
        out.insert(name.clone(), value);
    }
    CanonicalRecord {
        row: row_number,
        fields: out,
    }
}
