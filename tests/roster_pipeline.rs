#[path = "../src/roster/mod.rs"]
mod roster;

use roster::{
    ImportBatch, ImportKind, ImportOptions, IngestError, IngestOutcome, Repair, StudentRecord,
    ValidationError,
};

const STUDENT_HEADER: &str = "First Name,Last Name,Email,Grade Level,Section";

fn run(text: &str, kind: ImportKind) -> IngestOutcome {
    roster::ingest(text.as_bytes(), kind, &ImportOptions::default()).expect("ingest")
}

fn students(outcome: IngestOutcome) -> Vec<StudentRecord> {
    match outcome {
        IngestOutcome::Accepted(ImportBatch::Students(v)) => v,
        other => panic!("expected accepted students, got {:?}", other),
    }
}

#[test]
fn student_scenario_generates_email_and_username() {
    let out = students(run(
        &format!("{STUDENT_HEADER}\nJuan,Dela Cruz,,Grade 3,Wisdom"),
        ImportKind::Student,
    ));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].email, "juan.delacruz@wmsu.edu.ph");
    assert_eq!(out[0].username, "juan.delacruz");
    assert_eq!(out[0].grade_level, "Grade 3");
    assert_eq!(out[0].section, "Wisdom");
}

#[test]
fn nameless_row_is_silently_dropped() {
    let outcome = run(
        &format!("{STUDENT_HEADER}\n,,X,grade 9,Wisdom"),
        ImportKind::Student,
    );
    let report = outcome.report();
    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert_eq!(outcome.batch().map(|b| b.len()), Some(0));
}

#[test]
fn rerunning_on_own_output_changes_nothing() {
    let first = students(run(
        &format!("{STUDENT_HEADER}\nAna,Reyes,,Grade 1,Rose\nBen,Cruz,ben@wmsu.edu.ph,Grade 2,Lily"),
        ImportKind::Student,
    ));
    let rendered = first
        .iter()
        .map(|s| {
            format!(
                "{},{},{},{},{},{},{}",
                s.first_name, s.last_name, s.email, s.username, s.password, s.grade_level, s.section
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let second = students(run(
        &format!("First Name,Last Name,Email,Username,Password,Grade Level,Section\n{rendered}"),
        ImportKind::Student,
    ));
    assert_eq!(first, second);
    assert_eq!(second[1].email, "ben@wmsu.edu.ph");
}

#[test]
fn validation_errors_address_source_rows() {
    let text = format!(
        "{STUDENT_HEADER}\nAna,Reyes,,Grade 1,Rose\nBen,,,Grade 1,Rose\nCara,Lim,cara@gmail.com,,Rose"
    );
    let IngestOutcome::Rejected(report) = run(&text, ImportKind::Student) else {
        panic!("expected rejection");
    };
    assert_eq!(
        report.errors,
        vec![
            ValidationError::new(2, "Last Name is required"),
            ValidationError::new(3, "Email must use the @wmsu.edu.ph domain"),
            ValidationError::new(3, "Grade Level is required"),
        ]
    );
    assert_eq!(report.errors_for_row(1).count(), 0);
}

#[test]
fn tab_file_with_quoted_commas() {
    let text = "First Name\tLast Name\tGrade Level\tSection\n\"Maria, Jr.\"\tSantos\t2\t\"Rose, A\"\n";
    let out = students(run(text, ImportKind::Student));
    assert_eq!(out[0].first_name, "Maria, Jr.");
    assert_eq!(out[0].section, "Rose, A");
}

#[test]
fn unknown_columns_are_carried_through() {
    let text = "First Name,Last Name,Grade Level,Section,LRN,Created At\nAna,Reyes,Grade 1,Rose,1234,2024-06-01\n";
    let out = students(run(text, ImportKind::Student));
    assert_eq!(out[0].extra.get("LRN").map(String::as_str), Some("1234"));
    assert_eq!(
        out[0].extra.get("createdAt").map(String::as_str),
        Some("2024-06-01")
    );
}

#[test]
fn short_rows_degrade_to_blank_fields() {
    let IngestOutcome::Rejected(report) = run(&format!("{STUDENT_HEADER}\nAna,Reyes"), ImportKind::Student)
    else {
        panic!("expected rejection");
    };
    let messages = report.errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>();
    assert_eq!(messages, vec!["Grade Level is required", "Section is required"]);
}

#[test]
fn teacher_import_splits_subjects_and_checks_rules() {
    let text = "First Name,Last Name,Email,Password,Role,Grade Level,Section,Subjects\n\
                Jose,Rizal,jose@school.ph,pw,Adviser,Grade 4,Rose,\"English; Math, English\"\n\
                Andres,Bonifacio,,,principal,grade 8,Lily,\n";
    let IngestOutcome::Rejected(report) = run(text, ImportKind::Teacher) else {
        panic!("expected rejection");
    };
    let row2 = report
        .errors_for_row(2)
        .map(|e| e.message.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        row2,
        vec![
            "Email is required".to_string(),
            r#"Invalid role "principal". Must be "adviser" or "subject_teacher""#.to_string(),
            r#"Invalid grade level "grade 8". Use Kindergarten or Grade 1-6; put subject names in the Subjects column"#.to_string(),
        ]
    );
    assert_eq!(report.errors_for_row(1).count(), 0);
}

#[test]
fn teacher_without_password_gets_the_default() {
    let text = "First Name,Last Name,Email,Grade Level,Section\nJose,Rizal,jose@school.ph,Grade 4,Rose";
    let outcome = run(text, ImportKind::Teacher);
    let Some(ImportBatch::Teachers(teachers)) = outcome.batch() else {
        panic!("expected accepted teachers: {:?}", outcome);
    };
    assert_eq!(teachers[0].password, roster::generate::DEFAULT_PASSWORD);
    assert_eq!(teachers[0].username, "jose.rizal");
}

#[test]
fn teacher_blank_configured_default_still_fails_password_rule() {
    let text = "First Name,Last Name,Email,Grade Level,Section\nJose,Rizal,jose@school.ph,Grade 4,Rose";
    let opts = ImportOptions {
        default_password: String::new(),
    };
    let IngestOutcome::Rejected(report) =
        roster::ingest(text.as_bytes(), ImportKind::Teacher, &opts).expect("ingest")
    else {
        panic!("expected rejection");
    };
    assert_eq!(report.errors, vec![ValidationError::new(1, "Password is required")]);
}

#[test]
fn teacher_subjects_keep_order_and_duplicates() {
    let text = "First Name,Last Name,Email,Password,Grade Level,Section,Subjects\n\
                Jose,Rizal,jose@school.ph,pw,Grade 4,Rose,\"English; Math, English\"\n";
    let outcome = run(text, ImportKind::Teacher);
    let Some(ImportBatch::Teachers(teachers)) = outcome.batch() else {
        panic!("expected teachers: {:?}", outcome);
    };
    assert_eq!(teachers[0].subjects, vec!["English", "Math", "English"]);
}

#[test]
fn teacher_repair_precedence_in_pipeline() {
    let text = "First Name,Last Name,Email,Password,Grade Level,Section\n\
                Jose,Rizal,jose@school.ph,pw,Filipino,Grade 3\n\
                Emilio,Aguinaldo,emilio@school.ph,pw,Sampaguita,Grade 5\n";
    let prepared =
        roster::prepare(text.as_bytes(), ImportKind::Teacher, &ImportOptions::default()).expect("prepare");
    assert!(prepared.report.is_valid, "{:?}", prepared.report);
    assert_eq!(
        prepared.repairs,
        vec![
            (
                1,
                Repair::SubjectSwap {
                    subject: "Filipino".to_string(),
                    grade: "Grade 3".to_string()
                }
            ),
            (
                2,
                Repair::PlainSwap {
                    grade: "Grade 5".to_string(),
                    section: "Sampaguita".to_string()
                }
            ),
        ]
    );
}

#[test]
fn structural_failures() {
    assert_eq!(
        roster::ingest(b"First Name,Last Name\n\n", ImportKind::Student, &ImportOptions::default()),
        Err(IngestError::NoDataRows)
    );
    assert!(matches!(
        ImportKind::parse("parent"),
        Err(IngestError::UnknownKind(_))
    ));
    assert_eq!(ImportKind::parse(" Teacher "), Ok(ImportKind::Teacher));
}

#[test]
fn invalid_utf8_does_not_fail() {
    let mut bytes = b"First Name,Last Name,Grade Level,Section\nAn".to_vec();
    bytes.push(0xff);
    bytes.extend_from_slice(b"a,Reyes,Grade 1,Rose\n");
    let outcome = roster::ingest(&bytes, ImportKind::Student, &ImportOptions::default()).expect("ingest");
    let out = students(outcome);
    assert_eq!(out[0].first_name, "An\u{fffd}a");
}
