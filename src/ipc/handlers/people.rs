use crate::accounts;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup::repair_on_list;
use crate::ipc::helpers::{db_err, get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::roster::generate::split_subjects;
use crate::roster::repair;
use crate::roster::TeacherRecord;
use serde_json::{json, Value};

fn handle_students_list(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let grade_level = get_optional_str(&req.params, "gradeLevel");
    let section = get_optional_str(&req.params, "section");
    let students = match db::list_students(conn, grade_level.as_deref(), section.as_deref()) {
        Ok(v) => v,
        Err(e) => return db_err(e).response(&req.id),
    };
    let students = students
        .into_iter()
        .map(|s| {
            json!({
                "id": s.id,
                "username": s.username,
                "email": s.email,
                "firstName": s.first_name,
                "middleName": s.middle_name,
                "lastName": s.last_name,
                "gradeLevel": s.grade_level,
                "section": s.section,
                "qrPayload": s.qr_payload,
            })
        })
        .collect::<Vec<_>>();
    ok(&req.id, json!({ "students": students }))
}

// Stored rows may predate import-time repair. Listing repairs a display copy
// and never writes it back.
fn handle_teachers_list(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let teachers = match db::list_teachers(conn) {
        Ok(v) => v,
        Err(e) => return db_err(e).response(&req.id),
    };
    let repair_enabled = repair_on_list(conn);
    let teachers = teachers
        .into_iter()
        .map(|t| {
            let mut view = TeacherRecord {
                first_name: t.first_name,
                middle_name: t.middle_name,
                last_name: t.last_name,
                role: t.role,
                grade_level: t.grade_level,
                section: t.section,
                subjects: t.subjects,
                bio: t.bio,
                ..Default::default()
            };
            let decision = if repair_enabled {
                repair::repair_teacher(&mut view)
            } else {
                repair::Repair::NoChange
            };
            json!({
                "id": t.id,
                "username": t.username,
                "email": t.email,
                "firstName": view.first_name,
                "middleName": view.middle_name,
                "lastName": view.last_name,
                "role": view.role,
                "gradeLevel": view.grade_level,
                "section": view.section,
                "subjects": view.subjects,
                "bio": view.bio,
                "qrPayload": t.qr_payload,
                "repair": decision,
            })
        })
        .collect::<Vec<_>>();
    ok(&req.id, json!({ "teachers": teachers }))
}

fn handle_repair_preview(req: &Request) -> Value {
    let grade_level = get_optional_str(&req.params, "gradeLevel").unwrap_or_default();
    let section = get_optional_str(&req.params, "section").unwrap_or_default();
    let subjects = match req.params.get("subjects") {
        Some(Value::String(s)) => split_subjects(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let mut view = TeacherRecord {
        grade_level,
        section,
        subjects,
        ..Default::default()
    };
    let decision = repair::repair_teacher(&mut view);
    ok(
        &req.id,
        json!({
            "repair": decision,
            "gradeLevel": view.grade_level,
            "section": view.section,
            "subjects": view.subjects,
        }),
    )
}

fn handle_badge_verify(req: &Request) -> Value {
    let payload = match get_required_str(&req.params, "payload") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    match accounts::verify_qr_payload(&payload) {
        Some(id) => ok(&req.id, json!({ "valid": true, "id": id })),
        None => ok(&req.id, json!({ "valid": false })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "repair.preview" => Some(handle_repair_preview(req)),
        "badge.verify" => Some(handle_badge_verify(req)),
        _ => None,
    }
}
