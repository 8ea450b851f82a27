use crate::db;
use crate::ipc::error::{err, ingest_err, ok};
use crate::ipc::handlers::setup::import_options;
use crate::ipc::helpers::{parse_kind, read_upload};
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, ImportBatch, ImportOptions, IngestOutcome};
use serde_json::{json, Value};

fn handle_preview(state: &mut AppState, req: &Request) -> Value {
    let kind = match parse_kind(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let bytes = match read_upload(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let opts = state
        .db
        .as_ref()
        .map(import_options)
        .unwrap_or_default();

    let prepared = match roster::prepare(&bytes, kind, &opts) {
        Ok(p) => p,
        Err(e) => return ingest_err(&req.id, &e),
    };
    let repairs = prepared
        .repairs
        .iter()
        .map(|(row, decision)| json!({ "row": row, "repair": decision }))
        .collect::<Vec<_>>();

    ok(
        &req.id,
        json!({
            "kind": kind,
            "isValid": prepared.report.is_valid,
            "errors": prepared.report.errors,
            "rowsParsed": prepared.records.len() + prepared.dropped_rows.len(),
            "rowsDropped": prepared.dropped_rows.len(),
            "repairs": repairs,
            "records": prepared.records,
        }),
    )
}

fn handle_import(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let kind = match parse_kind(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let bytes = match read_upload(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let opts: ImportOptions = import_options(conn);

    let batch = match roster::ingest(&bytes, kind, &opts) {
        Ok(IngestOutcome::Accepted(batch)) => batch,
        Ok(IngestOutcome::Rejected(report)) => {
            tracing::info!(
                kind = kind.as_str(),
                errors = report.errors.len(),
                "roster rejected"
            );
            return err(
                &req.id,
                "validation_failed",
                format!("{} validation error(s); nothing was imported", report.errors.len()),
                Some(json!(report)),
            );
        }
        Err(e) => return ingest_err(&req.id, &e),
    };

    let mut results = Vec::with_capacity(batch.len());
    let mut created = 0usize;
    let mut failed = 0usize;
    let mut record_result = |row: usize, name: String, res: anyhow::Result<String>| match res {
        Ok(id) => {
            created += 1;
            results.push(json!({ "row": row, "ok": true, "id": id, "name": name }));
        }
        Err(e) => {
            failed += 1;
            tracing::warn!(row, error = %format!("{e:#}"), "record not imported");
            results.push(json!({ "row": row, "ok": false, "name": name, "message": format!("{e:#}") }));
        }
    };

    match &batch {
        ImportBatch::Students(students) => {
            for rec in students {
                record_result(rec.row, rec.display_name(), db::insert_student(conn, rec));
            }
        }
        ImportBatch::Teachers(teachers) => {
            for rec in teachers {
                record_result(rec.row, rec.display_name(), db::insert_teacher(conn, rec));
            }
        }
    }

    tracing::info!(kind = batch.kind().as_str(), created, failed, "roster imported");
    ok(
        &req.id,
        json!({
            "kind": kind,
            "created": created,
            "failed": failed,
            "results": results,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "roster.preview" => Some(handle_preview(state, req)),
        "roster.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
