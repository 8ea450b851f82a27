use crate::accounts;
use crate::roster::{StudentRecord, TeacherRecord};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "rosterd.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts(
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            kind TEXT NOT NULL,
            must_change_password INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            grade_level TEXT NOT NULL,
            section TEXT NOT NULL,
            parent_email TEXT NOT NULL,
            parent_contact TEXT NOT NULL,
            qr_payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_grade_section ON students(grade_level, section)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            grade_level TEXT NOT NULL,
            section TEXT NOT NULL,
            subjects_json TEXT NOT NULL,
            bio TEXT NOT NULL,
            qr_payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(
            serde_json::from_str(&s).with_context(|| format!("setting {} is invalid JSON", key))?,
        )),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn create_account(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    kind: &str,
    now: &str,
) -> anyhow::Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    let cred = accounts::hash_password(password);
    conn.execute(
        "INSERT INTO accounts(id, username, email, password_hash, password_salt, kind, must_change_password, created_at)
         VALUES(?, ?, ?, ?, ?, ?, 1, ?)",
        params![id, username.trim(), email.trim(), cred.hash, cred.salt, kind, now],
    )
    .with_context(|| format!("failed to create account {}", username.trim()))?;
    Ok(id)
}

/// Creates the account and profile for one student atomically. Returns the
/// profile id.
pub fn insert_student(conn: &mut Connection, rec: &StudentRecord) -> anyhow::Result<String> {
    let now = now_rfc3339();
    let sp = conn.savepoint()?;
    let account_id = create_account(&sp, &rec.username, &rec.email, &rec.password, "student", &now)?;
    let id = uuid::Uuid::new_v4().to_string();
    let qr = accounts::qr_payload(&id, "student", &rec.display_name());
    sp.execute(
        "INSERT INTO students(id, account_id, first_name, middle_name, last_name, grade_level, section, parent_email, parent_contact, qr_payload, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            account_id,
            rec.first_name.trim(),
            rec.middle_name.trim(),
            rec.last_name.trim(),
            rec.grade_level.trim(),
            rec.section.trim(),
            rec.parent_email.trim(),
            rec.parent_contact.trim(),
            qr,
            now,
            now
        ],
    )
    .context("failed to insert student")?;
    sp.commit()?;
    Ok(id)
}

pub fn insert_teacher(conn: &mut Connection, rec: &TeacherRecord) -> anyhow::Result<String> {
    let now = now_rfc3339();
    let role = rec.role().map(|r| r.as_str()).unwrap_or("subject_teacher");
    let sp = conn.savepoint()?;
    let account_id = create_account(&sp, &rec.username, &rec.email, &rec.password, "teacher", &now)?;
    let id = uuid::Uuid::new_v4().to_string();
    let qr = accounts::qr_payload(&id, "teacher", &rec.display_name());
    sp.execute(
        "INSERT INTO teachers(id, account_id, first_name, middle_name, last_name, role, grade_level, section, subjects_json, bio, qr_payload, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            account_id,
            rec.first_name.trim(),
            rec.middle_name.trim(),
            rec.last_name.trim(),
            role,
            rec.grade_level.trim(),
            rec.section.trim(),
            serde_json::to_string(&rec.subjects)?,
            rec.bio.trim(),
            qr,
            now,
            now
        ],
    )
    .context("failed to insert teacher")?;
    sp.commit()?;
    Ok(id)
}

#[derive(Clone, Debug)]
pub struct StoredStudent {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub grade_level: String,
    pub section: String,
    pub qr_payload: String,
}

#[derive(Clone, Debug)]
pub struct StoredTeacher {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub role: String,
    pub grade_level: String,
    pub section: String,
    pub subjects: Vec<String>,
    pub bio: String,
    pub qr_payload: String,
}

pub fn list_students(
    conn: &Connection,
    grade_level: Option<&str>,
    section: Option<&str>,
) -> anyhow::Result<Vec<StoredStudent>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, a.username, a.email, s.first_name, s.middle_name, s.last_name, s.grade_level, s.section, s.qr_payload
         FROM students s
         JOIN accounts a ON a.id = s.account_id
         WHERE (?1 IS NULL OR lower(s.grade_level) = lower(?1))
           AND (?2 IS NULL OR lower(s.section) = lower(?2))
         ORDER BY s.last_name, s.first_name",
    )?;
    let rows = stmt
        .query_map(params![grade_level, section], |r| {
            Ok(StoredStudent {
                id: r.get(0)?,
                username: r.get(1)?,
                email: r.get(2)?,
                first_name: r.get(3)?,
                middle_name: r.get(4)?,
                last_name: r.get(5)?,
                grade_level: r.get(6)?,
                section: r.get(7)?,
                qr_payload: r.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_teachers(conn: &Connection) -> anyhow::Result<Vec<StoredTeacher>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, a.username, a.email, t.first_name, t.middle_name, t.last_name, t.role, t.grade_level, t.section, t.subjects_json, t.bio, t.qr_payload
         FROM teachers t
         JOIN accounts a ON a.id = t.account_id
         ORDER BY t.last_name, t.first_name",
    )?;
    let rows = stmt
        .query_map([], |r| {
            let subjects_json: String = r.get(9)?;
            Ok(StoredTeacher {
                id: r.get(0)?,
                username: r.get(1)?,
                email: r.get(2)?,
                first_name: r.get(3)?,
                middle_name: r.get(4)?,
                last_name: r.get(5)?,
                role: r.get(6)?,
                grade_level: r.get(7)?,
                section: r.get(8)?,
                subjects: serde_json::from_str(&subjects_json).unwrap_or_default(),
                bio: r.get(10)?,
                qr_payload: r.get(11)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
