use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Salted SHA-256 of an account password, both hex encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub salt: String,
    pub hash: String,
}

pub fn hash_password(password: &str) -> Credential {
    let salt = Uuid::new_v4().simple().to_string();
    let hash = hash_with_salt(&salt, password);
    Credential { salt, hash }
}

pub fn hash_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn payload_signature(id: &str, kind: &str, name: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(format!("{id}|{kind}|{name}").as_bytes()));
    digest[..16].to_string()
}

/// Text encoded into a person's identity badge. Rendering the image is the
/// host's job.
pub fn qr_payload(id: &str, kind: &str, name: &str) -> String {
    json!({
        "v": 1,
        "id": id,
        "kind": kind,
        "name": name,
        "sig": payload_signature(id, kind, name),
    })
    .to_string()
}

/// Checks that a scanned payload was produced by `qr_payload` and returns its id.
pub fn verify_qr_payload(payload: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(payload).ok()?;
    let id = v.get("id")?.as_str()?;
    let kind = v.get("kind")?.as_str()?;
    let name = v.get("name")?.as_str()?;
    let sig = v.get("sig")?.as_str()?;
    (payload_signature(id, kind, name) == sig).then(|| id.to_string())
}
