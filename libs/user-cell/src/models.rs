use serde::Serialize;

use shared_database::UpdateResult;

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct UpsertUserResponse {
    pub result: UpdateResult,
    pub token: String,
}

/// Fields a caller may never write through the profile upsert.
pub const PROTECTED_USER_FIELDS: [&str; 2] = ["_id", "role"];
