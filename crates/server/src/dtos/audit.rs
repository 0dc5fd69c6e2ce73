use database::services::audit::Violation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViolationResponse {
    pub kind: String,
    pub message: String,
    pub lessons: Vec<Uuid>,
    pub class_id: Option<Uuid>,
}

impl From<Violation> for ViolationResponse {
    fn from(violation: Violation) -> Self {
        Self {
            kind: violation.kind().to_string(),
            message: violation.to_string(),
            lessons: violation.lessons(),
            class_id: violation.class_id(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditResponse {
    pub healthy: bool,
    pub violations: Vec<ViolationResponse>,
}
