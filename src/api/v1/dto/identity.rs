/*
 * Responsibility
 * - response shape of the identity endpoints
 */
use serde::{Deserialize, Serialize};

use crate::services::identity::ResolvedIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub login_name: String,
    pub user_id: i64,
    pub client_id: i64,
}

impl From<ResolvedIdentity> for IdentityResponse {
    fn from(id: ResolvedIdentity) -> Self {
        Self {
            login_name: id.login_name,
            user_id: id.user_id,
            client_id: id.client_id,
        }
    }
}
