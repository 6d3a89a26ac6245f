use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Login session (stored in the `sessions` collection, one per token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub jwt: String,
}
