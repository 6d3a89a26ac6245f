use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preference values are plain strings; anything else stored under
/// `preferences` fails to decode.
pub type Preferences = HashMap<String, String>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,  // unique
    /// Password hash, never the clear text
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub preferences: HashMap<String, String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            name: user.name,
            email: user.email,
            preferences: user.preferences.unwrap_or_default(),
        }
    }
}
