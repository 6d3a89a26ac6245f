use serde::{Deserialize, Serialize};

/// Row of the most-active-commenters report. Built from the `$group` stage
/// output (`{_id: <email>, count: <n>}`), never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critic {
    #[serde(rename(deserialize = "_id"))]
    pub email: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document};

    #[test]
    fn decodes_group_output_and_serializes_as_email() {
        let critic: Critic = from_document(doc! { "_id": "carol@example.com", "count": 20_i64 }).unwrap();
        assert_eq!(critic.email, "carol@example.com");
        assert_eq!(critic.count, 20);

        let json = serde_json::to_value(&critic).unwrap();
        assert_eq!(json["email"], "carol@example.com");
    }

    #[test]
    fn accepts_int32_counts() {
        let critic: Critic = from_document(doc! { "_id": "bob@example.com", "count": 3_i32 }).unwrap();
        assert_eq!(critic.count, 3);
    }
}
