// ==================== COMMENTS ====================
// Ownership is enforced by the store: update and delete carry the author
// email in the same filter as the _id, so the check and the write are one
// single-document operation.

use crate::{
    database::{durability::Operation, MongoDB, COMMENTS},
    models::Comment,
    utils::AppError,
};
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};

fn parse_comment_id(comment_id: &str) -> Option<ObjectId> {
    match ObjectId::parse_str(comment_id) {
        Ok(oid) => Some(oid),
        Err(e) => {
            log::debug!("Malformed comment id `{}`: {}", comment_id, e);
            None
        }
    }
}

/// Matches the comment only if `email` is its author.
pub fn owned_comment_filter(comment_id: ObjectId, email: &str) -> Document {
    doc! {
        "_id": comment_id,
        "email": email,
    }
}

fn text_update(text: &str, now: DateTime) -> Document {
    doc! {
        "$set": {
            "text": text,
            "date": now,
        }
    }
}

/// Comment with the given hex id. A malformed id is simply absent.
pub async fn get_comment(db: &MongoDB, comment_id: &str) -> Result<Option<Comment>, AppError> {
    let Some(oid) = parse_comment_id(comment_id) else {
        return Ok(None);
    };

    let comment = db
        .collection::<Comment>(COMMENTS)
        .find_one(doc! { "_id": oid })
        .await?;

    Ok(comment)
}

fn duplicate_comment(id: ObjectId, cause: &str) -> AppError {
    AppError::WriteConflict(format!("Comment {} already exists: {}", id.to_hex(), cause))
}

/// Inserts `comment` with majority write concern and hands it back.
pub async fn add_comment(db: &MongoDB, comment: Comment) -> Result<Comment, AppError> {
    let Some(id) = comment.id else {
        return Err(AppError::InvalidArgument("Comment must have an id".to_string()));
    };

    db.collection::<Comment>(COMMENTS)
        .insert_one(&comment)
        .with_options(Operation::AddComment.insert_options())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::WriteConflict(msg) => duplicate_comment(id, &msg),
            other => other,
        })?;

    log::info!("✅ Comment added for movie {} by {}", comment.movie_id, comment.email);

    Ok(comment)
}

/// Replaces the text of a comment owned by `email` and refreshes its date.
/// Returns false when the comment does not exist or belongs to someone else.
pub async fn update_comment(
    db: &MongoDB,
    comment_id: &str,
    text: &str,
    email: &str,
) -> Result<bool, AppError> {
    let Some(oid) = parse_comment_id(comment_id) else {
        return Ok(false);
    };

    let result = db
        .collection::<Document>(COMMENTS)
        .update_one(owned_comment_filter(oid, email), text_update(text, DateTime::now()))
        .with_options(Operation::UpdateComment.update_options())
        .await?;

    if result.matched_count != 1 {
        log::warn!(
            "⚠️ Not able to update comment `{}` for user `{}`: not the owner or no such comment",
            comment_id,
            email
        );
        return Ok(false);
    }

    Ok(true)
}

/// Deletes a comment owned by `email`. Returns false when there was nothing
/// of theirs to delete, including on a repeated call.
pub async fn delete_comment(db: &MongoDB, comment_id: &str, email: &str) -> Result<bool, AppError> {
    let Some(oid) = parse_comment_id(comment_id) else {
        return Ok(false);
    };

    let result = db
        .collection::<Document>(COMMENTS)
        .delete_one(owned_comment_filter(oid, email))
        .with_options(Operation::DeleteComment.delete_options())
        .await?;

    if result.deleted_count != 1 {
        log::warn!(
            "⚠️ Not able to delete comment `{}` for user `{}`: not the owner or already deleted",
            comment_id,
            email
        );
        return Ok(false);
    }

    log::info!("🗑️ Comment {} deleted by {}", comment_id, email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{test_db, unreachable_db};

    fn comment(email: &str, text: &str) -> Comment {
        Comment {
            id: Some(ObjectId::new()),
            name: "Ned Stark".to_string(),
            email: email.to_string(),
            movie_id: ObjectId::new(),
            text: text.to_string(),
            date: DateTime::now(),
        }
    }

    #[test]
    fn duplicate_comment_names_the_hex_id() {
        let id = ObjectId::parse_str("5a9427648b0beebeb69579e7").unwrap();
        let message = duplicate_comment(id, "E11000 duplicate key").to_string();

        assert!(message.contains("Comment 5a9427648b0beebeb69579e7 already exists"));
        assert!(!message.contains("ObjectId("));
        assert!(!message.contains("Some("));
    }

    #[test]
    fn filter_carries_id_and_author() {
        let oid = ObjectId::new();
        let filter = owned_comment_filter(oid, "alice@example.com");
        assert_eq!(filter, doc! { "_id": oid, "email": "alice@example.com" });
    }

    #[test]
    fn update_sets_text_and_date_only() {
        let now = DateTime::from_millis(1_700_000_000_000);
        let update = text_update("edited", now);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("text").unwrap(), "edited");
        assert_eq!(set.get_datetime("date").unwrap(), &now);
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn add_without_id_is_rejected_before_the_store() {
        let db = unreachable_db().await;
        let mut c = comment("alice@example.com", "hi");
        c.id = None;

        let err = add_comment(&db, c).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn malformed_ids_are_absent_or_refused_without_the_store() {
        let db = unreachable_db().await;
        assert!(get_comment(&db, "not-an-object-id").await.unwrap().is_none());
        assert!(!update_comment(&db, "zzz", "text", "alice@example.com").await.unwrap());
        assert!(!delete_comment(&db, "zzz", "alice@example.com").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn owner_can_update_and_others_cannot() {
        let db = test_db().await;
        let stored = add_comment(&db, comment("alice@example.com", "first")).await.unwrap();
        let id = stored.id.unwrap().to_hex();

        assert!(update_comment(&db, &id, "second", "alice@example.com").await.unwrap());
        let after = get_comment(&db, &id).await.unwrap().unwrap();
        assert_eq!(after.text, "second");

        assert!(!update_comment(&db, &id, "hijacked", "bob@example.com").await.unwrap());
        let after = get_comment(&db, &id).await.unwrap().unwrap();
        assert_eq!(after.text, "second");
        assert_eq!(after.email, "alice@example.com");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn update_of_missing_comment_is_false() {
        let db = test_db().await;
        let id = ObjectId::new().to_hex();
        assert!(!update_comment(&db, &id, "text", "alice@example.com").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn owner_delete_succeeds_once() {
        let db = test_db().await;
        let stored = add_comment(&db, comment("alice@example.com", "bye")).await.unwrap();
        let id = stored.id.unwrap().to_hex();

        assert!(!delete_comment(&db, &id, "bob@example.com").await.unwrap());
        assert!(get_comment(&db, &id).await.unwrap().is_some());

        assert!(delete_comment(&db, &id, "alice@example.com").await.unwrap());
        assert!(get_comment(&db, &id).await.unwrap().is_none());
        assert!(!delete_comment(&db, &id, "alice@example.com").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn duplicate_id_is_a_write_conflict() {
        let db = test_db().await;
        let c = comment("alice@example.com", "once");
        add_comment(&db, c.clone()).await.unwrap();

        let err = add_comment(&db, c).await.unwrap_err();
        assert!(matches!(err, AppError::WriteConflict(_)));
    }
}
