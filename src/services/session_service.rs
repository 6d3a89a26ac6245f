use crate::{
    database::{durability::Operation, MongoDB, SESSIONS},
    models::Session,
    utils::{is_duplicate_key, AppError},
};
use mongodb::bson::{doc, Document};

fn session_upsert(user_id: &str, token: &str) -> (Document, Document) {
    let filter = doc! { "jwt": token };
    let update = doc! {
        "$set": {
            "user_id": user_id,
            "jwt": token,
        }
    };
    (filter, update)
}

/// Binds `token` to `user_id`. One upsert keyed by the token: an existing
/// session for the token is re-pointed at `user_id`, otherwise one is
/// created. The unique index on `jwt` keeps concurrent callers from
/// inserting twice.
pub async fn create_session(db: &MongoDB, user_id: &str, token: &str) -> Result<bool, AppError> {
    let (filter, update) = session_upsert(user_id, token);

    let mut options = Operation::CreateSession.update_options();
    options.upsert = Some(true);

    let collection = db.collection::<Document>(SESSIONS);
    let result = match collection.update_one(filter.clone(), update.clone()).with_options(options.clone()).await {
        Ok(result) => result,
        // Two upserts raced on a token that did not exist yet; the loser
        // retries and now matches the winner's document.
        Err(e) if is_duplicate_key(&e) => {
            log::debug!("Session upsert raced for user {}, retrying", user_id);
            collection.update_one(filter, update).with_options(options).await?
        }
        Err(e) => return Err(e.into()),
    };

    if result.upserted_id.is_some() {
        log::info!("🔑 Session created for user {}", user_id);
    } else {
        log::info!("🔑 Session refreshed for user {}", user_id);
    }

    Ok(true)
}

pub async fn get_session(db: &MongoDB, user_id: &str) -> Result<Option<Session>, AppError> {
    let session = db
        .collection::<Session>(SESSIONS)
        .find_one(doc! { "user_id": user_id })
        .await?;

    Ok(session)
}

/// Session that owns `token`, if any.
pub async fn get_session_by_token(db: &MongoDB, token: &str) -> Result<Option<Session>, AppError> {
    let session = db
        .collection::<Session>(SESSIONS)
        .find_one(doc! { "jwt": token })
        .await?;

    Ok(session)
}

/// Removes every session of `user_id`. Succeeds when there were none.
pub async fn delete_sessions(db: &MongoDB, user_id: &str) -> Result<bool, AppError> {
    let result = db
        .collection::<Document>(SESSIONS)
        .delete_many(doc! { "user_id": user_id })
        .with_options(Operation::DeleteSessions.delete_options())
        .await?;

    log::info!("✅ Deleted {} sessions for user {}", result.deleted_count, user_id);
    Ok(true)
}
