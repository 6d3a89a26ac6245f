use crate::{
    database::{durability::Operation, MongoDB, SESSIONS, USERS},
    models::{Preferences, User},
    utils::AppError,
};
use mongodb::bson::{doc, from_document, Bson, Document};

/// Conditional replace attempts before a preference merge gives up.
const MAX_MERGE_ATTEMPTS: usize = 5;

/// Inserts `user`. A second user with the same email is a write conflict.
pub async fn add_user(db: &MongoDB, user: &User) -> Result<bool, AppError> {
    if user.email.trim().is_empty() {
        return Err(AppError::InvalidArgument("User must have an email".to_string()));
    }

    db.collection::<User>(USERS)
        .insert_one(user)
        .with_options(Operation::AddUser.insert_options())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::WriteConflict(_) => {
                AppError::WriteConflict(format!("User with email {} already exists", user.email))
            }
            other => other,
        })?;

    log::info!("✅ User registered: {}", user.email);
    Ok(true)
}

pub async fn get_user(db: &MongoDB, email: &str) -> Result<Option<User>, AppError> {
    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "email": email })
        .await?;

    Ok(user)
}

/// Removes the user and every session opened for them. Deleting an unknown
/// user is not an error.
pub async fn delete_user(db: &MongoDB, email: &str) -> Result<bool, AppError> {
    log::info!("🗑️ Deleting user {}", email);

    let sessions = db
        .collection::<Document>(SESSIONS)
        .delete_many(doc! { "user_id": email })
        .with_options(Operation::DeleteUser.delete_options())
        .await?;

    let users = db
        .collection::<Document>(USERS)
        .delete_one(doc! { "email": email })
        .with_options(Operation::DeleteUser.delete_options())
        .await?;

    if users.deleted_count == 0 {
        log::warn!("⚠️ User {} not found in database", email);
    }

    log::info!(
        "✅ Deleted {} user and {} sessions for {}",
        users.deleted_count,
        sessions.deleted_count,
        email
    );
    Ok(true)
}

/// Overlays `overlay` on `existing`: keys in the overlay win, every other
/// existing key is kept.
pub fn merge_preferences(existing: Option<Preferences>, overlay: &Preferences) -> Preferences {
    let mut merged = existing.unwrap_or_default();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Matches the user only while `preferences` still holds what was read.
fn preferences_guard(email: &str, read: Option<&Bson>) -> Document {
    match read {
        Some(value) => doc! { "email": email, "preferences": { "$eq": value.clone() } },
        None => doc! { "email": email, "preferences": { "$exists": false } },
    }
}

/// Merges `preferences` into the stored preferences of the user `email`.
///
/// Read-modify-write: the replacement is conditional on the preferences being
/// unchanged since the read, and is retried from a fresh read when another
/// writer got in between.
pub async fn update_preferences(
    db: &MongoDB,
    email: &str,
    preferences: Option<&Preferences>,
) -> Result<bool, AppError> {
    let overlay = preferences
        .ok_or_else(|| AppError::InvalidArgument(format!("Null preferences for user {}", email)))?;

    let raw_users = db.collection::<Document>(USERS);
    let users = db.collection::<User>(USERS);

    for attempt in 1..=MAX_MERGE_ATTEMPTS {
        let document = raw_users
            .find_one(doc! { "email": email })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))?;

        let read = document.get("preferences").cloned();
        let mut user: User = from_document(document)?;
        user.preferences = Some(merge_preferences(user.preferences.take(), overlay));

        let result = users
            .replace_one(preferences_guard(email, read.as_ref()), &user)
            .with_options(Operation::UpdatePreferences.replace_options())
            .await?;

        if result.matched_count == 1 {
            log::info!("✅ Preferences updated for {} ({} keys)", email, overlay.len());
            return Ok(true);
        }

        log::debug!(
            "Preferences of {} changed concurrently, retrying merge (attempt {}/{})",
            email,
            attempt,
            MAX_MERGE_ATTEMPTS
        );
    }

    Err(AppError::WriteConflict(format!(
        "Preferences of {} kept changing; gave up after {} attempts",
        email, MAX_MERGE_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{test_db, unreachable_db};
    use crate::services::session_service;

    fn prefs(pairs: &[(&str, &str)]) -> Preferences {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn user(email: &str) -> User {
        User {
            id: None,
            name: "Jon Snow".to_string(),
            email: email.to_string(),
            password: "$2b$12$hash".to_string(),
            preferences: None,
        }
    }

    #[test]
    fn merge_keeps_unmentioned_keys_and_overwrites_mentioned_ones() {
        let merged = merge_preferences(
            Some(prefs(&[("a", "1"), ("b", "old")])),
            &prefs(&[("b", "2"), ("c", "3")]),
        );
        assert_eq!(merged, prefs(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn merge_into_missing_preferences_starts_empty() {
        assert_eq!(merge_preferences(None, &prefs(&[("a", "1")])), prefs(&[("a", "1")]));
        assert!(merge_preferences(None, &Preferences::new()).is_empty());
    }

    #[test]
    fn guard_matches_missing_or_exact_previous_value() {
        assert_eq!(
            preferences_guard("a@example.com", None),
            doc! { "email": "a@example.com", "preferences": { "$exists": false } }
        );

        let read = Bson::Document(doc! { "a": "1" });
        assert_eq!(
            preferences_guard("a@example.com", Some(&read)),
            doc! { "email": "a@example.com", "preferences": { "$eq": { "a": "1" } } }
        );
    }

    #[tokio::test]
    async fn null_preferences_are_rejected_before_the_store() {
        let db = unreachable_db().await;
        let err = update_preferences(&db, "a@example.com", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn blank_email_is_rejected_before_the_store() {
        let db = unreachable_db().await;
        let err = add_user(&db, &user("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn successive_updates_merge() {
        let db = test_db().await;
        add_user(&db, &user("jon@example.com")).await.unwrap();

        assert!(update_preferences(&db, "jon@example.com", Some(&prefs(&[("a", "1")]))).await.unwrap());
        assert!(update_preferences(&db, "jon@example.com", Some(&prefs(&[("b", "2")]))).await.unwrap());

        let stored = get_user(&db, "jon@example.com").await.unwrap().unwrap();
        assert_eq!(stored.preferences, Some(prefs(&[("a", "1"), ("b", "2")])));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn null_payload_leaves_user_untouched() {
        let db = test_db().await;
        let mut u = user("jon@example.com");
        u.preferences = Some(prefs(&[("a", "1")]));
        add_user(&db, &u).await.unwrap();

        assert!(update_preferences(&db, "jon@example.com", None).await.is_err());

        let stored = get_user(&db, "jon@example.com").await.unwrap().unwrap();
        assert_eq!(stored.preferences, Some(prefs(&[("a", "1")])));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn unknown_user_is_not_found() {
        let db = test_db().await;
        let err = update_preferences(&db, "ghost@example.com", Some(&prefs(&[("a", "1")])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn concurrent_merges_lose_no_keys() {
        let db = test_db().await;
        add_user(&db, &user("jon@example.com")).await.unwrap();

        let calls = (0..4).map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                let key = format!("k{}", i);
                update_preferences(&db, "jon@example.com", Some(&prefs(&[(key.as_str(), "v")]))).await
            })
        });
        for handle in futures::future::join_all(calls).await {
            assert!(handle.unwrap().unwrap());
        }

        let stored = get_user(&db, "jon@example.com").await.unwrap().unwrap();
        assert_eq!(stored.preferences.unwrap().len(), 4);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn duplicate_email_is_a_write_conflict() {
        let db = test_db().await;
        assert!(add_user(&db, &user("jon@example.com")).await.unwrap());

        let err = add_user(&db, &user("jon@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::WriteConflict(_)));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn delete_user_removes_their_sessions() {
        let db = test_db().await;
        add_user(&db, &user("jon@example.com")).await.unwrap();
        session_service::create_session(&db, "jon@example.com", "tok").await.unwrap();

        assert!(delete_user(&db, "jon@example.com").await.unwrap());
        assert!(get_user(&db, "jon@example.com").await.unwrap().is_none());
        assert!(session_service::get_session(&db, "jon@example.com").await.unwrap().is_none());

        assert!(delete_user(&db, "jon@example.com").await.unwrap());
    }
}
