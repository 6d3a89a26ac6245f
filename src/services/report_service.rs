use crate::{
    database::{durability::Operation, MongoDB, COMMENTS},
    models::Critic,
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, from_document, Document};

/// Size of the most-active-commenters report.
pub const TOP_COMMENTERS_LIMIT: i64 = 20;

/// group by author → count → most comments first → truncate. Equal counts
/// are ordered by email so repeated runs agree.
pub fn commenters_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$email", "count": { "$sum": 1_i64 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
        doc! { "$limit": limit },
    ]
}

/// The 20 users with the most comments, most active first.
pub async fn top_commenters(db: &MongoDB) -> Result<Vec<Critic>, AppError> {
    most_active_commenters(db, TOP_COMMENTERS_LIMIT).await
}

/// Up to `limit` users ranked by comment count. Counting happens in the
/// store; only the ranked rows travel back. Read at majority so the report
/// never shows comments a failover could roll back.
pub async fn most_active_commenters(db: &MongoDB, limit: i64) -> Result<Vec<Critic>, AppError> {
    if limit <= 0 {
        return Err(AppError::InvalidArgument(format!("Report limit must be positive, got {}", limit)));
    }

    let rows: Vec<Document> = db
        .collection::<Document>(COMMENTS)
        .aggregate(commenters_pipeline(limit))
        .with_options(Operation::TopCommenters.aggregate_options())
        .await?
        .try_collect()
        .await?;

    let critics = rows
        .into_iter()
        .map(from_document::<Critic>)
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("📊 Commenter report: {} critics", critics.len());
    Ok(critics)
}
