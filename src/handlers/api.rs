use super::ApiError;
use crate::{context::Context, forms::ProcessSentiment, sentiment, user_storage::UserId};
use warp::{reject, Rejection};

pub async fn process_sentiment(
    ctx: Context,
    _user_id: UserId,
    request: ProcessSentiment,
) -> Result<impl warp::Reply, Rejection> {
    if request.journal_entry.trim().is_empty() {
        return Err(reject::custom(ApiError::BadRequest(
            "Journal entry is required".to_owned(),
        )));
    }

    let emotion = ctx
        .classifier
        .classify(&request.journal_entry)
        .await
        .map_err(reject::custom)?
        .ok_or_else(|| {
            reject::custom(sentiment::Error::Upstream {
                status: reqwest::StatusCode::OK,
                body: "no labels".to_owned(),
            })
        })?;

    Ok(warp::reply::json(&emotion))
}
