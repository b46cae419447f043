pub mod api;
pub mod auth;
pub mod journals;
pub mod summary;

use crate::{
    context::Context, journal_storage, sentiment, session, templates, user_storage,
    user_storage::{UserAccount, UserId},
};
use warp::{
    http::{header, StatusCode},
    reject, Rejection, Reply,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl reject::Reject for ApiError {}

pub(crate) async fn account(ctx: &Context, user_id: UserId) -> Result<UserAccount, Rejection> {
    ctx.user_storage
        .fetch_account(user_id)
        .await
        .map_err(reject::custom)
}

pub(crate) fn see_other(location: impl AsRef<str>) -> impl Reply {
    warp::reply::with_header(
        StatusCode::SEE_OTHER,
        header::LOCATION,
        location.as_ref().to_owned(),
    )
}

fn json_error(status: StatusCode, msg: &str) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": msg })),
        status,
    )
    .into_response()
}

pub async fn handle_rejection(
    ctx: Context,
    err: Rejection,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    let site = ctx.site(None);
    macro_rules! template_response {
        ($status:expr, $template:expr) => {
            render!($status, $template).into_response()
        };
    }

    Ok(if err.is_not_found() {
        template_response!(StatusCode::NOT_FOUND, templates::Error::not_found(site))
    } else if let Some(error) = err.find::<session::Error>() {
        match error {
            session::Error::CorruptedCookie => {
                warp::reply::with_header(see_other("/"), header::SET_COOKIE, session::ClearCookie)
                    .into_response()
            }
            session::Error::SessionRequired { access_url } => see_other(format!(
                "/login?return_to={}",
                urlencoding::encode(access_url)
            ))
            .into_response(),
            session::Error::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        }
    } else if let Some(ApiError::BadRequest(msg)) = err.find::<ApiError>() {
        json_error(StatusCode::BAD_REQUEST, msg)
    } else if let Some(error) = err.find::<sentiment::Error>() {
        tracing::error!("{}", error);
        match error {
            sentiment::Error::Disabled => {
                json_error(StatusCode::SERVICE_UNAVAILABLE, &error.to_string())
            }
            _ => json_error(StatusCode::BAD_GATEWAY, "Failed to process sentiment"),
        }
    } else if let Some(error) = err.find::<journal_storage::Error>() {
        match error {
            journal_storage::Error::NotFound => {
                template_response!(StatusCode::NOT_FOUND, templates::Error::not_found(site))
            }
            journal_storage::Error::UnknownCategory => template_response!(
                StatusCode::BAD_REQUEST,
                templates::Error::bad_request(site, "Unknown category")
            ),
            journal_storage::Error::Generic(e) => {
                tracing::error!("Journal storage failed: {}", e);
                template_response!(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    templates::Error::internal_server(site)
                )
            }
        }
    } else if let Some(error) = err.find::<user_storage::Error>() {
        tracing::error!("User storage failed: {}", error);
        template_response!(
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::Error::internal_server(site)
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        template_response!(
            StatusCode::METHOD_NOT_ALLOWED,
            templates::Error::bad_request(site, "Method not allowed")
        )
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        template_response!(
            StatusCode::PAYLOAD_TOO_LARGE,
            templates::Error::bad_request(site, "Request too large")
        )
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<reject::InvalidQuery>().is_some()
    {
        template_response!(
            StatusCode::BAD_REQUEST,
            templates::Error::bad_request(site, "Malformed request")
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        template_response!(
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::Error::internal_server(site)
        )
    })
}
