use super::{account, see_other};
use crate::{
    context::Context,
    forms,
    session::{self, Sessions},
    templates,
    user_storage::{self, UserId},
};
use warp::{
    http::{header, StatusCode},
    reject, Rejection, Reply,
};

pub async fn register_form(ctx: Context) -> Result<impl Reply, Rejection> {
    Ok(if ctx.registration_possible() {
        render!(templates::Register::new(ctx.site(None)))
    } else {
        render!(
            StatusCode::NOT_IMPLEMENTED,
            templates::Error::registration_closed(ctx.site(None))
        )
    })
}

pub async fn register(ctx: Context, form: forms::Register) -> Result<impl Reply, Rejection> {
    if !ctx.registration_possible() {
        return Ok(render!(
            StatusCode::NOT_IMPLEMENTED,
            templates::Error::registration_closed(ctx.site(None))
        ));
    }

    if let Err(invalid) = form.validate() {
        return Ok(render!(
            StatusCode::BAD_REQUEST,
            templates::Register::error(ctx.site(None), &invalid.0)
        ));
    }

    match ctx.user_storage.register(&form).await {
        Err(user_storage::Error::EmailExists) => Ok(render!(
            StatusCode::CONFLICT,
            templates::Register::error(ctx.site(None), &["Email already registered"])
        )),
        other => other.map_err(reject::custom).map(|_| {
            render!(
                StatusCode::CREATED,
                templates::RegisterRefresh {
                    site: ctx.site(None)
                }
            )
        }),
    }
}

#[derive(Default, serde::Deserialize)]
pub struct LoginQuery {
    return_to: Option<String>,
}

impl LoginQuery {
    /// Only same-site paths, anything else would be an open redirect.
    fn return_to(&self) -> Option<&str> {
        self.return_to
            .as_deref()
            .filter(|url| url.starts_with('/') && !url.starts_with("//"))
    }
}

pub async fn login_form(
    ctx: Context,
    user_id: Option<UserId>,
    query: LoginQuery,
) -> Result<warp::reply::Response, Rejection> {
    if user_id.is_some() {
        return Ok(see_other("/dashboard").into_response());
    }

    Ok(render!(templates::Login::new(&ctx, query.return_to(), None)).into_response())
}

pub async fn login(
    ctx: Context,
    sessions: Sessions,
    form: forms::Login,
    query: LoginQuery,
) -> Result<warp::reply::Response, Rejection> {
    let account = match ctx
        .user_storage
        .check_credentials(&form.email, &form.password)
        .await
    {
        Err(e) if e.is_rejected_login() => {
            tracing::info!("rejected login: {}", e);
            // same message for both so emails can't be probed
            return Ok(render!(
                StatusCode::FORBIDDEN,
                templates::Login::new(&ctx, query.return_to(), Some("Invalid email or password"))
            )
            .into_response());
        }
        other => other.map_err(reject::custom)?,
    };

    let session = sessions.login(account.id).await;
    tracing::debug!(user_id = account.id.0, "logged in");

    Ok(warp::reply::with_header(
        see_other(query.return_to().unwrap_or("/dashboard")),
        header::SET_COOKIE,
        session,
    )
    .into_response())
}

pub async fn logout(
    user_id: UserId,
    sessions: Sessions,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    sessions.logout(user_id).await;
    Ok(warp::reply::with_header(
        see_other("/login"),
        header::SET_COOKIE,
        session::ClearCookie,
    ))
}

pub async fn password_form(ctx: Context, user_id: UserId) -> Result<impl Reply, Rejection> {
    let account = account(&ctx, user_id).await?;
    Ok(render!(templates::ChangePassword {
        site: ctx.site(Some(&account)),
        errors: &[],
        changed: false,
    }))
}

pub async fn change_password(
    ctx: Context,
    user_id: UserId,
    form: forms::ChangePassword,
) -> Result<impl Reply, Rejection> {
    let account = account(&ctx, user_id).await?;
    let page = |status, errors: &[&str], changed| {
        render!(
            status,
            templates::ChangePassword {
                site: ctx.site(Some(&account)),
                errors,
                changed,
            }
        )
    };

    if let Err(invalid) = form.validate() {
        return Ok(page(StatusCode::BAD_REQUEST, &invalid.0, false));
    }

    match ctx
        .user_storage
        .change_password(user_id, &form.current, &form.new)
        .await
    {
        Err(user_storage::Error::InvalidPassword) => Ok(page(
            StatusCode::FORBIDDEN,
            &["Current password is wrong"],
            false,
        )),
        other => other
            .map_err(reject::custom)
            .map(|_| page(StatusCode::OK, &[], true)),
    }
}
