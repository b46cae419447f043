use super::{account, see_other};
use crate::{
    context::Context,
    forms, journal_storage::JournalId,
    markdown, sentiment, templates,
    user_storage::UserId,
};
use time::OffsetDateTime;
use warp::{http::StatusCode, reject, Rejection, Reply};

const EXCERPT_CHARS: usize = 160;

pub async fn dashboard(ctx: Context, user_id: UserId) -> Result<impl Reply, Rejection> {
    let account = account(&ctx, user_id).await?;
    let journals = ctx.journals.list(user_id).await.map_err(reject::custom)?;
    let previews = journals
        .iter()
        .map(|journal| templates::JournalPreview {
            journal,
            excerpt: markdown::excerpt(&journal.content, EXCERPT_CHARS),
        })
        .collect::<Vec<_>>();

    Ok(render!(templates::Dashboard {
        site: ctx.site(Some(&account)),
        journals: &previews,
    }))
}

pub async fn show(ctx: Context, id: i64, user_id: UserId) -> Result<impl Reply, Rejection> {
    let account = account(&ctx, user_id).await?;
    let journal = ctx
        .journals
        .get(user_id, JournalId(id))
        .await
        .map_err(reject::custom)?;

    Ok(render!(templates::JournalPage {
        site: ctx.site(Some(&account)),
        content: &markdown::render(&journal.content),
        journal: &journal,
    }))
}

/// Renders the create/edit form, with `errors` when a submission was rejected.
async fn form_page(
    ctx: &Context,
    user_id: UserId,
    target: Option<i64>,
    form: &forms::Journal,
    errors: &[&str],
) -> Result<warp::reply::Response, Rejection> {
    let account = account(ctx, user_id).await?;
    let categories = ctx.journals.categories().await.map_err(reject::custom)?;
    let action = match target {
        Some(id) => format!("/journals/{}/edit", id),
        None => "/journals/create".to_owned(),
    };
    let (heading, submit) = match target {
        Some(_) => ("Edit entry", "Save"),
        None => ("New entry", "Create entry"),
    };
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok(render!(
        status,
        templates::JournalForm {
            site: ctx.site(Some(&account)),
            heading,
            action: &action,
            submit,
            categories: &categories,
            form,
            errors,
        }
    )
    .into_response())
}

pub async fn create_form(ctx: Context, user_id: UserId) -> Result<impl Reply, Rejection> {
    form_page(&ctx, user_id, None, &forms::Journal::default(), &[]).await
}

pub async fn create(
    ctx: Context,
    user_id: UserId,
    form: forms::Journal,
) -> Result<warp::reply::Response, Rejection> {
    let mut entry = match form.validate(OffsetDateTime::now_utc()) {
        Ok(entry) => entry,
        Err(invalid) => return form_page(&ctx, user_id, None, &form, &invalid.0).await,
    };

    entry.sentiment = sentiment::label_for(&*ctx.classifier, &entry.content).await;
    let id = ctx
        .journals
        .create(user_id, &entry)
        .await
        .map_err(reject::custom)?;
    tracing::info!(user_id = user_id.0, journal_id = id.0, "created entry");

    Ok(see_other(format!("/journals/{}", id)).into_response())
}

pub async fn edit_form(ctx: Context, id: i64, user_id: UserId) -> Result<impl Reply, Rejection> {
    let journal = ctx
        .journals
        .get(user_id, JournalId(id))
        .await
        .map_err(reject::custom)?;
    form_page(&ctx, user_id, Some(id), &forms::Journal::from(&journal), &[]).await
}

pub async fn edit(
    ctx: Context,
    id: i64,
    user_id: UserId,
    form: forms::Journal,
) -> Result<warp::reply::Response, Rejection> {
    let existing = ctx
        .journals
        .get(user_id, JournalId(id))
        .await
        .map_err(reject::custom)?;

    let mut entry = match form.validate(OffsetDateTime::now_utc()) {
        Ok(entry) => entry,
        Err(invalid) => return form_page(&ctx, user_id, Some(id), &form, &invalid.0).await,
    };

    entry.sentiment = if entry.content == existing.content {
        existing.sentiment
    } else {
        sentiment::label_for(&*ctx.classifier, &entry.content).await
    };

    ctx.journals
        .update(user_id, JournalId(id), &entry)
        .await
        .map_err(reject::custom)?;
    tracing::info!(user_id = user_id.0, journal_id = id, "updated entry");

    Ok(see_other(format!("/journals/{}", id)).into_response())
}

pub async fn delete(ctx: Context, id: i64, user_id: UserId) -> Result<impl Reply, Rejection> {
    ctx.journals
        .delete(user_id, JournalId(id))
        .await
        .map_err(reject::custom)?;
    tracing::info!(user_id = user_id.0, journal_id = id, "deleted entry");

    Ok(see_other("/dashboard"))
}
