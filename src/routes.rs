use crate::{
    context::Context,
    handlers::{self, summary::Metric},
    session,
    session::Sessions,
};
use std::convert::Infallible;
use warp::{http::Uri, Filter, Reply};

macro_rules! routes {
    ($x:expr, $($y:expr),*) => { {
            let filter = boxed_on_debug!($x);
            $(
                let filter = boxed_on_debug!(filter.or($y));
            )*
            filter
    } }
}

#[cfg(debug_assertions)]
macro_rules! boxed_on_debug {
    ($x:expr) => {
        $x.boxed()
    };
}

#[cfg(not(debug_assertions))]
macro_rules! boxed_on_debug {
    ($x:expr) => {
        $x
    };
}

pub fn routes(
    ctx: Context,
    sessions: Sessions,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let static_ = warp::path("static").and(warp::fs::dir(ctx.config.static_dir.clone()));

    let recover_ctx = ctx.clone();
    let ctx_filter = warp::any().map(move || ctx.clone());
    let auth_form_limit = warp::body::content_length_limit(1 << 12);
    let journal_form_limit = warp::body::content_length_limit(1 << 16);
    let login_required = session::login_required(sessions.clone());
    let api_login_required = session::api_login_required(sessions.clone());
    let optional_login = session::optional_login(sessions.clone());
    let sessions = warp::any().map(move || sessions.clone());

    let home = warp::get()
        .and(warp::path::end())
        .map(|| warp::redirect::see_other(Uri::from_static("/dashboard")));

    let register_path = warp::path("register").and(warp::path::end());
    let register_form = register_path
        .and(warp::get())
        .and(ctx_filter.clone())
        .and_then(handlers::auth::register_form);
    let register_post = register_path
        .and(warp::post())
        .and(ctx_filter.clone())
        .and(auth_form_limit)
        .and(warp::body::form())
        .and_then(handlers::auth::register);

    let login_path = warp::path("login").and(warp::path::end());
    let login_form = login_path
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(optional_login)
        .and(warp::query())
        .and_then(handlers::auth::login_form);
    let login_post = login_path
        .and(warp::post())
        .and(ctx_filter.clone())
        .and(sessions.clone())
        .and(auth_form_limit)
        .and(warp::body::form())
        .and(warp::query())
        .and_then(handlers::auth::login);
    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::get())
        .and(login_required.clone())
        .and(sessions)
        .and_then(handlers::auth::logout);

    let password_path = warp::path!("account" / "password");
    let password_form = password_path
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and_then(handlers::auth::password_form);
    let password_post = password_path
        .and(warp::post())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and(auth_form_limit)
        .and(warp::body::form())
        .and_then(handlers::auth::change_password);

    let dashboard = warp::path("dashboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and_then(handlers::journals::dashboard);
    let summaries = warp::path!("dashboard" / "summaries")
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and(warp::query())
        .and_then(handlers::summary::page);

    let create_path = warp::path!("journals" / "create");
    let create_form = create_path
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and_then(handlers::journals::create_form);
    let create_post = create_path
        .and(warp::post())
        .and(ctx_filter.clone())
        .and(login_required.clone())
        .and(journal_form_limit)
        .and(warp::body::form())
        .and_then(handlers::journals::create);

    let journal = warp::path("journals")
        .and(ctx_filter.clone())
        .and(warp::path::param::<i64>());
    let journal_show = journal
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(login_required.clone())
        .and_then(handlers::journals::show);
    let journal_edit_path = journal.clone().and(warp::path("edit")).and(warp::path::end());
    let journal_edit_form = journal_edit_path
        .clone()
        .and(warp::get())
        .and(login_required.clone())
        .and_then(handlers::journals::edit_form);
    let journal_edit_post = journal_edit_path
        .and(warp::post())
        .and(login_required.clone())
        .and(journal_form_limit)
        .and(warp::body::form())
        .and_then(handlers::journals::edit);
    let journal_delete = journal
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(warp::post())
        .and(login_required)
        .and_then(handlers::journals::delete);

    let summary_api = warp::path!("api" / "summary" / Metric)
        .and(warp::get())
        .and(ctx_filter.clone())
        .and(api_login_required.clone())
        .and(warp::query())
        .and_then(handlers::summary::metric);
    let sentiment_api = warp::path!("api" / "ai" / "process-sentiment")
        .and(warp::post())
        .and(ctx_filter)
        .and(api_login_required)
        .and(journal_form_limit)
        .and(warp::body::json())
        .and_then(handlers::api::process_sentiment);

    let routes = routes! {
        home,
        register_form,
        register_post,
        login_form,
        login_post,
        logout,
        password_form,
        password_post,
        dashboard,
        summaries,
        create_form,
        create_post,
        journal_show,
        journal_edit_form,
        journal_edit_post,
        journal_delete,
        summary_api,
        sentiment_api,
        static_
    };

    routes
        .recover(move |err: warp::Rejection| {
            handlers::handle_rejection(recover_ctx.clone(), err)
        })
        .with(warp::trace::request())
}
