/// Renders an askama template into an html reply, `200 OK` unless a status is given.
/// A template that fails to render is logged and answered with a bare 500.
macro_rules! render {
    ($template:expr) => {
        render!(warp::http::StatusCode::OK, $template)
    };
    ($status:expr, $template:expr) => {
        match askama::Template::render(&$template) {
            Ok(html) => warp::reply::with_status(warp::reply::html(html), $status),
            Err(e) => {
                tracing::error!("Template failed to render: {}", e);
                warp::reply::with_status(
                    warp::reply::html(String::from("Internal server error")),
                    warp::http::StatusCode::INTERNAL_SERVER_ERROR,
                )
            }
        }
    };
}

macro_rules! sql_file {
    ($name:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/", $name, ".sql"))
    };
}
