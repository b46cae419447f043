#[macro_use]
mod macros;
mod context;
mod dates;
mod forms;
mod handlers;
mod journal_storage;
mod markdown;
mod password;
mod routes;
mod sentiment;
mod session;
mod sqlite;
mod summary;
mod templates;
mod user_storage;

use std::time::Duration;
use tokio::runtime;

const SESSION_GC_INTERVAL: Duration = Duration::from_secs(5 * 60);

async fn run() -> Result<(), anyhow::Error> {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let ctx = context::Context::from_env().await?;
    let sessions = session::Sessions::new(
        SESSION_GC_INTERVAL,
        Duration::from_secs(ctx.config.session_ttl_secs),
    );
    let addr = (ctx.config.ip_addr, ctx.config.port);

    tracing::info!("listening on {}:{}", addr.0, addr.1);
    warp::serve(routes::routes(ctx, sessions))
        .bind_with_graceful_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
            }
        })
        .1
        .await;

    Ok(())
}

fn main() {
    let rt = match runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Can't start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run()) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
