use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trending_service::{
    cache::{CompositeRankingCache, LocalRankingCache, RedisRankingCache},
    db::{PgContentSource, PgPopularitySource},
    handlers,
    jobs::{run_job_loop, JobSchedule, RankingRefreshJob},
    BatchRankingComputation, Config, RankingError, RankingService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .init();

    let config = Config::from_env().context("Failed to load config")?;
    config.validate().map_err(RankingError::Config)?;

    info!(
        service = %config.service.name,
        http_port = config.service.http_port,
        top_n = config.ranking.top_n,
        interval_secs = config.job.interval_secs,
        "Starting trending service"
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let redis_client =
        redis::Client::open(config.redis.url.clone()).context("Failed to create Redis client")?;
    let redis_manager = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;

    let computation = BatchRankingComputation::new(
        Arc::new(PgContentSource::new(db_pool.clone())),
        Arc::new(PgPopularitySource::new(db_pool)),
        &config.ranking,
        config.job.provider_timeout(),
    );

    let cache = Arc::new(CompositeRankingCache::new(
        Arc::new(LocalRankingCache::new(
            config.cache.local_ttl(),
            config.ranking.abstract_len,
        )),
        Arc::new(RedisRankingCache::new(redis_manager)),
        config.cache.shared_key.clone(),
        config.cache.shared_ttl(),
    )
    .with_shared_timeout(config.cache.shared_timeout()));

    let service = Arc::new(RankingService::new(computation, cache, config.job.timeout()));

    let (shutdown_tx, _) = broadcast::channel(1);

    let job_handle = tokio::spawn(run_job_loop(
        Arc::new(RankingRefreshJob::new(service.clone())),
        JobSchedule {
            interval: config.job.interval(),
            initial_delay: config.job.initial_delay(),
        },
        shutdown_tx.subscribe(),
    ));

    let service_data = web::Data::from(service);
    let bind_address = format!("{}:{}", config.service.http_host, config.service.http_port);

    info!("HTTP server listening on {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(service_data.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    shutdown_signal().await;
    info!("Shutdown signal received, stopping");

    let _ = shutdown_tx.send(());
    server_handle.stop(true).await;

    if let Err(e) = job_handle.await {
        error!(error = %e, "Ranking job task panicked");
    }
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "HTTP server exited with error"),
        Err(e) => error!(error = %e, "HTTP server task panicked"),
    }

    info!("Trending service stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
