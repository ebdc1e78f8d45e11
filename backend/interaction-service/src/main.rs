use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interaction_service::cache::PostCache;
use interaction_service::config::Config;
use interaction_service::handlers::{self, AppState};
use interaction_service::metrics;
use interaction_service::repository::{CommentRepository, PostRepository, ReportRepository};
use interaction_service::services::{
    CounterStore, InteractionService, MemoryVoteBuffer, PgCounterStore, PgInteractionLog,
    RedisVoteBuffer, VoteBuffer,
};
use interaction_service::workers::redis_health::{start_buffer_health_check, BufferHealthConfig};
use interaction_service::workers::VoteSyncWorker;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

async fn connect_redis(url: &str) -> Result<redis::aio::ConnectionManager> {
    let client = redis::Client::open(url).context("Failed to create Redis client")?;
    redis::aio::ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🔧 Starting interaction-service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: env={}, port={}, vote_sync_interval={}s",
        config.app.env, config.app.port, config.sync.vote_sync_interval_secs
    );

    // Initialize database pool
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("✅ Database pool created and verified");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("✅ Database migrations completed");

    // Redis is optional: without it the vote buffer runs in memory and
    // the post cache becomes a pass-through.
    let redis_conn = match &config.redis.url {
        Some(url) => match connect_redis(url).await {
            Ok(conn) => {
                info!("✅ Redis connection established");
                Some(conn)
            }
            Err(e) => {
                warn!("⚠️ Redis connection failed, running without it: {e:#}");
                None
            }
        },
        None => {
            info!("REDIS_URL not set; using in-memory vote buffer");
            None
        }
    };

    // Wire up the interaction pipeline
    let buffer: Arc<dyn VoteBuffer> = match &redis_conn {
        Some(conn) => Arc::new(RedisVoteBuffer::new(conn.clone())),
        None => Arc::new(MemoryVoteBuffer::new()),
    };
    let store: Arc<dyn CounterStore> = Arc::new(PgCounterStore::new(pg_pool.clone()));
    let log = Arc::new(PgInteractionLog::new(
        CommentRepository::new(pg_pool.clone()),
        ReportRepository::new(pg_pool.clone()),
    ));
    let interactions = Arc::new(InteractionService::new(
        store.clone(),
        log,
        buffer.clone(),
    ));
    info!("✅ Interaction service initialized");

    // Start the vote sync worker with a cancellable handle so shutdown
    // can force one final flush.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = VoteSyncWorker::new(
        buffer.clone(),
        store.clone(),
        Duration::from_secs(config.sync.vote_sync_interval_secs),
    );
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));
    info!("✅ Vote sync worker started");

    // Buffer health check keeps the Redis connection warm
    if redis_conn.is_some() {
        let health_buffer = buffer.clone();
        tokio::spawn(async move {
            start_buffer_health_check(health_buffer, BufferHealthConfig::default()).await;
        });
        info!("✅ Vote buffer health check background job started");
    }

    let state = web::Data::new(AppState {
        interactions,
        posts: PostRepository::new(pg_pool.clone()),
        reports: ReportRepository::new(pg_pool.clone()),
        cache: PostCache::new(redis_conn),
    });

    let http_addr = format!("{}:{}", config.app.host, config.app.port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/interactions")
                            .route("", web::post().to(handlers::submit_interaction))
                            .route(
                                "/batch",
                                web::post().to(handlers::submit_interaction_batch),
                            )
                            .route("/{post_id}", web::get().to(handlers::get_interactions)),
                    )
                    .service(
                        web::scope("/posts")
                            .route("", web::post().to(handlers::create_post))
                            .route("", web::get().to(handlers::list_posts))
                            .route("/{post_id}", web::get().to(handlers::get_post))
                            .route("/{post_id}", web::delete().to(handlers::delete_post))
                            .route(
                                "/{post_id}/report",
                                web::post().to(handlers::submit_report),
                            ),
                    )
                    .route("/admin/reports", web::get().to(handlers::list_admin_reports)),
            )
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .disable_signals()
    .run();

    let server_handle = server.handle();

    let mut join_set = JoinSet::new();
    join_set.spawn(async move {
        server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });

    info!("🚀 interaction-service listening on http://{}", http_addr);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut first_error: Option<anyhow::Error> = None;

    tokio::select! {
        result = join_set.join_next() => {
            match result {
                Some(Ok(Err(e))) => {
                    tracing::error!("Task failed: {:#}", e);
                    first_error = Some(e);
                }
                Some(Err(e)) => {
                    tracing::error!("Task panicked: {:#}", e);
                    first_error = Some(anyhow::anyhow!("Task panicked: {}", e));
                }
                _ => {}
            }
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received");
        }
    }

    // Graceful teardown: flush remaining votes, then stop the server.
    let _ = shutdown_tx.send(true);
    if let Err(e) = worker_handle.await {
        tracing::error!("Vote sync worker join error: {}", e);
    }
    server_handle.stop(true).await;
    join_set.shutdown().await;

    info!("🛑 interaction-service shutting down");

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
