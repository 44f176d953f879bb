//! 主应用程序入口
//!
//! 加载配置、连接数据库并启动 Axum Web API 服务。

use std::sync::Arc;

use anyhow::Context;
use application::{
    services::{
        ClubService, ClubServiceDependencies, EmailVerificationService, FileService, PostService,
        PostServiceDependencies, UserService, UserServiceDependencies,
    },
    Clock, SystemClock,
};
use config::AppConfig;
use infrastructure::{
    create_pg_pool, BcryptPasswordHasher, PgStorage, S3Presigner, S3PresignerSettings,
    SwotDomainVerifier, MIGRATOR,
};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use web_api::{cors_layer, router, AppState, JwtProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // RUST_LOG 优先，否则使用配置中的过滤规则
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pool = create_pg_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        MIGRATOR.run(&pool).await.context("failed to run migrations")?;
        tracing::info!("database migrations applied");
    }

    let storage = PgStorage::new(pool);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let user_service = UserService::new(UserServiceDependencies {
        user_repository: storage.user_repository.clone(),
        password_hasher: Arc::new(BcryptPasswordHasher::new(config.server.bcrypt_cost)),
        clock: clock.clone(),
    });
    let club_service = ClubService::new(ClubServiceDependencies {
        club_repository: storage.club_repository.clone(),
        category_repository: storage.category_repository.clone(),
        user_repository: storage.user_repository.clone(),
        like_repository: storage.like_repository.clone(),
        clock: clock.clone(),
    });
    let post_service = PostService::new(PostServiceDependencies {
        post_repository: storage.post_repository.clone(),
        user_repository: storage.user_repository.clone(),
        clock: clock.clone(),
    });

    let presigner = S3Presigner::new(S3PresignerSettings::from(&config.storage), clock)
        .context("invalid storage configuration")?;
    let verifier = SwotDomainVerifier::from_config(&config.verification)
        .context("failed to build school domain client")?;
    let email_service = EmailVerificationService::new(
        Arc::new(verifier),
        config.verification.school_domains.clone(),
    );
    let jwt = JwtProvider::from_config(&config).context("invalid jwt configuration")?;

    let state = AppState {
        user_service: Arc::new(user_service),
        club_service: Arc::new(club_service),
        post_service: Arc::new(post_service),
        file_service: Arc::new(FileService::new(Arc::new(presigner))),
        email_service: Arc::new(email_service),
        jwt: Arc::new(jwt),
    };

    let app = router(state).layer(cors_layer(&config.server.cors_origins));
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, "everyclub server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
}
