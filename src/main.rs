//! # 블로그 검색 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 서버 설정과 검색 설정 로딩/검증 (설정 오류면 서버를 띄우지 않음)
//! 4. SQLite 연결 풀 생성과 마이그레이션
//! 5. 라우터 설정
//! 6. HTTP 서버 시작

mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use anyhow::Result;
use axum::{routing::get, Router};
use config::{Config, SearchSettings};
use routes::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 blog_search, tower_http, axum 모듈을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_search=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    // 검색 설정 검증(posts-per-page, 정렬, 링크 페이지 등)에 실패하면 여기서 종료합니다.
    let config = Config::from_env()?;
    let settings = SearchSettings::from_env()?;
    tracing::info!("Starting blog search server on {}:{}", config.host, config.port);
    tracing::info!(
        search_path = %settings.search_path,
        url_mapping = settings.url_mapping,
        highlight = settings.highlight,
        per_page = settings.posts_per_page,
        sort = %settings.sort,
        "Search settings loaded"
    );

    // ── 4단계: SQLite 연결 풀 생성 ──
    // with_regexp(): 연결마다 REGEXP 함수를 등록합니다. 검색어 매칭이 이 함수를 씁니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?.with_regexp();
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    // 설정된 카테고리 ID 중 저장소에 없는 것은 경고만 남깁니다.
    // (없는 카테고리는 어떤 글과도 연결되지 않으므로 결과에 영향만 줄 뿐 에러는 아님)
    let known: Vec<i64> = db::list_categories(&pool)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    for id in settings
        .include_categories
        .iter()
        .chain(settings.exclude_categories.iter())
        .filter(|id| !known.contains(id))
    {
        tracing::warn!("Configured category {} does not exist", id);
    }

    // ── 5단계: 라우터 설정 ──
    let search_path = settings.search_path.clone();
    let mapped_route = settings.mapped_route();
    let state = AppState {
        pool,
        settings: Arc::new(settings),
    };

    let api_routes = Router::new()
        .route("/categories", get(list_categories))
        .route("/health", get(health_check));

    // 검색 페이지는 렌더링 레이어가 보는 페이지 경로 그대로, API는 /api/v1 아래에
    let app = Router::new()
        .route(&search_path, get(search).post(search))
        .route(&mapped_route, get(search_mapped).post(search_mapped))
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // ── 6단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
