// Response Bench - Web Server
// Serves the eight serialization routes over HTTP

use anyhow::{Context, Result};
use std::env;
use tower_http::cors::CorsLayer;
use response_bench::{router, AppContext, FixtureStore, Route, ServerConfig};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Response Bench - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let args: Vec<String> = env::args().skip(1).collect();
    let config = ServerConfig::from_env()?.apply_args(&args)?;

    // Fixtures are a startup precondition: no partial serving
    let store = match FixtureStore::load(&config.fixture_dir) {
        Ok(store) => store,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("❌ Could not load fixtures from {:?}", config.fixture_dir);
            eprintln!("   Run: cargo run -- gen-fixtures --dir {}", config.fixture_dir.display());
            std::process::exit(1);
        }
    };
    println!("✓ Fixtures loaded from {:?}", config.fixture_dir);

    let app = router(AppContext::new(store)).layer(CorsLayer::permissive());

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    for route in Route::ALL {
        println!("   GET {}?size=tiny|small|medium|large", route.path());
    }
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("server stopped unexpectedly")?;

    Ok(())
}
