use anyhow::{bail, Context, Result};
use std::env;

use response_bench::{
    config::DEFAULT_FIXTURE_DIR, generator, router, run, AppContext, DriverArgs, DriverConfig,
    FixtureSize, FixtureStore, InProcess,
};

const USAGE: &str = "Usage: response-bench run [--url URL] [--reps N] [--sizes tiny,small]
                         [--routes raw-none,typed-schema] [--fixtures DIR]
       response-bench gen-fixtures [--dir DIR] [--seed N]";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("gen-fixtures") => run_gen_fixtures(&args[2..]),
        Some("run") => run_bench(&args[2..]),
        // Benchmark mode (default)
        None => run_bench(&[]),
        Some(other) => {
            eprintln!("❌ Unknown command '{}'", other);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn run_gen_fixtures(args: &[String]) -> Result<()> {
    let mut dir = DEFAULT_FIXTURE_DIR.to_string();
    let mut seed = generator::DEFAULT_SEED;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter.next().with_context(|| format!("missing value for {}", flag))?;
        match flag.as_str() {
            "--dir" => dir = value.clone(),
            "--seed" => seed = value.parse().with_context(|| format!("invalid seed '{}'", value))?,
            other => bail!("unknown flag {}", other),
        }
    }

    println!("🏭 Generating fixtures into {} (seed {})", dir, seed);
    generator::write_all(&dir, seed)?;
    println!("✓ Wrote {} fixture files", FixtureSize::ALL.len());

    Ok(())
}

fn run_bench(args: &[String]) -> Result<()> {
    let parsed = DriverArgs::parse(args)?;
    let config = parsed.driver_config()?;

    println!("⏱️  Response serialization benchmark");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "   {} routes × {} sizes × {} requests",
        config.routes.len(),
        config.sizes.len(),
        config.repetitions
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    let report = match &parsed.url {
        Some(url) => {
            println!("   Target: {}\n", url);
            runtime.block_on(run_http(url, &config))?
        }
        None => {
            let dir = &parsed.fixture_dir;
            println!("   Target: in-process (fixtures from {})\n", dir.display());
            let store = FixtureStore::load(dir)
                .with_context(|| format!("failed to load fixtures from {}", dir.display()))?;
            let mut transport = InProcess::new(router(AppContext::new(store)));
            runtime.block_on(run(&mut transport, &config))?
        }
    };

    println!("\nMean latency (ms)\n");
    print!("{}", report.render());

    Ok(())
}

#[cfg(feature = "http")]
async fn run_http(url: &str, config: &DriverConfig) -> Result<response_bench::BenchReport> {
    let mut transport = response_bench::HttpTransport::new(url);
    run(&mut transport, config).await
}

#[cfg(not(feature = "http"))]
async fn run_http(_url: &str, _config: &DriverConfig) -> Result<response_bench::BenchReport> {
    bail!("--url needs the http feature: cargo build --features http")
}
