// ⚙️  Configuration - environment first, then `--flag value` arguments
//
// Both binaries call `dotenvy::dotenv()` before reading, so a `.env` file in
// the working directory works as well as exported variables.

use crate::bench::DriverConfig;
use crate::fixtures::FixtureSize;
use crate::routes::Route;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FIXTURE_DIR: &str = "data";
pub const DEFAULT_REPETITIONS: usize = 30;

// ============================================================================
// SERVER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub fixture_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `BENCH_HOST`, `BENCH_PORT`, `BENCH_FIXTURE_DIR`
    pub fn from_env() -> Result<Self> {
        let mut config = ServerConfig::default();
        if let Ok(host) = env::var("BENCH_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("BENCH_PORT") {
            config.port = parse_port(&port)?;
        }
        if let Ok(dir) = env::var("BENCH_FIXTURE_DIR") {
            config.fixture_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Apply `--host`, `--port` and `--fixtures`
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        for (flag, value) in flag_pairs(args)? {
            match flag {
                "--host" => self.host = value.to_string(),
                "--port" => self.port = parse_port(value)?,
                "--fixtures" => self.fixture_dir = PathBuf::from(value),
                other => bail!("unknown flag {}", other),
            }
        }
        Ok(self)
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

// ============================================================================
// DRIVER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverArgs {
    /// Base URL of a running server; in-process when absent
    pub url: Option<String>,
    pub repetitions: usize,
    /// Empty means every size
    pub sizes: Vec<String>,
    /// Empty means every route
    pub routes: Vec<String>,
    pub fixture_dir: PathBuf,
}

impl DriverArgs {
    /// Defaults overridden by `BENCH_REPETITIONS` and `BENCH_FIXTURE_DIR`,
    /// then by `--url`, `--reps`, `--sizes`, `--routes`, `--fixtures`
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = DriverArgs {
            url: None,
            repetitions: DEFAULT_REPETITIONS,
            sizes: Vec::new(),
            routes: Vec::new(),
            fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
        };
        if let Ok(reps) = env::var("BENCH_REPETITIONS") {
            parsed.repetitions = parse_reps(&reps)?;
        }
        if let Ok(dir) = env::var("BENCH_FIXTURE_DIR") {
            parsed.fixture_dir = PathBuf::from(dir);
        }

        for (flag, value) in flag_pairs(args)? {
            match flag {
                "--url" => parsed.url = Some(value.trim_end_matches('/').to_string()),
                "--reps" => parsed.repetitions = parse_reps(value)?,
                "--sizes" => parsed.sizes = split_list(value),
                "--routes" => parsed.routes = split_list(value),
                "--fixtures" => parsed.fixture_dir = PathBuf::from(value),
                other => bail!("unknown flag {}", other),
            }
        }
        Ok(parsed)
    }

    /// Resolve the size and route names into a driver run
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = DriverConfig {
            repetitions: self.repetitions,
            ..DriverConfig::default()
        };
        if !self.sizes.is_empty() {
            config.sizes = self
                .sizes
                .iter()
                .map(|s| s.parse::<FixtureSize>())
                .collect::<Result<Vec<_>, _>>()?;
        }
        if !self.routes.is_empty() {
            config.routes = self
                .routes
                .iter()
                .map(|name| {
                    Route::from_name(name).ok_or_else(|| anyhow!("unknown route '{}'", name))
                })
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(config)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn flag_pairs(args: &[String]) -> Result<Vec<(&str, &str)>> {
    let mut pairs = Vec::new();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if !flag.starts_with("--") {
            bail!("unexpected argument {}", flag);
        }
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("missing value for {}", flag))?;
        pairs.push((flag.as_str(), value.as_str()));
    }
    Ok(pairs)
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse()
        .with_context(|| format!("invalid port '{}'", value))
}

fn parse_reps(value: &str) -> Result<usize> {
    let reps: usize = value
        .parse()
        .with_context(|| format!("invalid repetition count '{}'", value))?;
    if reps == 0 {
        bail!("repetition count must be at least 1");
    }
    Ok(reps)
}

// ============================================================================
// TESTS
// ============================================================================
