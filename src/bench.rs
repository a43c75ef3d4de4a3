// ⏱️  Benchmark Driver - Mean latency per (route, size)
// Requests are strictly sequential so timings are not skewed by contention

use crate::config::DEFAULT_REPETITIONS;
use crate::fixtures::FixtureSize;
use crate::routes::Route;
use anyhow::{bail, Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::Router;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tower::ServiceExt;

// ============================================================================
// TRANSPORTS
// ============================================================================

/// Something that can issue a GET and report the status code.
///
/// Implementations must read the whole body before returning, so the body
/// transfer is part of the measured latency.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&mut self, uri: &str) -> Result<u16>;
}

/// Drives the router directly, without a socket
pub struct InProcess {
    router: Router,
}

impl InProcess {
    pub fn new(router: Router) -> Self {
        InProcess { router }
    }
}

impl Transport for InProcess {
    async fn get(&mut self, uri: &str) -> Result<u16> {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .with_context(|| format!("invalid request uri {}", uri))?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status().as_u16();
        to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read response body")?;
        Ok(status)
    }
}

/// Talks to a running server over HTTP
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpTransport {
            client,
            base_url: base_url.into(),
        }
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    async fn get(&mut self, uri: &str) -> Result<u16> {
        let url = format!("{}{}", self.base_url, uri);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status().as_u16();
        response
            .bytes()
            .await
            .with_context(|| format!("failed to read body from {}", url))?;
        Ok(status)
    }
}

// ============================================================================
// DRIVER
// ============================================================================

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub routes: Vec<Route>,
    pub sizes: Vec<FixtureSize>,
    pub repetitions: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            routes: Route::ALL.to_vec(),
            sizes: FixtureSize::ALL.to_vec(),
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

/// Timing of one (route, size) pair
#[derive(Debug, Clone)]
pub struct Measurement {
    pub samples: Vec<Duration>,
}

impl Measurement {
    pub fn mean_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: Duration = self.samples.iter().sum();
        total.as_secs_f64() * 1000.0 / self.samples.len() as f64
    }

    pub fn min_ms(&self) -> f64 {
        self.samples
            .iter()
            .min()
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
    }
}

/// Run every (route, size) pair, route-major, and collect the timings.
///
/// The first non-2xx response aborts the whole run.
pub async fn run<T: Transport>(transport: &mut T, config: &DriverConfig) -> Result<BenchReport> {
    if config.repetitions == 0 {
        bail!("repetition count must be at least 1");
    }

    let mut results = HashMap::new();

    for &route in &config.routes {
        for &size in &config.sizes {
            let uri = route.uri(size);
            let mut samples = Vec::with_capacity(config.repetitions);

            for _ in 0..config.repetitions {
                let started = Instant::now();
                let status = transport.get(&uri).await?;
                samples.push(started.elapsed());

                if !(200..300).contains(&status) {
                    bail!("{} with size {} returned status {}", route, size, status);
                }
            }

            let measurement = Measurement { samples };
            log::info!(
                "{:<28} {:<6} mean {:>9.3} ms  min {:>9.3} ms  ({})",
                route.name(),
                size,
                measurement.mean_ms(),
                measurement.min_ms(),
                route.encoder().name()
            );
            results.insert((route, size), measurement);
        }
    }

    Ok(BenchReport {
        routes: config.routes.clone(),
        sizes: config.sizes.clone(),
        results,
    })
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug)]
pub struct BenchReport {
    routes: Vec<Route>,
    sizes: Vec<FixtureSize>,
    results: HashMap<(Route, FixtureSize), Measurement>,
}

impl BenchReport {
    pub fn get(&self, route: Route, size: FixtureSize) -> Option<&Measurement> {
        self.results.get(&(route, size))
    }

    pub fn mean_ms(&self, route: Route, size: FixtureSize) -> Option<f64> {
        self.get(route, size).map(Measurement::mean_ms)
    }

    /// Markdown table: sizes as columns, routes as rows, mean ms per cell
    pub fn render(&self) -> String {
        let name_width = self
            .routes
            .iter()
            .map(|r| r.name().len())
            .max()
            .unwrap_or(0)
            .max("route".len());
        let cells: Vec<Vec<String>> = self
            .routes
            .iter()
            .map(|&route| {
                self.sizes
                    .iter()
                    .map(|&size| match self.mean_ms(route, size) {
                        Some(ms) => format!("{:.3}", ms),
                        None => "-".to_string(),
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(size.as_str().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        write_row(&mut out, "route", name_width, self.sizes.iter().map(|s| s.as_str()), &widths);
        out.push_str(&format!("|:{}|", "-".repeat(name_width + 1)));
        for w in &widths {
            out.push_str(&format!("{}:|", "-".repeat(w + 1)));
        }
        out.push('\n');
        for (route, row) in self.routes.iter().zip(&cells) {
            write_row(&mut out, route.name(), name_width, row.iter().map(String::as_str), &widths);
        }
        out
    }
}

/// One table row: left-aligned label, right-aligned cells
fn write_row<'a>(
    out: &mut String,
    label: &str,
    label_width: usize,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) {
    out.push_str(&format!("| {:<w$} |", label, w = label_width));
    for (cell, w) in cells.zip(widths) {
        out.push_str(&format!(" {:>w$} |", cell, w = *w));
    }
    out.push('\n');
}

// ============================================================================
// TESTS
// ============================================================================
