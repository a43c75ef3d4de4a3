// Response Bench - Core Library
// Exposes all modules for use in the driver CLI, the server and tests

pub mod model;      // Typed business records
pub mod schema;     // Structural validation into the typed records
pub mod fixtures;   // Fixture store, loaded once at startup
pub mod generator;  // Deterministic fixture generation
pub mod encoding;   // JSON encoder response wrappers
pub mod error;      // Request-level errors
pub mod routes;     // The eight benchmark endpoints
pub mod bench;      // Benchmark driver and report
pub mod config;     // Server and driver configuration

// Re-export commonly used types
pub use model::{
    Nullable, BusinessRecord, Customer, Booking, ReadableBookingWithId, Service,
    Resource, AvailabilityCalendar, TimeSlot, RecordCounts,
};
pub use schema::{validate, FieldError, ValidationError};
pub use fixtures::{Fixture, FixtureSize, FixtureStore, StartupFixtureError, UnknownSize};
pub use encoding::{Encoder, RecordJson, SerdeJson, SonicJson};
pub use error::ApiError;
pub use routes::{router, AppContext, Route, Source};
pub use bench::{run, BenchReport, DriverConfig, InProcess, Measurement, Transport};
#[cfg(feature = "http")]
pub use bench::HttpTransport;
pub use config::{DriverArgs, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
