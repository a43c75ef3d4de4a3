// 📦 Fixture Store - Benchmark payloads loaded once at startup
// Holds both the raw value tree and the validated record for every size

use crate::model::{BusinessRecord, RecordCounts};
use crate::schema::{self, ValidationError};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// FIXTURE SIZE
// ============================================================================

/// Selector for one of the four fixture documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureSize {
    /// ~1KB
    Tiny,
    /// ~10KB
    Small,
    /// ~100KB
    Medium,
    /// ~1MB
    Large,
}

impl FixtureSize {
    pub const ALL: [FixtureSize; 4] = [
        FixtureSize::Tiny,
        FixtureSize::Small,
        FixtureSize::Medium,
        FixtureSize::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureSize::Tiny => "tiny",
            FixtureSize::Small => "small",
            FixtureSize::Medium => "medium",
            FixtureSize::Large => "large",
        }
    }

    /// Byte-size tag used in file names and accepted as an alias
    pub fn legacy_tag(&self) -> &'static str {
        match self {
            FixtureSize::Tiny => "1kb",
            FixtureSize::Small => "10kb",
            FixtureSize::Medium => "100kb",
            FixtureSize::Large => "1mb",
        }
    }

    pub fn file_name(&self) -> String {
        format!("data_{}.json", self.legacy_tag())
    }

    /// Nominal serialized size in bytes
    pub fn target_bytes(&self) -> usize {
        match self {
            FixtureSize::Tiny => 1_000,
            FixtureSize::Small => 10_000,
            FixtureSize::Medium => 100_000,
            FixtureSize::Large => 1_000_000,
        }
    }
}

impl fmt::Display for FixtureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fixture size '{0}' (expected one of tiny, small, medium, large)")]
pub struct UnknownSize(pub String);

impl FromStr for FixtureSize {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixtureSize::ALL
            .into_iter()
            .find(|size| s == size.as_str() || s == size.legacy_tag())
            .ok_or_else(|| UnknownSize(s.to_string()))
    }
}

// ============================================================================
// STARTUP ERRORS
// ============================================================================

/// Fixture loading failed; the process cannot serve without every fixture
#[derive(Debug, thiserror::Error)]
pub enum StartupFixtureError {
    #[error("fixture file {0} not found")]
    Missing(PathBuf),

    #[error("failed to read fixture file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("fixture {size} does not match the business schema: {source}")]
    Invalid {
        size: FixtureSize,
        #[source]
        source: ValidationError,
    },

    /// Raw and typed forms would serve different JSON
    #[error("fixture {size} does not re-encode to its raw form; first difference at {loc}")]
    Diverges { size: FixtureSize, loc: String },

    #[error("fixture {size} could not be re-encoded: {source}")]
    Encode {
        size: FixtureSize,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// FIXTURE STORE
// ============================================================================

/// One loaded fixture in both representations
#[derive(Debug, Clone)]
pub struct Fixture {
    pub raw: Arc<Value>,
    pub typed: Arc<BusinessRecord>,
}

impl Fixture {
    /// Validate a raw document and keep both forms.
    ///
    /// The typed record must re-encode to exactly the raw document, so every
    /// route serves the same JSON. Keys outside the schema are rejected here.
    pub fn from_raw(size: FixtureSize, raw: Value) -> Result<Self, StartupFixtureError> {
        let typed = schema::validate(&raw)
            .map_err(|source| StartupFixtureError::Invalid { size, source })?;
        let projected = typed
            .to_json_value()
            .map_err(|source| StartupFixtureError::Encode { size, source })?;
        if let Some(loc) = first_difference(&raw, &projected, "") {
            return Err(StartupFixtureError::Diverges { size, loc });
        }
        Ok(Fixture {
            raw: Arc::new(raw),
            typed: Arc::new(typed),
        })
    }

    pub fn raw_counts(&self) -> RecordCounts {
        RecordCounts::of_raw(&self.raw)
    }

    pub fn typed_counts(&self) -> RecordCounts {
        self.typed.counts()
    }
}

/// Read-only lookup of fixtures by size
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    fixtures: HashMap<FixtureSize, Fixture>,
}

impl FixtureStore {
    /// Load every fixture from `dir`. Fails on the first missing or bad file.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, StartupFixtureError> {
        let dir = dir.as_ref();
        let mut fixtures = HashMap::new();

        for size in FixtureSize::ALL {
            let raw = read_document(&dir.join(size.file_name()))?;
            let fixture = Fixture::from_raw(size, raw)?;
            log::info!(
                "loaded fixture {} ({} records)",
                size,
                fixture.typed_counts().total()
            );
            fixtures.insert(size, fixture);
        }

        Ok(FixtureStore { fixtures })
    }

    /// Build a store from in-memory documents. Sizes not supplied stay empty.
    pub fn from_documents(
        docs: impl IntoIterator<Item = (FixtureSize, Value)>,
    ) -> Result<Self, StartupFixtureError> {
        let mut fixtures = HashMap::new();
        for (size, raw) in docs {
            fixtures.insert(size, Fixture::from_raw(size, raw)?);
        }
        Ok(FixtureStore { fixtures })
    }

    pub fn get(&self, size: FixtureSize) -> Option<&Fixture> {
        self.fixtures.get(&size)
    }

    pub fn raw(&self, size: FixtureSize) -> Option<&Arc<Value>> {
        self.get(size).map(|f| &f.raw)
    }

    pub fn typed(&self, size: FixtureSize) -> Option<&Arc<BusinessRecord>> {
        self.get(size).map(|f| &f.typed)
    }

    /// Loaded sizes in ascending order
    pub fn sizes(&self) -> Vec<FixtureSize> {
        let mut sizes: Vec<FixtureSize> = self.fixtures.keys().copied().collect();
        sizes.sort();
        sizes
    }

    pub fn is_complete(&self) -> bool {
        FixtureSize::ALL.iter().all(|s| self.fixtures.contains_key(s))
    }

    /// Swap the raw side only, leaving the typed side as loaded
    #[cfg(test)]
    pub(crate) fn replace_raw(&mut self, size: FixtureSize, raw: Value) {
        if let Some(fixture) = self.fixtures.get_mut(&size) {
            fixture.raw = Arc::new(raw);
        }
    }
}

/// Dotted location of the first place two documents disagree
fn first_difference(raw: &Value, projected: &Value, loc: &str) -> Option<String> {
    if raw == projected {
        return None;
    }
    match (raw, projected) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            keys.into_iter().find_map(|key| {
                let key_loc = schema::join(loc, key);
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => first_difference(x, y, &key_loc),
                    _ => Some(key_loc),
                }
            })
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
            a.iter().zip(b).enumerate().find_map(|(i, (x, y))| {
                first_difference(x, y, &schema::join(loc, &i.to_string()))
            })
        }
        _ if loc.is_empty() => Some("__root__".to_string()),
        _ => Some(loc.to_string()),
    }
}

fn read_document(path: &Path) -> Result<Value, StartupFixtureError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            StartupFixtureError::Missing(path.to_path_buf())
        } else {
            StartupFixtureError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| StartupFixtureError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator;
    use serde_json::json;

    fn write_all_fixtures(dir: &Path) {
        generator::write_all(dir, 7).unwrap();
    }

    #[test]
    fn test_parse_size_names_and_aliases() {
        assert_eq!("tiny".parse::<FixtureSize>().unwrap(), FixtureSize::Tiny);
        assert_eq!("large".parse::<FixtureSize>().unwrap(), FixtureSize::Large);
        assert_eq!("100kb".parse::<FixtureSize>().unwrap(), FixtureSize::Medium);
        assert_eq!("1mb".parse::<FixtureSize>().unwrap(), FixtureSize::Large);
    }

    #[test]
    fn test_parse_size_rejects_unknown() {
        let err = "huge".parse::<FixtureSize>().unwrap_err();
        assert_eq!(err, UnknownSize("huge".to_string()));
        assert!("TINY".parse::<FixtureSize>().is_err());
        assert!("".parse::<FixtureSize>().is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(FixtureSize::Tiny.file_name(), "data_1kb.json");
        assert_eq!(FixtureSize::Large.file_name(), "data_1mb.json");
    }

    #[test]
    fn test_load_all_sizes_counts_match() {
        let dir = tempfile::tempdir().unwrap();
        write_all_fixtures(dir.path());

        let store = FixtureStore::load(dir.path()).unwrap();
        assert!(store.is_complete());
        assert_eq!(store.sizes(), FixtureSize::ALL.to_vec());

        for size in FixtureSize::ALL {
            let fixture = store.get(size).unwrap();
            assert_eq!(fixture.raw_counts(), fixture.typed_counts(), "size {}", size);
        }
    }

    #[test]
    fn test_committed_fixtures_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let store = FixtureStore::load(&dir).unwrap();

        for size in FixtureSize::ALL {
            let fixture = store.get(size).unwrap();
            assert_eq!(fixture.raw_counts(), fixture.typed_counts());
        }
        let tiny = store.get(FixtureSize::Tiny).unwrap().typed_counts().total();
        let large = store.get(FixtureSize::Large).unwrap().typed_counts().total();
        assert!(large > tiny);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all_fixtures(dir.path());
        std::fs::remove_file(dir.path().join("data_100kb.json")).unwrap();

        let err = FixtureStore::load(dir.path()).unwrap_err();
        match err {
            StartupFixtureError::Missing(path) => assert!(path.ends_with("data_100kb.json")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all_fixtures(dir.path());
        std::fs::write(dir.path().join("data_1kb.json"), b"{\"_id\": ").unwrap();

        let err = FixtureStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, StartupFixtureError::Malformed { .. }));
    }

    #[test]
    fn test_load_non_conforming_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all_fixtures(dir.path());
        std::fs::write(dir.path().join("data_10kb.json"), b"{\"business_name\": 1}").unwrap();

        let err = FixtureStore::load(dir.path()).unwrap_err();
        match err {
            StartupFixtureError::Invalid { size, source } => {
                assert_eq!(size, FixtureSize::Small);
                assert_eq!(source.errors.len(), 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_document_omitting_optional_keys_loads() {
        let doc = json!({
            "_id": "b",
            "bookings": [{
                "booking_id": "1", "date": "d", "start_time": "s",
                "readable_booking": "r", "status": "ok"
            }]
        });

        let fixture = Fixture::from_raw(FixtureSize::Tiny, doc.clone()).unwrap();
        assert_eq!(fixture.typed.to_json_value().unwrap(), doc);
        assert_eq!(fixture.raw_counts(), fixture.typed_counts());
    }

    #[test]
    fn test_keys_outside_schema_are_fatal() {
        let mut doc = generator::generate(FixtureSize::Tiny, 7).unwrap();
        doc["customers"][0]["loyalty_points"] = json!(12);

        let err = Fixture::from_raw(FixtureSize::Tiny, doc).unwrap_err();
        match err {
            StartupFixtureError::Diverges { size, loc } => {
                assert_eq!(size, FixtureSize::Tiny);
                assert_eq!(loc, "customers.0.loyalty_points");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_first_difference_locations() {
        let a = json!({"x": [1, {"y": 2}], "z": true});
        assert_eq!(first_difference(&a, &a, ""), None);
        assert_eq!(
            first_difference(&a, &json!({"x": [1, {"y": 3}], "z": true}), "").as_deref(),
            Some("x.1.y")
        );
        assert_eq!(first_difference(&a, &json!([]), "").as_deref(), Some("__root__"));
    }

    #[test]
    fn test_partial_store_lookup() {
        let store =
            FixtureStore::from_documents([(FixtureSize::Tiny, json!({"_id": "only"}))]).unwrap();

        assert!(store.raw(FixtureSize::Tiny).is_some());
        assert!(store.typed(FixtureSize::Large).is_none());
        assert!(!store.is_complete());
    }
}
