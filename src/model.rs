// 🧾 Response Model - Typed business records
// The strongly typed form of a fixture document.
//
// Loosely typed fields are kept as `serde_json::Value` on purpose: the fixture
// format does not guarantee their shape, so they are carried through unvalidated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// NULLABLE FIELDS
// ============================================================================

/// An optional field that remembers whether it was absent or `null`.
///
/// Absent fields are skipped on output and `null` is written back as `null`,
/// so a record re-encodes to the same keys it was read from. Every field of
/// this type carries `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nullable<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Present(value) => Some(value),
            Nullable::Absent | Nullable::Null => None,
        }
    }
}

/// `None` becomes an explicit `null`
impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Nullable::Null, Nullable::Present)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Present(value) => serializer.serialize_some(value),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}

// ============================================================================
// BUSINESS (root aggregate)
// ============================================================================

/// Root aggregate of a fixture document.
///
/// Aliasing rule: the identifier is `id` in Rust and `_id` on the wire, in
/// both directions. Optional fields keep the difference between absent and
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub business_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub created_at: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub updated_at: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub customers: Nullable<Vec<Customer>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub bookings: Nullable<Vec<Booking>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub services: Nullable<Vec<Service>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub resources: Nullable<Vec<Resource>>,
}

/// Number of entries in each sequence of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub customers: usize,
    pub bookings: usize,
    pub services: usize,
    pub resources: usize,
}

impl RecordCounts {
    /// Count the sequences of a raw document. Missing or non-array
    /// sequences count as empty.
    pub fn of_raw(doc: &Value) -> Self {
        let len = |key: &str| doc.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        RecordCounts {
            customers: len("customers"),
            bookings: len("bookings"),
            services: len("services"),
            resources: len("resources"),
        }
    }

    pub fn total(&self) -> usize {
        self.customers + self.bookings + self.services + self.resources
    }
}

impl BusinessRecord {
    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            customers: self.customers.as_option().map_or(0, Vec::len),
            bookings: self.bookings.as_option().map_or(0, Vec::len),
            services: self.services.as_option().map_or(0, Vec::len),
            resources: self.resources.as_option().map_or(0, Vec::len),
        }
    }

    /// Canonical JSON projection as a value tree (aliases applied)
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Canonical JSON projection as bytes (aliases applied)
    ///
    /// The buffer is pre-sized from the record counts so large documents do
    /// not grow it repeatedly.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size_hint());
        serde_json::to_writer(&mut buf, self)?;
        Ok(buf)
    }

    fn size_hint(&self) -> usize {
        let c = self.counts();
        256 + c.customers * 256 + c.bookings * 512 + c.services * 160 + c.resources * 1024
    }
}

// ============================================================================
// CUSTOMERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub mobile: String,
    pub name: String,

    /// Loosely typed
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub email: Nullable<Value>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub created_at: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub updated_at: Nullable<String>,

    /// Loosely typed
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub dob: Nullable<Value>,
}

// ============================================================================
// BOOKINGS
// ============================================================================

/// Display text of a booking together with its post-back payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadableBookingWithId {
    pub text: String,
    pub post_back: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,

    // Links are not checked against the other sequences
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub customer_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub resource_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub service_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub service_name: Nullable<String>,

    pub date: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub end_time: Nullable<String>,
    pub readable_booking: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub created_at: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub updated_at: Nullable<String>,

    /// Loosely typed
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub num_of_customers: Nullable<Value>,

    pub status: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub readable_booking_with_id: Nullable<ReadableBookingWithId>,
}

// ============================================================================
// SERVICES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub service_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

/// Weekly availability, one ordered list of slots per weekday.
///
/// The fixture format spells Saturday in lower case while every other day is
/// capitalised; the wire names are kept exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCalendar {
    #[serde(rename = "Monday")]
    pub monday: Vec<TimeSlot>,
    #[serde(rename = "Tuesday")]
    pub tuesday: Vec<TimeSlot>,
    #[serde(rename = "Wednesday")]
    pub wednesday: Vec<TimeSlot>,
    #[serde(rename = "Thursday")]
    pub thursday: Vec<TimeSlot>,
    #[serde(rename = "Friday")]
    pub friday: Vec<TimeSlot>,
    pub saturday: Vec<TimeSlot>,
    #[serde(rename = "Sunday")]
    pub sunday: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: String,
    pub name: String,
    pub capability: Vec<String>,
    pub availability_calendar: AvailabilityCalendar,

    /// Out-of-office entries, open-ended
    #[serde(rename = "OOO")]
    pub ooo: Map<String, Value>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Value {
        json!({
            "_id": "biz-1",
            "business_name": "Corner Barber",
            "created_at": "2022-11-15T14:10:15+00:00",
            "updated_at": null,
            "customers": [{
                "customer_id": "c1",
                "mobile": "+6591234567",
                "name": "Ann",
                "email": null,
                "created_at": null,
                "updated_at": null,
                "dob": {"year": 1990}
            }],
            "bookings": [],
            "services": null,
            "resources": [{
                "resource_id": "r1",
                "name": "Chair 1",
                "capability": ["cut"],
                "availability_calendar": {
                    "Monday": [{"start": "09:00", "end": "17:00"}],
                    "Tuesday": [], "Wednesday": [], "Thursday": [],
                    "Friday": [], "saturday": [], "Sunday": []
                },
                "OOO": {"2022-12-25": true}
            }]
        })
    }

    #[test]
    fn test_id_alias_round_trip() {
        let record: BusinessRecord = serde_json::from_value(sample_doc()).unwrap();
        assert_eq!(record.id, "biz-1");

        let out = record.to_json_value().unwrap();
        assert_eq!(out["_id"], "biz-1");
        assert!(out.get("id").is_none());
    }

    #[test]
    fn test_projection_matches_conforming_document() {
        let doc = sample_doc();
        let record: BusinessRecord = serde_json::from_value(doc.clone()).unwrap();

        assert_eq!(record.to_json_value().unwrap(), doc);

        let bytes = record.to_json_bytes().unwrap();
        let reparsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let mut doc = sample_doc();
        doc["extra"] = json!("not in schema");
        doc["customers"][0]["loyalty_points"] = json!(12);

        let record: BusinessRecord = serde_json::from_value(doc).unwrap();
        let out = record.to_json_value().unwrap();

        assert!(out.get("extra").is_none());
        assert!(out["customers"][0].get("loyalty_points").is_none());
    }

    #[test]
    fn test_absent_optionals_stay_absent() {
        let record: BusinessRecord = serde_json::from_value(json!({"_id": "x"})).unwrap();
        assert_eq!(record.business_name, Nullable::Absent);
        assert_eq!(record.to_json_value().unwrap(), json!({"_id": "x"}));
        assert_eq!(record.counts(), RecordCounts::default());
    }

    #[test]
    fn test_explicit_null_is_kept_apart_from_absent() {
        let doc = json!({
            "_id": "x",
            "services": null,
            "bookings": [{
                "booking_id": "1", "date": "d", "start_time": "s",
                "readable_booking": "r", "status": "ok", "num_of_customers": null
            }]
        });
        let record: BusinessRecord = serde_json::from_value(doc.clone()).unwrap();

        assert_eq!(record.services, Nullable::Null);
        assert_eq!(record.customers, Nullable::Absent);
        let booking = &record.bookings.as_option().unwrap()[0];
        assert_eq!(booking.num_of_customers, Nullable::Null);
        assert_eq!(booking.customer_id, Nullable::Absent);

        let out = record.to_json_value().unwrap();
        assert_eq!(out, doc);
        assert!(out["bookings"][0].get("end_time").is_none());
    }

    #[test]
    fn test_saturday_wire_name_is_lower_case() {
        let record: BusinessRecord = serde_json::from_value(sample_doc()).unwrap();
        let out = record.to_json_value().unwrap();
        let calendar = &out["resources"][0]["availability_calendar"];

        assert!(calendar.get("saturday").is_some());
        assert!(calendar.get("Saturday").is_none());
        assert!(calendar.get("Monday").is_some());
    }

    #[test]
    fn test_counts_agree_between_raw_and_typed() {
        let doc = sample_doc();
        let record: BusinessRecord = serde_json::from_value(doc.clone()).unwrap();

        let raw = RecordCounts::of_raw(&doc);
        assert_eq!(raw, record.counts());
        assert_eq!(raw.customers, 1);
        assert_eq!(raw.services, 0);
        assert_eq!(raw.total(), 2);
    }
}
