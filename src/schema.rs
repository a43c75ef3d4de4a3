// 📐 Shape Layer - Schema Validation
// Validates raw fixture documents against the business schema

use crate::model::BusinessRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// FIELD TABLES
// ============================================================================

/// Expected shape of a single value
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Str,
    /// Loosely typed: any JSON value, not inspected
    Any,
    Object(&'static [FieldSpec]),
    List(&'static Kind),
    /// Open-ended object with arbitrary values
    Map,
}

impl Kind {
    fn expected(&self) -> &'static str {
        match self {
            Kind::Str => "str",
            Kind::Any => "any",
            Kind::Object(_) | Kind::Map => "dict",
            Kind::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: Kind,
    /// Must be present
    pub required: bool,
    /// May be `null`
    pub nullable: bool,
}

const fn required(name: &'static str, kind: Kind) -> FieldSpec {
    FieldSpec { name, kind, required: true, nullable: false }
}

const fn optional(name: &'static str, kind: Kind) -> FieldSpec {
    FieldSpec { name, kind, required: false, nullable: true }
}

pub const SLOT_FIELDS: &[FieldSpec] = &[required("start", Kind::Str), required("end", Kind::Str)];

const SLOTS: Kind = Kind::List(&Kind::Object(SLOT_FIELDS));

pub const CALENDAR_FIELDS: &[FieldSpec] = &[
    required("Monday", SLOTS),
    required("Tuesday", SLOTS),
    required("Wednesday", SLOTS),
    required("Thursday", SLOTS),
    required("Friday", SLOTS),
    required("saturday", SLOTS),
    required("Sunday", SLOTS),
];

pub const CUSTOMER_FIELDS: &[FieldSpec] = &[
    required("customer_id", Kind::Str),
    required("mobile", Kind::Str),
    required("name", Kind::Str),
    optional("email", Kind::Any),
    optional("created_at", Kind::Str),
    optional("updated_at", Kind::Str),
    optional("dob", Kind::Any),
];

pub const READABLE_BOOKING_FIELDS: &[FieldSpec] = &[
    required("text", Kind::Str),
    required("post_back", Kind::Str),
];

pub const BOOKING_FIELDS: &[FieldSpec] = &[
    required("booking_id", Kind::Str),
    optional("customer_id", Kind::Str),
    optional("resource_id", Kind::Str),
    optional("service_id", Kind::Str),
    optional("service_name", Kind::Str),
    required("date", Kind::Str),
    required("start_time", Kind::Str),
    optional("end_time", Kind::Str),
    required("readable_booking", Kind::Str),
    optional("created_at", Kind::Str),
    optional("updated_at", Kind::Str),
    optional("num_of_customers", Kind::Any),
    required("status", Kind::Str),
    optional("readable_booking_with_id", Kind::Object(READABLE_BOOKING_FIELDS)),
];

pub const SERVICE_FIELDS: &[FieldSpec] = &[
    required("service_id", Kind::Str),
    required("name", Kind::Str),
    required("created_at", Kind::Str),
    required("updated_at", Kind::Str),
];

pub const RESOURCE_FIELDS: &[FieldSpec] = &[
    required("resource_id", Kind::Str),
    required("name", Kind::Str),
    required("capability", Kind::List(&Kind::Str)),
    required("availability_calendar", Kind::Object(CALENDAR_FIELDS)),
    required("OOO", Kind::Map),
];

pub const BUSINESS_FIELDS: &[FieldSpec] = &[
    required("_id", Kind::Str),
    optional("business_name", Kind::Str),
    optional("created_at", Kind::Str),
    optional("updated_at", Kind::Str),
    optional("customers", Kind::List(&Kind::Object(CUSTOMER_FIELDS))),
    optional("bookings", Kind::List(&Kind::Object(BOOKING_FIELDS))),
    optional("services", Kind::List(&Kind::Object(SERVICE_FIELDS))),
    optional("resources", Kind::List(&Kind::Object(RESOURCE_FIELDS))),
];

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted location, list indices included (e.g. `bookings.3.date`)
    pub loc: String,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.loc, self.msg, self.kind)
    }
}

/// A document did not match the business schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{} validation error(s) for BusinessRecord; first: {}",
    .errors.len(),
    first_error(.errors)
)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn first_error(errors: &[FieldError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.loc.as_str())
    }
}

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

/// Validate a raw document into a typed record.
///
/// The structural walk collects every offending field first; only a
/// conforming document is then deserialized (borrowing, no clone).
pub fn validate(doc: &Value) -> Result<BusinessRecord, ValidationError> {
    let errors = check(doc);
    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    BusinessRecord::deserialize(doc).map_err(|e| ValidationError {
        errors: vec![FieldError {
            loc: "__root__".to_string(),
            msg: e.to_string(),
            kind: "value_error".to_string(),
        }],
    })
}

/// Structural check only. Returns an empty list for a conforming document.
pub fn check(doc: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_kind(doc, &Kind::Object(BUSINESS_FIELDS), "", &mut errors);
    errors
}

fn check_kind(value: &Value, kind: &Kind, loc: &str, errors: &mut Vec<FieldError>) {
    match (kind, value) {
        (Kind::Any, _) => {}
        (Kind::Str, Value::String(_)) => {}
        (Kind::Map, Value::Object(_)) => {}
        (Kind::Object(fields), Value::Object(map)) => {
            for spec in fields.iter() {
                let field_loc = join(loc, spec.name);
                match map.get(spec.name) {
                    None if spec.required => errors.push(FieldError {
                        loc: field_loc,
                        msg: "field required".to_string(),
                        kind: "value_error.missing".to_string(),
                    }),
                    None => {}
                    Some(Value::Null) if spec.nullable => {}
                    Some(Value::Null) => errors.push(FieldError {
                        loc: field_loc,
                        msg: "none is not an allowed value".to_string(),
                        kind: "type_error.none.not_allowed".to_string(),
                    }),
                    Some(inner) => check_kind(inner, &spec.kind, &field_loc, errors),
                }
            }
        }
        (Kind::List(item), Value::Array(items)) => {
            for (i, inner) in items.iter().enumerate() {
                let item_loc = join(loc, &i.to_string());
                if inner.is_null() {
                    errors.push(FieldError {
                        loc: item_loc,
                        msg: "none is not an allowed value".to_string(),
                        kind: "type_error.none.not_allowed".to_string(),
                    });
                } else {
                    check_kind(inner, item, &item_loc, errors);
                }
            }
        }
        (kind, other) => errors.push(FieldError {
            loc: if loc.is_empty() { "__root__".to_string() } else { loc.to_string() },
            msg: format!("expected {}, got {}", kind.expected(), type_name(other)),
            kind: format!("type_error.{}", kind.expected()),
        }),
    }
}

pub(crate) fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ============================================================================
// TESTS
// ============================================================================
