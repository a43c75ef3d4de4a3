// 🏭 Fixture Generator - Deterministic benchmark payloads
// Builds schema-conforming documents that reach a target serialized size

use crate::fixtures::FixtureSize;
use crate::model::{
    AvailabilityCalendar, Booking, BusinessRecord, Customer, Nullable, ReadableBookingWithId,
    Resource, Service, TimeSlot,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use std::path::Path;

pub const DEFAULT_SEED: u64 = 20221115;

const FIRST_NAMES: &[&str] = &["Ann", "Ben", "Chloe", "Dev", "Elena", "Farid", "Grace", "Hiro"];
const LAST_NAMES: &[&str] = &["Tan", "Lim", "Okafor", "Novak", "Silva", "Berg", "Kaur", "Mori"];
const SERVICE_NAMES: &[&str] = &["Haircut", "Shave", "Colour", "Wash", "Beard trim", "Styling"];
const CAPABILITIES: &[&str] = &["cut", "shave", "colour", "wash", "trim", "style"];
const STATUSES: &[&str] = &["confirmed", "cancelled", "completed", "no_show"];

/// Generate the document for `size`.
///
/// Entities are appended one at a time until the serialized length reaches
/// the size's nominal byte count, so the result slightly overshoots it.
pub fn generate(size: FixtureSize, seed: u64) -> Result<Value> {
    let record = generate_record(size, seed)?;
    Ok(record.to_json_value()?)
}

pub fn generate_record(size: FixtureSize, seed: u64) -> Result<BusinessRecord> {
    let mut factory = Generator::new(seed ^ size.target_bytes() as u64);
    let mut record = factory.business();
    let target = size.target_bytes();
    // the header already holds the four empty sequences
    let mut len = serde_json::to_vec(&record)?.len();

    let mut customers = Vec::new();
    let mut bookings = Vec::new();
    let mut services = Vec::new();
    let mut resources = Vec::new();

    let mut step = 0usize;
    while len < target {
        // customer, booking, booking, customer, booking, booking, ... with a
        // service every 8th step and a resource every 16th
        len += if step % 16 == 15 {
            push(&mut resources, factory.resource())?
        } else if step % 8 == 7 {
            push(&mut services, factory.service())?
        } else if step % 3 == 0 {
            push(&mut customers, factory.customer())?
        } else {
            let booking = factory.booking(&customers, &services, &resources);
            push(&mut bookings, booking)?
        };
        step += 1;
    }

    record.customers = Nullable::Present(customers);
    record.bookings = Nullable::Present(bookings);
    record.services = Nullable::Present(services);
    record.resources = Nullable::Present(resources);
    Ok(record)
}

/// Push an entity and return the bytes it adds (item plus separator)
fn push<T: serde::Serialize>(items: &mut Vec<T>, item: T) -> Result<usize> {
    let added = serde_json::to_vec(&item)?.len() + usize::from(!items.is_empty());
    items.push(item);
    Ok(added)
}

/// Write all four fixture files into `dir`
pub fn write_all(dir: impl AsRef<Path>, seed: u64) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create fixture directory {}", dir.display()))?;

    for size in FixtureSize::ALL {
        let doc = generate(size, seed)?;
        let path = dir.join(size.file_name());
        let bytes = serde_json::to_vec(&doc)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}

// ============================================================================
// GENERATOR
// ============================================================================

struct Generator {
    rng: StdRng,
    epoch: DateTime<Utc>,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Generator {
            rng: StdRng::seed_from_u64(seed),
            epoch: Utc
                .with_ymd_and_hms(2022, 11, 15, 14, 10, 15)
                .single()
                .unwrap_or_default(),
        }
    }

    fn object_id(&mut self) -> String {
        (0..24)
            .map(|_| char::from_digit(self.rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect()
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }

    fn timestamp(&mut self) -> String {
        let offset = Duration::minutes(self.rng.gen_range(0..60 * 24 * 365));
        (self.epoch - offset).to_rfc3339()
    }

    fn maybe_timestamp(&mut self) -> Nullable<String> {
        if self.rng.gen_bool(0.8) {
            Nullable::Present(self.timestamp())
        } else {
            Nullable::Null
        }
    }

    fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn business(&mut self) -> BusinessRecord {
        BusinessRecord {
            id: self.object_id(),
            business_name: Nullable::Present("Corner Barber Co".to_string()),
            created_at: Nullable::Present(self.timestamp()),
            updated_at: Nullable::Present(self.timestamp()),
            customers: Nullable::Present(Vec::new()),
            bookings: Nullable::Present(Vec::new()),
            services: Nullable::Present(Vec::new()),
            resources: Nullable::Present(Vec::new()),
        }
    }

    fn customer(&mut self) -> Customer {
        let name = self.person_name();
        let email = if self.rng.gen_bool(0.6) {
            Nullable::Present(json!(format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            )))
        } else {
            Nullable::Null
        };
        let dob = if self.rng.gen_bool(0.3) {
            Nullable::Present(json!(format!(
                "{}-{:02}-{:02}",
                self.rng.gen_range(1950..2005),
                self.rng.gen_range(1..=12),
                self.rng.gen_range(1..=28)
            )))
        } else {
            Nullable::Null
        };

        Customer {
            customer_id: self.object_id(),
            mobile: format!("+65{}", self.rng.gen_range(80_000_000..99_999_999)),
            name,
            email,
            created_at: self.maybe_timestamp(),
            updated_at: self.maybe_timestamp(),
            dob,
        }
    }

    fn booking(
        &mut self,
        customers: &[Customer],
        services: &[Service],
        resources: &[Resource],
    ) -> Booking {
        let customer_id = linked(&mut self.rng, customers, |c| &c.customer_id);
        let resource_id = linked(&mut self.rng, resources, |r| &r.resource_id);
        let service = services.choose(&mut self.rng).cloned();

        let day = self.epoch + Duration::days(self.rng.gen_range(0..90));
        let date = day.format("%Y-%m-%d").to_string();
        let hour = self.rng.gen_range(9..18);
        let start_time = format!("{:02}:00", hour);
        let end_time = format!("{:02}:00", hour + 1);
        let booking_id = self.object_id();
        let service_name = service.as_ref().map(|s| s.name.clone());
        let readable_booking = format!(
            "{} {} at {}",
            service_name.as_deref().unwrap_or("Appointment"),
            day.format("%a %d %b"),
            start_time
        );
        let readable_booking_with_id = if self.rng.gen_bool(0.5) {
            Nullable::Present(ReadableBookingWithId {
                text: readable_booking.clone(),
                post_back: format!("booking:{}", booking_id),
            })
        } else {
            Nullable::Null
        };

        Booking {
            booking_id,
            customer_id: customer_id.into(),
            resource_id: resource_id.into(),
            service_id: service.map(|s| s.service_id).into(),
            service_name: service_name.into(),
            date,
            start_time,
            end_time: Nullable::Present(end_time),
            readable_booking,
            created_at: self.maybe_timestamp(),
            updated_at: self.maybe_timestamp(),
            num_of_customers: if self.rng.gen_bool(0.7) {
                Nullable::Present(json!(self.rng.gen_range(1..4)))
            } else {
                Nullable::Null
            },
            status: self.pick(STATUSES),
            readable_booking_with_id,
        }
    }

    fn service(&mut self) -> Service {
        Service {
            service_id: self.object_id(),
            name: self.pick(SERVICE_NAMES),
            created_at: self.timestamp(),
            updated_at: self.timestamp(),
        }
    }

    fn slots(&mut self) -> Vec<TimeSlot> {
        let count = self.rng.gen_range(0..3);
        (0..count)
            .map(|i| {
                let start = 9 + i * 5;
                TimeSlot {
                    start: format!("{:02}:00", start),
                    end: format!("{:02}:00", start + 4),
                }
            })
            .collect()
    }

    fn resource(&mut self) -> Resource {
        let mut capability: Vec<String> = CAPABILITIES
            .choose_multiple(&mut self.rng, 2)
            .map(|c| c.to_string())
            .collect();
        capability.sort();

        let mut ooo = Map::new();
        if self.rng.gen_bool(0.5) {
            let day = self.epoch + Duration::days(self.rng.gen_range(0..60));
            ooo.insert(day.format("%Y-%m-%d").to_string(), json!({"reason": "leave"}));
        }

        Resource {
            resource_id: self.object_id(),
            name: format!("Chair {}", self.rng.gen_range(1..20)),
            capability,
            availability_calendar: AvailabilityCalendar {
                monday: self.slots(),
                tuesday: self.slots(),
                wednesday: self.slots(),
                thursday: self.slots(),
                friday: self.slots(),
                saturday: self.slots(),
                sunday: self.slots(),
            },
            ooo,
        }
    }
}

/// Pick an existing id, or none at all a fifth of the time
fn linked<T>(rng: &mut StdRng, items: &[T], id: impl Fn(&T) -> &String) -> Option<String> {
    if rng.gen_bool(0.2) {
        return None;
    }
    items.choose(rng).map(|item| id(item).clone())
}

// ============================================================================
// TESTS
// ============================================================================
