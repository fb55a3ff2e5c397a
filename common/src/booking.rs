use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of human-facing booking references (`BKG-2025-0042`).
pub const REFERENCE_PREFIX: &str = "BKG";

/// Opaque booking identifier, generated client-side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl BookingId {
    /// Timestamp plus random suffix, e.g. `bk-1718000000000-9f3a01c2`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix: u32 = rand::thread_rng().gen();
        BookingId(format!("bk-{}-{suffix:08x}", now.timestamp_millis()))
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a `PREFIX-YEAR-NNNN` reference number.
///
/// Random and unchecked: two bookings can share a reference.
pub fn generate_reference(now: DateTime<Utc>) -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{REFERENCE_PREFIX}-{}-{n:04}", now.year())
}

/// Booking status. The model admits every value; only New → Booked is
/// exposed as an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    New,
    #[serde(rename = "Quote Sent")]
    QuoteSent,
    Booked,
    #[serde(rename = "In Transit")]
    InTransit,
    Completed,
}

impl BookingStatus {
    pub fn all() -> &'static [BookingStatus] {
        &[
            BookingStatus::New,
            BookingStatus::QuoteSent,
            BookingStatus::Booked,
            BookingStatus::InTransit,
            BookingStatus::Completed,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::New => "New",
            BookingStatus::QuoteSent => "Quote Sent",
            BookingStatus::Booked => "Booked",
            BookingStatus::InTransit => "In Transit",
            BookingStatus::Completed => "Completed",
        }
    }

    /// Position in the forward progression New → Completed.
    pub fn ordinal(self) -> u8 {
        match self {
            BookingStatus::New => 0,
            BookingStatus::QuoteSent => 1,
            BookingStatus::Booked => 2,
            BookingStatus::InTransit => 3,
            BookingStatus::Completed => 4,
        }
    }

    /// CSS-friendly slug, e.g. `in-transit`.
    pub fn slug(self) -> &'static str {
        match self {
            BookingStatus::New => "new",
            BookingStatus::QuoteSent => "quote-sent",
            BookingStatus::Booked => "booked",
            BookingStatus::InTransit => "in-transit",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transport mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Sea,
    Air,
    Road,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sea => write!(f, "Sea"),
            Mode::Air => write!(f, "Air"),
            Mode::Road => write!(f, "Road"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Export,
    Import,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Export => write!(f, "Export"),
            Direction::Import => write!(f, "Import"),
        }
    }
}

/// One billable line on a booking.
///
/// `total` is expected to equal `quantity * unit_price`; only
/// [`ChargeItem::new`] guarantees it. The total is always finite, since a
/// non-finite number would be stored as `null` and fail to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeItem {
    pub code: String,
    pub description: String,
    pub quantity: f64,
    /// Unit of measure, e.g. "Container" or "KG".
    pub unit: String,
    pub unit_price: f64,
    pub currency: String,
    pub total: f64,
}

impl ChargeItem {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        unit_price: f64,
        currency: impl Into<String>,
    ) -> Self {
        let mut total = quantity * unit_price;
        if !total.is_finite() {
            tracing::warn!("Charge total {quantity} x {unit_price} overflows, storing 0");
            total = 0.0;
        }
        Self {
            code: code.into(),
            description: description.into(),
            quantity,
            unit: unit.into(),
            unit_price,
            currency: currency.into(),
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: BookingStatus,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

/// One shipment record ("jobsheet").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub reference_number: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,

    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,

    /// Free text, "Name (CODE)".
    pub origin: String,
    pub destination: String,
    pub mode: Mode,
    pub direction: Direction,
    pub incoterm: String,

    pub vessel: String,
    pub voyage: String,
    pub air_waybill: String,

    pub weight_kg: f64,
    pub dimensions: String,
    pub commodity: String,

    pub shipper_name: String,
    pub shipper_address: String,
    pub consignee_name: String,
    pub consignee_address: String,

    pub charges: Vec<ChargeItem>,
    pub timeline: Vec<TimelineEntry>,
}

impl Booking {
    /// "Origin → Destination" for list rows.
    pub fn route_label(&self) -> String {
        format!("{} → {}", self.origin, self.destination)
    }

    /// Sum of line totals per currency, in first-seen order. No conversion.
    pub fn totals_by_currency(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for charge in &self.charges {
            match totals.iter_mut().find(|(cur, _)| *cur == charge.currency) {
                Some((_, sum)) => *sum += charge.total,
                None => totals.push((charge.currency.clone(), charge.total)),
            }
        }
        totals
    }

    /// Case-insensitive substring match on customer name or reference.
    /// Whitespace in the query is significant.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.customer_name.to_lowercase().contains(&needle)
            || self.reference_number.to_lowercase().contains(&needle)
    }
}

/// The fixed record shown on first load.
pub fn seed_booking() -> Booking {
    let created_at = Utc
        .with_ymd_and_hms(2025, 1, 15, 9, 30, 0)
        .single()
        .unwrap_or_default();
    Booking {
        id: BookingId("bk-seed-0001".into()),
        reference_number: format!("{REFERENCE_PREFIX}-2025-0001"),
        status: BookingStatus::New,
        created_at,
        customer_name: "Acme Electronics Ltd".into(),
        customer_email: "logistics@acme-electronics.example".into(),
        customer_phone: "+86 21 5555 0100".into(),
        origin: "Shanghai (CNSHA)".into(),
        destination: "Rotterdam (NLRTM)".into(),
        mode: Mode::Sea,
        direction: Direction::Export,
        incoterm: "FOB".into(),
        vessel: "MSC AURORA".into(),
        voyage: "FA512W".into(),
        air_waybill: "N/A".into(),
        weight_kg: 12_500.0,
        dimensions: "1 x 40' HC".into(),
        commodity: "Consumer Electronics".into(),
        shipper_name: "Acme Electronics Ltd".into(),
        shipper_address: "88 Century Avenue, Pudong, Shanghai".into(),
        consignee_name: "EuroTech Distribution BV".into(),
        consignee_address: "Waalhaven 12, 3089 Rotterdam".into(),
        charges: vec![
            ChargeItem::new("OF", "Ocean Freight", 1.0, "Container", 2_450.0, "USD"),
            ChargeItem::new("THC", "Terminal Handling", 1.0, "Container", 180.0, "USD"),
            ChargeItem::new("DOC", "Documentation Fee", 1.0, "Set", 45.0, "EUR"),
        ],
        timeline: vec![TimelineEntry {
            status: BookingStatus::New,
            timestamp: created_at,
            note: "Booking created".into(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_display_label() {
        for status in BookingStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
        let parsed: BookingStatus = serde_json::from_str("\"In Transit\"").unwrap();
        assert_eq!(parsed, BookingStatus::InTransit);
    }

    #[test]
    fn status_ordinals_strictly_increase() {
        let ordinals: Vec<u8> = BookingStatus::all().iter().map(|s| s.ordinal()).collect();
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reference_has_prefix_year_and_four_digits() {
        let now = Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap();
        let reference = generate_reference(now);
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], REFERENCE_PREFIX);
        assert_eq!(parts[1], "2031");
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn generated_ids_differ() {
        let now = Utc::now();
        assert_ne!(BookingId::generate(now), BookingId::generate(now));
    }

    #[test]
    fn charge_item_new_computes_total() {
        let item = ChargeItem::new("OF", "Ocean Freight", 3.0, "Container", 150.0, "USD");
        assert_eq!(item.total, 450.0);
    }

    #[test]
    fn totals_group_by_currency_without_conversion() {
        let booking = seed_booking();
        assert_eq!(
            booking.totals_by_currency(),
            vec![("USD".to_string(), 2_630.0), ("EUR".to_string(), 45.0)]
        );
    }

    #[test]
    fn query_matches_customer_or_reference() {
        let booking = seed_booking();
        assert!(booking.matches_query("acme"));
        assert!(booking.matches_query("bkg-2025"));
        assert!(booking.matches_query(""));
        assert!(!booking.matches_query("rotterdam"));
    }

    #[test]
    fn query_whitespace_is_not_trimmed() {
        let mut booking = seed_booking();
        booking.customer_name = "Globex Corporate".into();
        booking.reference_number = "R1".into();
        assert!(!booking.matches_query(" "));
        assert!(!booking.matches_query(" globex"));
        assert!(booking.matches_query(" corp"));
        assert!(!booking.matches_query("r1 "));
    }

    #[test]
    fn overflowing_charge_total_is_stored_as_zero() {
        let charge = ChargeItem::new("OF", "Ocean Freight", 1e200, "Unit", 1e200, "USD");
        assert_eq!(charge.total, 0.0);
        assert_eq!(charge.quantity, 1e200);

        let normal = ChargeItem::new("OF", "Ocean Freight", 2.0, "Container", 1_225.0, "USD");
        assert_eq!(normal.total, 2_450.0);
    }

    #[test]
    fn seed_booking_has_single_creation_entry() {
        let booking = seed_booking();
        assert_eq!(booking.status, BookingStatus::New);
        assert_eq!(booking.timeline.len(), 1);
        assert_eq!(booking.timeline[0].status, BookingStatus::New);
    }
}
