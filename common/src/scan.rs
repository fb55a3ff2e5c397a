//! Document scan: one uploaded image or PDF becomes one new booking.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::booking::{
    generate_reference, Booking, BookingId, BookingStatus, ChargeItem, Direction, Mode,
    TimelineEntry,
};
use crate::error::ScanError;
use crate::llm::{number_field, text_field, Attachment, Collaborator, ExtractionRequest};

/// Placeholder for unknown text fields.
pub const TBD: &str = "TBD";
pub const DEFAULT_CUSTOMER: &str = "New Customer";
pub const DEFAULT_COMMODITY: &str = "General Cargo";
const DEFAULT_CHARGE_DESCRIPTION: &str = "Freight Charge";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_UNIT: &str = "Unit";

/// MIME types offered by the file picker.
pub const ACCEPTED_TYPES: &str = "image/*,application/pdf";

pub const SCAN_INSTRUCTION: &str = "You are reading a freight document (bill of lading, \
air waybill, commercial invoice, booking confirmation or quotation). Extract the shipment \
details into the given schema. Ports should be written as \"Name (UN/LOCODE)\" when the code \
is known. gross_weight is the total gross weight in kilograms as a number. List every \
freight charge line with its code, description, quantity, unit price and ISO currency code. \
Omit values that are not on the document.";

/// One file picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ScanFile {
    pub fn is_supported(&self) -> bool {
        is_supported_type(&self.mime_type)
    }
}

pub fn is_supported_type(mime_type: &str) -> bool {
    let mime = mime_type.trim().to_ascii_lowercase();
    mime.starts_with("image/") || mime == "application/pdf"
}

/// Response schema for the scan extraction.
pub fn scan_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let number = json!({ "type": "NUMBER" });
    json!({
        "type": "OBJECT",
        "properties": {
            "direction": { "type": "STRING", "enum": ["Export", "Import"] },
            "mode": { "type": "STRING", "enum": ["Sea", "Air"] },
            "shipper_name": string,
            "shipper_address": string,
            "consignee_name": string,
            "consignee_address": string,
            "origin_port": string,
            "destination_port": string,
            "gross_weight": number,
            "commodity": string,
            "freight_charges": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "charge_code": string,
                        "description": string,
                        "quantity": number,
                        "unit_price": number,
                        "currency": string,
                    }
                }
            }
        }
    })
}

/// Tracks the single in-flight scan. A second upload while one is running
/// is rejected instead of racing on the shared indicator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanGuard {
    in_flight: Option<String>,
}

impl ScanGuard {
    /// Claim the slot for `file_name`.
    pub fn begin(&mut self, file_name: &str) -> Result<(), ScanError> {
        if self.in_flight.is_some() {
            return Err(ScanError::Busy);
        }
        self.in_flight = Some(file_name.to_string());
        Ok(())
    }

    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Name of the file being scanned.
    pub fn current(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }
}

/// Send `file` to the collaborator and map the reply into a new booking.
///
/// Any failure aborts the whole scan; nothing partial is returned.
pub async fn scan_document<C: Collaborator>(
    collaborator: &C,
    file: &ScanFile,
    now: DateTime<Utc>,
) -> Result<Booking, ScanError> {
    if !file.is_supported() {
        return Err(ScanError::UnsupportedType(file.mime_type.clone()));
    }
    if file.bytes.is_empty() {
        return Err(ScanError::EmptyFile);
    }

    let attachment = Attachment::from_bytes(&file.mime_type, &file.bytes);
    let schema = scan_schema();
    tracing::debug!(file = %file.name, bytes = file.bytes.len(), "Scanning document");
    let extracted = collaborator
        .extract(ExtractionRequest {
            prompt: SCAN_INSTRUCTION,
            attachment: Some(&attachment),
            schema: &schema,
        })
        .await?;

    Ok(booking_from_scan(&extracted, &file.name, now))
}

/// Map a scan reply into a booking, filling placeholders for anything
/// missing. Charge totals are always recomputed as quantity × unit price.
pub fn booking_from_scan(value: &Value, file_name: &str, now: DateTime<Utc>) -> Booking {
    let text_or = |key: &str, default: &str| {
        let s = text_field(value, key);
        if s.is_empty() {
            default.to_string()
        } else {
            s
        }
    };

    let mode = if text_field(value, "mode").to_lowercase().contains("air") {
        Mode::Air
    } else {
        Mode::Sea
    };
    let direction = if text_field(value, "direction")
        .to_lowercase()
        .contains("import")
    {
        Direction::Import
    } else {
        Direction::Export
    };

    let shipper_name = text_or("shipper_name", TBD);
    let consignee_name = text_or("consignee_name", TBD);
    // The customer is our side of the trade lane.
    let customer = match direction {
        Direction::Export => text_field(value, "shipper_name"),
        Direction::Import => text_field(value, "consignee_name"),
    };
    let customer_name = if customer.is_empty() {
        DEFAULT_CUSTOMER.to_string()
    } else {
        customer
    };

    let charges = value
        .get("freight_charges")
        .and_then(Value::as_array)
        .map(|lines| lines.iter().map(charge_from_scan).collect())
        .unwrap_or_default();

    Booking {
        id: BookingId::generate(now),
        reference_number: generate_reference(now),
        status: BookingStatus::New,
        created_at: now,
        customer_name,
        customer_email: TBD.into(),
        customer_phone: TBD.into(),
        origin: text_or("origin_port", TBD),
        destination: text_or("destination_port", TBD),
        mode,
        direction,
        incoterm: TBD.into(),
        vessel: TBD.into(),
        voyage: TBD.into(),
        air_waybill: TBD.into(),
        weight_kg: number_field(value, "gross_weight").unwrap_or(0.0),
        dimensions: TBD.into(),
        commodity: text_or("commodity", DEFAULT_COMMODITY),
        shipper_name,
        shipper_address: text_or("shipper_address", TBD),
        consignee_name,
        consignee_address: text_or("consignee_address", TBD),
        charges,
        timeline: vec![TimelineEntry {
            status: BookingStatus::New,
            timestamp: now,
            note: format!("Created from scanned document {file_name}"),
        }],
    }
}

fn charge_from_scan(line: &Value) -> ChargeItem {
    let code = text_field(line, "charge_code");
    let description = text_field(line, "description");
    let currency = text_field(line, "currency");
    ChargeItem::new(
        if code.is_empty() { TBD.to_string() } else { code },
        if description.is_empty() {
            DEFAULT_CHARGE_DESCRIPTION.to_string()
        } else {
            description
        },
        number_field(line, "quantity").unwrap_or(1.0),
        DEFAULT_UNIT,
        number_field(line, "unit_price").unwrap_or(0.0),
        if currency.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            currency.to_uppercase()
        },
    )
}
