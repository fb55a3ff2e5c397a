use crate::booking::Booking;
use crate::error::StoreError;

/// A file ready for client-side download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// Pretty-printed JSON of one booking, named after its reference.
///
/// Contains nothing time-dependent, so exporting an unchanged record twice
/// gives identical bytes.
pub fn export_booking(booking: &Booking) -> Result<ExportedFile, StoreError> {
    let contents =
        serde_json::to_string_pretty(booking).map_err(|e| StoreError::Serialize(e.to_string()))?;
    Ok(ExportedFile {
        file_name: format!("{}.json", file_stem(&booking.reference_number)),
        mime_type: "application/json",
        contents,
    })
}

fn file_stem(reference: &str) -> String {
    let stem: String = reference
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "booking".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::seed_booking;

    #[test]
    fn file_named_after_reference() {
        let file = export_booking(&seed_booking()).unwrap();
        assert_eq!(file.file_name, "BKG-2025-0001.json");
        assert_eq!(file.mime_type, "application/json");
    }

    #[test]
    fn unsafe_reference_characters_are_replaced() {
        let mut booking = seed_booking();
        booking.reference_number = "BKG/2025 01".into();
        assert_eq!(export_booking(&booking).unwrap().file_name, "BKG_2025_01.json");
        booking.reference_number = "  ".into();
        assert_eq!(export_booking(&booking).unwrap().file_name, "booking.json");
    }

    #[test]
    fn export_is_byte_identical_and_parses_back() {
        let booking = seed_booking();
        let first = export_booking(&booking).unwrap();
        let second = export_booking(&booking).unwrap();
        assert_eq!(first.contents, second.contents);
        assert!(first.contents.contains('\n'));

        let parsed: Booking = serde_json::from_str(&first.contents).unwrap();
        assert_eq!(parsed, booking);
    }
}
