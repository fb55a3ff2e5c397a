use chrono::Utc;
use dioxus::prelude::*;

use freightdesk_common::booking::BookingId;
use freightdesk_common::error::ScanError;
use freightdesk_common::llm::GeminiClient;
use freightdesk_common::scan::{scan_document, ScanGuard, ACCEPTED_TYPES};

use super::booking_detail::BookingDetail;
use super::booking_state::use_bookings;
use super::browser::{self, FetchTransport};
use super::config::client_config;
use super::session_state::{log_out, use_screen, use_session};

const SCAN_INPUT_ID: &str = "scan-document-input";

const SCAN_FAILED: &str = "We couldn't read that document. Please try again.";
const SCAN_UNSUPPORTED: &str = "Please choose an image or a PDF file.";
const SCAN_BUSY: &str = "A document is already being scanned.";

fn scan_notice(err: &ScanError) -> &'static str {
    match err {
        ScanError::Busy => SCAN_BUSY,
        ScanError::UnsupportedType(_) => SCAN_UNSUPPORTED,
        ScanError::EmptyFile | ScanError::Collaborator(_) => SCAN_FAILED,
    }
}

/// Dashboard: search, booking table, document scan and detail panel.
#[component]
pub fn OpsCenter() -> Element {
    let mut bookings = use_bookings();
    let session = use_session();
    let screen = use_screen();

    let mut query = use_signal(String::new);
    let mut selected = use_signal(|| None::<BookingId>);
    let mut guard = use_signal(ScanGuard::default);
    let mut notice = use_signal(|| None::<String>);

    let start_scan = move |_| {
        spawn(async move {
            let file = match browser::read_selected_file(SCAN_INPUT_ID).await {
                Ok(Some(file)) => file,
                Ok(None) => return,
                Err(e) => {
                    tracing::error!("Failed to read selected file: {e}");
                    notice.set(Some(SCAN_FAILED.into()));
                    return;
                }
            };
            if let Err(e) = guard.write().begin(&file.name) {
                notice.set(Some(scan_notice(&e).into()));
                return;
            }
            notice.set(None);

            let config = client_config();
            let collaborator = GeminiClient::new(FetchTransport, &config);
            let result = scan_document(&collaborator, &file, Utc::now()).await;
            guard.write().finish();

            match result {
                Ok(booking) => match bookings.write().prepend(booking) {
                    Ok(id) => {
                        tracing::info!("Scanned {} into booking {id}", file.name);
                        selected.set(Some(id));
                    }
                    Err(e) => {
                        tracing::error!("Failed to store scanned booking: {e}");
                        notice.set(Some(SCAN_FAILED.into()));
                    }
                },
                Err(e) => {
                    tracing::error!("Scan of {} failed: {e}", file.name);
                    notice.set(Some(scan_notice(&e).into()));
                }
            }
        });
    };

    let company = session
        .read()
        .as_ref()
        .map(|s| s.display_name().to_string())
        .unwrap_or_default();
    let scanning = guard.read().current().map(str::to_string);
    let rows: Vec<_> = bookings
        .read()
        .filter(&query.read())
        .into_iter()
        .cloned()
        .collect();
    let total = bookings.read().len();

    rsx! {
        div { class: "ops-center",
            header { class: "ops-header",
                h1 { "Ops Center" }
                div { class: "user-info",
                    span { class: "company", "{company}" }
                    button { onclick: move |_| log_out(session, screen), "Log out" }
                }
            }
            div { class: "ops-toolbar",
                input {
                    r#type: "search",
                    placeholder: "Search by customer or reference…",
                    value: "{query}",
                    oninput: move |evt| query.set(evt.value()),
                }
                label { class: "scan-button",
                    "Scan Document"
                    input {
                        id: SCAN_INPUT_ID,
                        r#type: "file",
                        accept: ACCEPTED_TYPES,
                        disabled: scanning.is_some(),
                        onchange: start_scan,
                    }
                }
            }
            if let Some(msg) = notice() {
                div { class: "notice error",
                    span { "{msg}" }
                    button { onclick: move |_| notice.set(None), "Dismiss" }
                }
            }
            p { class: "result-count", "Showing {rows.len()} of {total} bookings" }
            table { class: "booking-table",
                thead {
                    tr {
                        th { "Reference" }
                        th { "Customer" }
                        th { "Route" }
                        th { "Mode" }
                        th { "Status" }
                    }
                }
                tbody {
                    for booking in rows {
                        {
                            let id = booking.id.clone();
                            rsx! {
                                tr {
                                    key: "{booking.id}",
                                    class: "booking-row",
                                    onclick: move |_| selected.set(Some(id.clone())),
                                    td { "{booking.reference_number}" }
                                    td { "{booking.customer_name}" }
                                    td { "{booking.route_label()}" }
                                    td { "{booking.mode}" }
                                    td {
                                        span { class: "status-badge status-{booking.status.slug()}",
                                            "{booking.status}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if let Some(file_name) = scanning {
                div { class: "scan-overlay",
                    div { class: "spinner" }
                    p { "Scanning {file_name}…" }
                }
            }
            if let Some(id) = selected() {
                BookingDetail { id, on_close: move |_| selected.set(None) }
            }
        }
    }
}
