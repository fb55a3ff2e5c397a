use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use freightdesk_common::booking::{BookingId, BookingStatus};
use freightdesk_common::export::export_booking;

use super::booking_state::use_bookings;
use super::browser;

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Read-only view of one booking with export and finalize actions.
#[component]
pub fn BookingDetail(id: BookingId, on_close: EventHandler<()>) -> Element {
    let mut bookings = use_bookings();
    let mut error = use_signal(|| None::<String>);

    let Some(booking) = bookings.read().get(&id).cloned() else {
        return rsx! {};
    };

    let export = {
        let booking = booking.clone();
        move |_| {
            let result = export_booking(&booking)
                .map_err(|e| e.to_string())
                .and_then(|file| browser::download(&file));
            match result {
                Ok(()) => error.set(None),
                Err(e) => {
                    tracing::error!("Export of {} failed: {e}", booking.reference_number);
                    error.set(Some("Export failed. Please try again.".into()));
                }
            }
        }
    };

    let finalize_id = id.clone();
    let finalize = move |_| match bookings.write().finalize(&finalize_id) {
        Ok(()) => {
            tracing::info!("Finalized booking {finalize_id}");
            on_close.call(());
        }
        Err(e) => {
            tracing::error!("Finalize of {finalize_id} failed: {e}");
            error.set(Some("Could not finalize this booking.".into()));
        }
    };

    let totals = booking.totals_by_currency();
    let can_finalize = booking.status == BookingStatus::New;
    let created = timestamp(&booking.created_at);

    rsx! {
        div { class: "detail-backdrop", onclick: move |_| on_close.call(()),
            div {
                class: "booking-detail",
                onclick: move |evt| evt.stop_propagation(),
                header { class: "detail-header",
                    div {
                        h2 { "{booking.reference_number}" }
                        span { class: "status-badge status-{booking.status.slug()}", "{booking.status}" }
                    }
                    button { class: "detail-close", onclick: move |_| on_close.call(()), "×" }
                }
                if let Some(msg) = error() {
                    p { class: "error", "{msg}" }
                }
                section { class: "detail-grid",
                    DetailField { label: "Customer", value: booking.customer_name.clone() }
                    DetailField { label: "Email", value: booking.customer_email.clone() }
                    DetailField { label: "Phone", value: booking.customer_phone.clone() }
                    DetailField { label: "Created", value: created }
                    DetailField { label: "Origin", value: booking.origin.clone() }
                    DetailField { label: "Destination", value: booking.destination.clone() }
                    DetailField { label: "Mode", value: booking.mode.to_string() }
                    DetailField { label: "Direction", value: booking.direction.to_string() }
                    DetailField { label: "Incoterm", value: booking.incoterm.clone() }
                    DetailField { label: "Vessel", value: booking.vessel.clone() }
                    DetailField { label: "Voyage", value: booking.voyage.clone() }
                    DetailField { label: "Air Waybill", value: booking.air_waybill.clone() }
                    DetailField { label: "Weight", value: format!("{} kg", booking.weight_kg) }
                    DetailField { label: "Dimensions", value: booking.dimensions.clone() }
                    DetailField { label: "Commodity", value: booking.commodity.clone() }
                }
                section { class: "detail-parties",
                    div {
                        h3 { "Shipper" }
                        p { "{booking.shipper_name}" }
                        p { class: "address", "{booking.shipper_address}" }
                    }
                    div {
                        h3 { "Consignee" }
                        p { "{booking.consignee_name}" }
                        p { class: "address", "{booking.consignee_address}" }
                    }
                }
                section { class: "detail-charges",
                    h3 { "Charges" }
                    if booking.charges.is_empty() {
                        p { class: "empty", "No charges recorded." }
                    } else {
                        table {
                            thead {
                                tr {
                                    th { "Code" }
                                    th { "Description" }
                                    th { "Qty" }
                                    th { "Unit" }
                                    th { "Unit Price" }
                                    th { "Total" }
                                }
                            }
                            tbody {
                                for (i, charge) in booking.charges.iter().enumerate() {
                                    tr { key: "{i}",
                                        td { "{charge.code}" }
                                        td { "{charge.description}" }
                                        td { "{charge.quantity}" }
                                        td { "{charge.unit}" }
                                        td { "{money(charge.unit_price)} {charge.currency}" }
                                        td { "{money(charge.total)} {charge.currency}" }
                                    }
                                }
                            }
                            tfoot {
                                for (currency, sum) in totals {
                                    tr { key: "{currency}", class: "subtotal",
                                        td { colspan: "5", "Subtotal {currency}" }
                                        td { "{money(sum)} {currency}" }
                                    }
                                }
                            }
                        }
                    }
                }
                section { class: "detail-timeline",
                    h3 { "Timeline" }
                    ul {
                        for (i, entry) in booking.timeline.iter().enumerate() {
                            li { key: "{i}",
                                span { class: "timeline-status", "{entry.status}" }
                                span { class: "timeline-time", " {timestamp(&entry.timestamp)} " }
                                span { class: "timeline-note", "{entry.note}" }
                            }
                        }
                    }
                }
                footer { class: "detail-actions",
                    button { onclick: export, "Export JSON" }
                    if can_finalize {
                        button { class: "primary", onclick: finalize, "Finalize Booking" }
                    }
                }
            }
        }
    }
}

#[component]
fn DetailField(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "detail-field",
            span { class: "label", "{label}" }
            span { class: "value", "{value}" }
        }
    }
}
