use dioxus::prelude::*;

use freightdesk_common::session::Screen;

use super::chat_widget::ChatWidget;
use super::session_state::{navigate, use_screen};

const SERVICES: [(&str, &str); 3] = [
    (
        "Sea Freight",
        "FCL and LCL sailings on the main east-west trade lanes, door to door.",
    ),
    (
        "Air Freight",
        "Consolidated and express air cargo with same-week departures.",
    ),
    (
        "Customs & Documentation",
        "Bills of lading, air waybills and customs filings handled in-house.",
    ),
];

#[component]
pub fn LandingPage() -> Element {
    let screen = use_screen();

    rsx! {
        div { class: "landing",
            header { class: "landing-header",
                h1 { "FreightDesk" }
                nav {
                    button {
                        class: "ops-link",
                        onclick: move |_| navigate(screen, Screen::Dashboard),
                        "Ops Center"
                    }
                }
            }
            section { class: "hero",
                h2 { "Freight forwarding without the email chains" }
                p {
                    "Tell our booking assistant where your cargo is going and we will "
                    "come back with a quote and a booking reference."
                }
            }
            section { class: "services",
                for (title, blurb) in SERVICES {
                    div { key: "{title}", class: "service-card",
                        h3 { "{title}" }
                        p { "{blurb}" }
                    }
                }
            }
            footer { class: "landing-footer", "© FreightDesk Logistics" }
            ChatWidget {}
        }
    }
}
