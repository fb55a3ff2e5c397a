use dioxus::prelude::*;

use freightdesk_common::intake::IntakeEngine;
use freightdesk_common::session::Screen;

use super::booking_state::load_bookings;
use super::browser;
use super::landing::LandingPage;
use super::login::LoginPage;
use super::ops_center::OpsCenter;
use super::session_state::{initial_screen, restore_session, visible_screen};

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[component]
pub fn App() -> Element {
    let mut screen = use_context_provider(|| Signal::new(initial_screen()));
    let session = use_context_provider(|| Signal::new(restore_session()));
    use_context_provider(|| Signal::new(load_bookings()));
    use_context_provider(|| Signal::new(IntakeEngine::new()));

    // Back/forward and hand-edited fragments.
    use_hook(move || {
        browser::on_fragment_change(move |fragment| {
            let target = Screen::from_fragment(&fragment);
            if *screen.peek() != target {
                screen.set(target);
            }
        });
    });

    let shown = visible_screen(screen, session);

    // Keep the address bar on the screen actually shown after the guard.
    use_effect(move || {
        browser::set_fragment(visible_screen(screen, session).fragment());
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        {match shown {
            Screen::Landing => rsx! { LandingPage {} },
            Screen::Login => rsx! { LoginPage {} },
            Screen::Dashboard => rsx! { OpsCenter {} },
        }}
    }
}

pub fn use_intake_engine() -> Signal<IntakeEngine> {
    use_context::<Signal<IntakeEngine>>()
}
