use dioxus::prelude::*;

use freightdesk_common::session::{Screen, Session};

use super::session_state::{log_in, navigate, use_screen, use_session};

#[component]
pub fn LoginPage() -> Element {
    let session = use_session();
    let screen = use_screen();
    let mut email_input = use_signal(String::new);
    let mut company_input = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let can_submit = use_memo(move || !email_input.read().trim().is_empty());

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        match Session::new(&email_input.read(), &company_input.read()) {
            Some(user) => {
                error.set(None);
                log_in(session, screen, user);
            }
            None => error.set(Some("Please enter a valid email address".into())),
        }
    };

    rsx! {
        div { class: "login-page",
            h1 { "Ops Center" }
            p { "Sign in to review and finalize bookings." }
            form { class: "login-form", onsubmit: submit,
                label {
                    "Email"
                    input {
                        r#type: "email",
                        value: "{email_input}",
                        oninput: move |evt| email_input.set(evt.value()),
                    }
                }
                label {
                    "Company"
                    input {
                        r#type: "text",
                        value: "{company_input}",
                        oninput: move |evt| company_input.set(evt.value()),
                    }
                }
                if let Some(msg) = error() {
                    p { class: "error", "{msg}" }
                }
                button { r#type: "submit", disabled: !can_submit(), "Sign in" }
            }
            button {
                class: "link-button",
                onclick: move |_| navigate(screen, Screen::Landing),
                "Back to site"
            }
        }
    }
}
