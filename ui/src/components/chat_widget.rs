use dioxus::prelude::*;

use freightdesk_common::intake::{
    run_turn, ChatRole, EngineCell, IntakeEndpoint, IntakeEngine, TurnOutcome, TRIGGER_WORD,
};
use freightdesk_common::llm::GeminiClient;

use super::app::use_intake_engine;
use super::browser::{clog, FetchTransport};
use super::config::client_config;
use super::markdown::render_markdown;

/// Delay before the assistant's opening message appears.
const GREETING_DELAY_MS: u32 = 600;

/// The intake engine behind its app-wide signal.
struct SignalEngine(Signal<IntakeEngine>);

impl EngineCell for SignalEngine {
    fn with_engine<R>(&mut self, f: impl FnOnce(&mut IntakeEngine) -> R) -> R {
        let mut engine = self.0.write();
        f(&mut *engine)
    }
}

fn send_message(engine: Signal<IntakeEngine>, mut draft: Signal<String>) {
    let text = draft.read().trim().to_string();
    if text.is_empty() || engine.read().is_busy() {
        return;
    }
    draft.set(String::new());

    spawn(async move {
        let config = client_config();
        let collaborator = GeminiClient::new(FetchTransport, &config);
        let endpoint = IntakeEndpoint::new(FetchTransport, &config);
        let mut cell = SignalEngine(engine);
        match run_turn(&mut cell, &text, &collaborator, &endpoint).await {
            Ok(TurnOutcome::Submitted(receipt)) => {
                clog(&format!("[INTAKE] Submitted as {}", receipt.reference));
            }
            Ok(_) => {}
            Err(e) => clog(&format!("[INTAKE] Input ignored: {e}")),
        }
    });
}

/// Floating booking assistant on the landing page.
#[component]
pub fn ChatWidget() -> Element {
    let mut engine = use_intake_engine();
    let mut open = use_signal(|| false);
    let mut draft = use_signal(String::new);

    // Leaving the page abandons any outstanding round trip.
    use_drop(move || engine.write().cancel());

    let toggle = move |_| {
        let now_open = !open();
        open.set(now_open);
        if !now_open {
            engine.write().cancel();
            return;
        }
        if engine.read().messages().is_empty() {
            spawn(async move {
                #[cfg(target_family = "wasm")]
                gloo_timers::future::TimeoutFuture::new(GREETING_DELAY_MS).await;
                #[cfg(not(target_family = "wasm"))]
                let _ = GREETING_DELAY_MS;
                engine.write().greet();
            });
        }
    };

    if !open() {
        return rsx! {
            button { class: "chat-launcher", onclick: toggle, "Book a shipment" }
        };
    }

    let state = engine.read();
    let messages = state.messages().to_vec();
    let busy = state.is_busy();
    let status_line = state.status_line().map(str::to_string);
    let submitting = status_line.is_some();
    let awaiting_confirmation = state.awaiting_confirmation();
    drop(state);

    rsx! {
        div { class: "chat-widget",
            div { class: "chat-header",
                span { "Booking assistant" }
                button { class: "chat-close", onclick: toggle, "×" }
            }
            div { class: "chat-messages",
                for (i, message) in messages.iter().enumerate() {
                    if message.role == ChatRole::User {
                        div { key: "{i}", class: "chat-message user", "{message.text}" }
                    } else {
                        div {
                            key: "{i}",
                            class: "chat-message assistant",
                            dangerous_inner_html: render_markdown(&message.text),
                        }
                    }
                }
                if busy && !submitting {
                    div { class: "chat-typing", "…" }
                }
                {status_line.map(|status| rsx! {
                    div { class: "chat-status", "{status}" }
                })}
            }
            if awaiting_confirmation && !busy {
                p { class: "chat-hint", "Type \"{TRIGGER_WORD}\" to submit your request." }
            }
            div { class: "chat-input",
                input {
                    r#type: "text",
                    placeholder: "Tell us about your shipment…",
                    disabled: busy,
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                    onkeypress: move |evt: KeyboardEvent| {
                        if evt.key() == Key::Enter {
                            send_message(engine, draft);
                        }
                    },
                }
                button {
                    disabled: busy,
                    onclick: move |_| send_message(engine, draft),
                    "Send"
                }
            }
        }
    }
}
