//! Chat intake: a linear conversation that gathers shipment details through
//! the LLM, then, when the user types the trigger word, extracts a fixed set
//! of fields from the whole transcript and posts them to the intake endpoint.
//!
//! [`IntakeEngine`] is a plain state machine split into `begin_*`/`finish_*`
//! steps so the UI never holds a borrow across a network await. Each round
//! trip carries a [`Ticket`]; results for a ticket that is no longer current
//! (after [`IntakeEngine::cancel`]) are discarded.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::ClientConfig;
use crate::error::{IntakeError, SubmitError};
use crate::llm::{text_field, Collaborator, ExtractionRequest};
use crate::transport::HttpTransport;

/// User input that ends gathering and starts submission (case-insensitive).
pub const TRIGGER_WORD: &str = "confirm";

/// Marker the assistant appends once it has shown the summary.
pub const SENTINEL: &str = "[READY_TO_CONFIRM]";

pub const GREETING: &str = "Hi! I can get your shipment booked in a couple of minutes. \
What are you shipping, and where is it going from and to?";

pub const SUBMITTING_STATUS: &str = "Submitting your booking request…";

pub const CONNECTION_TROUBLE: &str =
    "Sorry, I'm having trouble connecting right now. Please try sending that again.";

pub const SUBMISSION_FAILED: &str = "Sorry, we couldn't submit your booking request. \
Please type \"confirm\" to try again.";

pub const SYSTEM_INSTRUCTION: &str = "You are the booking assistant of a freight forwarder. \
Collect the details needed to quote and book a shipment: customer name, company, email, \
phone, origin port, destination port, mode (Sea, Air or Road), container type, commodity, \
weight with unit, number of pieces, shipper name and address, consignee name and address, \
preferred shipping date and incoterm. Ask for missing details one or two at a time, \
keep replies short and friendly, and never invent values. When you have enough details, \
show a concise bullet summary, ask the user to type \"confirm\" to submit, and end that \
message with the exact marker [READY_TO_CONFIRM].";

const EXTRACTION_INSTRUCTION: &str = "Extract the shipment booking details from the \
conversation below between a customer and a booking assistant. Use the customer's latest \
answer when a detail was corrected. Leave a field as an empty string when it was never \
given. Do not invent values.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

pub fn is_trigger(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(TRIGGER_WORD)
}

/// Remove the sentinel from a reply. Returns the display text and whether
/// the sentinel was present.
pub fn strip_sentinel(reply: &str) -> (String, bool) {
    if reply.contains(SENTINEL) {
        (reply.replace(SENTINEL, "").trim().to_string(), true)
    } else {
        (reply.trim().to_string(), false)
    }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// Flat intake record posted to the intake endpoint. Every field is a
/// string; absent values are "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakePayload {
    pub customer_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub origin_port: String,
    pub destination_port: String,
    pub mode: String,
    pub container_type: String,
    pub commodity: String,
    pub weight_value: String,
    pub weight_unit: String,
    pub piece_count: String,
    pub shipper_name: String,
    pub shipper_address: String,
    pub consignee_name: String,
    pub consignee_address: String,
    pub preferred_date: String,
    pub incoterm: String,
}

impl IntakePayload {
    pub const FIELDS: [&'static str; 18] = [
        "customer_name",
        "company_name",
        "email",
        "phone",
        "origin_port",
        "destination_port",
        "mode",
        "container_type",
        "commodity",
        "weight_value",
        "weight_unit",
        "piece_count",
        "shipper_name",
        "shipper_address",
        "consignee_name",
        "consignee_address",
        "preferred_date",
        "incoterm",
    ];

    /// Build from an extraction reply, defaulting each missing field to "".
    pub fn from_extraction(value: &Value) -> Self {
        let f = |key: &str| text_field(value, key);
        Self {
            customer_name: f("customer_name"),
            company_name: f("company_name"),
            email: f("email"),
            phone: f("phone"),
            origin_port: f("origin_port"),
            destination_port: f("destination_port"),
            mode: f("mode"),
            container_type: f("container_type"),
            commodity: f("commodity"),
            weight_value: f("weight_value"),
            weight_unit: f("weight_unit"),
            piece_count: f("piece_count"),
            shipper_name: f("shipper_name"),
            shipper_address: f("shipper_address"),
            consignee_name: f("consignee_name"),
            consignee_address: f("consignee_address"),
            preferred_date: f("preferred_date"),
            incoterm: f("incoterm"),
        }
    }
}

/// Response schema for the confirmation extraction: one string per field.
pub fn extraction_schema() -> Value {
    let properties: Map<String, Value> = IntakePayload::FIELDS
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({ "type": "OBJECT", "properties": properties })
}

/// Extraction prompt carrying the entire transcript.
pub fn extraction_prompt(transcript: &[ChatMessage]) -> String {
    let mut prompt = String::from(EXTRACTION_INSTRUCTION);
    prompt.push_str("\n\nConversation:\n");
    for msg in transcript {
        let speaker = match msg.role {
            ChatRole::User => "Customer",
            ChatRole::Assistant => "Assistant",
        };
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&strip_sentinel(&msg.text).0);
        prompt.push('\n');
    }
    prompt
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference: String,
    /// The endpoint returned no reference; `reference` was generated locally.
    pub local_fallback: bool,
}

#[allow(async_fn_in_trait)]
pub trait Submitter {
    async fn submit(&self, payload: &IntakePayload) -> Result<SubmissionReceipt, SubmitError>;
}

/// HTTPS intake endpoint accepting the flat [`IntakePayload`] JSON.
pub struct IntakeEndpoint<T> {
    transport: T,
    url: String,
}

impl<T: HttpTransport> IntakeEndpoint<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            url: config.intake_url.clone(),
        }
    }
}

impl<T: HttpTransport> Submitter for IntakeEndpoint<T> {
    async fn submit(&self, payload: &IntakePayload) -> Result<SubmissionReceipt, SubmitError> {
        let body = serde_json::to_string(payload).map_err(|e| SubmitError::Encode(e.to_string()))?;
        tracing::debug!(url = %self.url, "Posting intake payload");
        let response = self.transport.post_json(&self.url, &body).await?;

        if !response.is_success() {
            tracing::error!(status = response.status, body = %response.body, "Intake endpoint error");
            return Err(SubmitError::Status {
                status: response.status,
                body: response.body,
            });
        }

        Ok(match reference_from_body(&response.body) {
            Some(reference) => SubmissionReceipt {
                reference,
                local_fallback: false,
            },
            None => {
                let reference = format!("LOCAL-{}", Utc::now().timestamp_millis());
                tracing::warn!("Intake response had no reference, using {reference}");
                SubmissionReceipt {
                    reference,
                    local_fallback: true,
                }
            }
        })
    }
}

/// Reference token from a 2xx body, under `reference_number` or `reference`.
pub fn reference_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["reference_number", "reference"]
        .iter()
        .map(|key| text_field(&value, key))
        .find(|s| !s.is_empty())
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Identifies one outstanding round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Conversing(Ticket),
    Submitting(Ticket),
}

/// Work the caller must perform after [`IntakeEngine::begin_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    /// Send the transcript (including the new user turn) to the chat prompt.
    Converse {
        ticket: Ticket,
        transcript: Vec<ChatMessage>,
    },
    /// Extract from the transcript gathered before the trigger, then submit.
    Submit {
        ticket: Ticket,
        transcript: Vec<ChatMessage>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied,
    Submitted(SubmissionReceipt),
    Failed,
    /// The result arrived for a cancelled or superseded turn.
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeEngine {
    messages: Vec<ChatMessage>,
    phase: Phase,
    status_line: Option<String>,
    awaiting_confirmation: bool,
    generation: u64,
}

impl IntakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Transient status shown while a submission is in flight.
    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    /// The last reply carried the sentinel; the UI may hint at the trigger.
    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Append the greeting if nothing has been said yet.
    pub fn greet(&mut self) -> bool {
        if !self.messages.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::assistant(GREETING));
        true
    }

    pub fn begin_turn(&mut self, input: &str) -> Result<TurnPlan, IntakeError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(IntakeError::EmptyInput);
        }
        if self.is_busy() {
            return Err(IntakeError::Busy);
        }

        self.generation += 1;
        let ticket = Ticket(self.generation);

        if is_trigger(text) {
            let transcript = self.messages.clone();
            self.messages.push(ChatMessage::user(text));
            self.status_line = Some(SUBMITTING_STATUS.to_string());
            self.phase = Phase::Submitting(ticket);
            Ok(TurnPlan::Submit { ticket, transcript })
        } else {
            self.messages.push(ChatMessage::user(text));
            self.phase = Phase::Conversing(ticket);
            Ok(TurnPlan::Converse {
                ticket,
                transcript: self.messages.clone(),
            })
        }
    }

    pub fn finish_converse<E>(&mut self, ticket: Ticket, reply: Result<String, E>) -> TurnOutcome {
        if self.phase != Phase::Conversing(ticket) {
            return TurnOutcome::Discarded;
        }
        self.phase = Phase::Idle;

        let Ok(reply) = reply else {
            self.awaiting_confirmation = false;
            self.messages.push(ChatMessage::assistant(CONNECTION_TROUBLE));
            return TurnOutcome::Failed;
        };

        let (text, ready) = strip_sentinel(&reply);
        self.awaiting_confirmation = ready;
        if text.is_empty() {
            if ready {
                self.messages.push(ChatMessage::assistant(format!(
                    "Type \"{TRIGGER_WORD}\" to submit your booking request."
                )));
                return TurnOutcome::Replied;
            }
            self.messages.push(ChatMessage::assistant(CONNECTION_TROUBLE));
            return TurnOutcome::Failed;
        }
        self.messages.push(ChatMessage::assistant(text));
        TurnOutcome::Replied
    }

    pub fn finish_submission<E>(
        &mut self,
        ticket: Ticket,
        result: Result<SubmissionReceipt, E>,
    ) -> TurnOutcome {
        if self.phase != Phase::Submitting(ticket) {
            return TurnOutcome::Discarded;
        }
        self.phase = Phase::Idle;
        self.status_line = None;

        match result {
            Ok(receipt) => {
                self.awaiting_confirmation = false;
                self.messages.push(ChatMessage::assistant(format!(
                    "Your booking request has been submitted. Your reference number is **{}**. \
                     Our team will be in touch shortly.",
                    receipt.reference
                )));
                TurnOutcome::Submitted(receipt)
            }
            Err(_) => {
                self.messages.push(ChatMessage::assistant(SUBMISSION_FAILED));
                TurnOutcome::Failed
            }
        }
    }

    /// Abandon the outstanding round trip; its result will be discarded.
    pub fn cancel(&mut self) {
        if self.is_busy() {
            tracing::debug!("Cancelling outstanding intake round trip");
        }
        self.phase = Phase::Idle;
        self.status_line = None;
    }
}

/// Mutable access to an engine that may live behind a reactive cell.
pub trait EngineCell {
    fn with_engine<R>(&mut self, f: impl FnOnce(&mut IntakeEngine) -> R) -> R;
}

impl EngineCell for IntakeEngine {
    fn with_engine<R>(&mut self, f: impl FnOnce(&mut IntakeEngine) -> R) -> R {
        f(self)
    }
}

/// Extract the intake fields from `transcript` and submit them.
pub async fn submit_transcript<C, S>(
    transcript: &[ChatMessage],
    collaborator: &C,
    submitter: &S,
) -> Result<SubmissionReceipt, IntakeError>
where
    C: Collaborator,
    S: Submitter,
{
    let schema = extraction_schema();
    let prompt = extraction_prompt(transcript);
    let extracted = collaborator
        .extract(ExtractionRequest {
            prompt: &prompt,
            attachment: None,
            schema: &schema,
        })
        .await?;
    let payload = IntakePayload::from_extraction(&extracted);
    Ok(submitter.submit(&payload).await?)
}

/// Process one user input end to end.
///
/// Gathering input costs exactly one `converse` call; the trigger word costs
/// one `extract` call followed by one `submit` call. Round-trip failures are
/// reported in the transcript, not as `Err`.
pub async fn run_turn<E, C, S>(
    cell: &mut E,
    input: &str,
    collaborator: &C,
    submitter: &S,
) -> Result<TurnOutcome, IntakeError>
where
    E: EngineCell,
    C: Collaborator,
    S: Submitter,
{
    let plan = cell.with_engine(|engine| engine.begin_turn(input))?;
    let outcome = match plan {
        TurnPlan::Converse { ticket, transcript } => {
            let reply = collaborator.converse(SYSTEM_INSTRUCTION, &transcript).await;
            if let Err(e) = &reply {
                tracing::error!("Chat turn failed: {e}");
            }
            cell.with_engine(|engine| engine.finish_converse(ticket, reply))
        }
        TurnPlan::Submit { ticket, transcript } => {
            let result = submit_transcript(&transcript, collaborator, submitter).await;
            match &result {
                Ok(receipt) => tracing::info!("Intake submitted, reference {}", receipt.reference),
                Err(e) => tracing::error!("Intake submission failed: {e}"),
            }
            cell.with_engine(|engine| engine.finish_submission(ticket, result))
        }
    };
    if outcome == TurnOutcome::Discarded {
        tracing::debug!("Discarded result of a cancelled intake turn");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(reference: &str) -> Result<SubmissionReceipt, ()> {
        Ok(SubmissionReceipt {
            reference: reference.into(),
            local_fallback: false,
        })
    }

    #[test]
    fn trigger_is_case_insensitive_exact_word() {
        assert!(is_trigger("confirm"));
        assert!(is_trigger("CONFIRM"));
        assert!(is_trigger("  Confirm \n"));
        assert!(!is_trigger("confirmed"));
        assert!(!is_trigger("please confirm"));
        assert!(!is_trigger(""));
    }

    #[test]
    fn sentinel_is_stripped_and_reported() {
        let (text, ready) = strip_sentinel("Summary:\n- Sea\nType confirm. [READY_TO_CONFIRM]");
        assert_eq!(text, "Summary:\n- Sea\nType confirm.");
        assert!(ready);

        let (text, ready) = strip_sentinel(" Which port? ");
        assert_eq!(text, "Which port?");
        assert!(!ready);
    }

    #[test]
    fn greet_only_on_empty_transcript() {
        let mut engine = IntakeEngine::new();
        assert!(engine.greet());
        assert!(!engine.greet());
        assert_eq!(engine.messages(), &[ChatMessage::assistant(GREETING)]);
    }

    #[test]
    fn gathering_turn_sends_full_transcript() {
        let mut engine = IntakeEngine::new();
        engine.greet();
        let plan = engine.begin_turn("Shanghai to Rotterdam").unwrap();
        let TurnPlan::Converse { ticket, transcript } = plan else {
            panic!("expected converse plan");
        };
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1], ChatMessage::user("Shanghai to Rotterdam"));
        assert!(engine.is_busy());

        let outcome = engine.finish_converse::<()>(ticket, Ok("What cargo? [READY_TO_CONFIRM]".into()));
        assert_eq!(outcome, TurnOutcome::Replied);
        assert!(!engine.is_busy());
        assert!(engine.awaiting_confirmation());
        assert_eq!(engine.messages()[2], ChatMessage::assistant("What cargo?"));
    }

    #[test]
    fn empty_input_and_busy_are_rejected() {
        let mut engine = IntakeEngine::new();
        assert_eq!(engine.begin_turn("   "), Err(IntakeError::EmptyInput));
        engine.begin_turn("hello").unwrap();
        assert_eq!(engine.begin_turn("again"), Err(IntakeError::Busy));
        assert_eq!(engine.begin_turn("confirm"), Err(IntakeError::Busy));
    }

    #[test]
    fn trigger_snapshots_transcript_before_the_trigger() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Converse { ticket, .. } = engine.begin_turn("2 pallets").unwrap() else {
            panic!("expected converse plan");
        };
        engine.finish_converse::<()>(ticket, Ok("Got it".into()));

        let plan = engine.begin_turn("CONFIRM").unwrap();
        let TurnPlan::Submit { transcript, .. } = plan else {
            panic!("expected submit plan");
        };
        assert_eq!(
            transcript,
            vec![ChatMessage::user("2 pallets"), ChatMessage::assistant("Got it")]
        );
        assert_eq!(engine.status_line(), Some(SUBMITTING_STATUS));
        assert_eq!(engine.messages().last(), Some(&ChatMessage::user("CONFIRM")));
    }

    #[test]
    fn successful_submission_reports_reference_and_clears_status() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Submit { ticket, .. } = engine.begin_turn("confirm").unwrap() else {
            panic!("expected submit plan");
        };
        let outcome = engine.finish_submission(ticket, receipt("FD-123"));
        assert!(matches!(outcome, TurnOutcome::Submitted(r) if r.reference == "FD-123"));
        assert_eq!(engine.status_line(), None);
        assert!(engine.messages().last().unwrap().text.contains("FD-123"));
    }

    #[test]
    fn failed_submission_allows_retry() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Submit { ticket, .. } = engine.begin_turn("confirm").unwrap() else {
            panic!("expected submit plan");
        };
        let before = engine.messages().to_vec();
        let outcome = engine.finish_submission::<()>(ticket, Err(()));
        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(engine.status_line(), None);
        assert_eq!(&engine.messages()[..before.len()], before.as_slice());
        assert_eq!(engine.messages().last(), Some(&ChatMessage::assistant(SUBMISSION_FAILED)));

        assert!(matches!(engine.begin_turn("confirm"), Ok(TurnPlan::Submit { .. })));
    }

    #[test]
    fn failed_chat_turn_appends_apology() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Converse { ticket, .. } = engine.begin_turn("hi").unwrap() else {
            panic!("expected converse plan");
        };
        assert_eq!(engine.finish_converse(ticket, Err("offline")), TurnOutcome::Failed);
        assert_eq!(engine.messages().last(), Some(&ChatMessage::assistant(CONNECTION_TROUBLE)));
    }

    #[test]
    fn failed_chat_turn_clears_confirmation_hint() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Converse { ticket, .. } = engine.begin_turn("hi").unwrap() else {
            panic!("expected converse plan");
        };
        engine.finish_converse::<()>(ticket, Ok(format!("All set. {SENTINEL}")));
        assert!(engine.awaiting_confirmation());

        let TurnPlan::Converse { ticket, .. } = engine.begin_turn("one more thing").unwrap() else {
            panic!("expected converse plan");
        };
        assert_eq!(engine.finish_converse(ticket, Err("offline")), TurnOutcome::Failed);
        assert!(!engine.awaiting_confirmation());
    }

    #[test]
    fn cancelled_submission_result_is_discarded() {
        let mut engine = IntakeEngine::new();
        engine.greet();
        let TurnPlan::Submit { ticket, .. } = engine.begin_turn("confirm").unwrap() else {
            panic!("expected submit plan");
        };
        assert_eq!(engine.status_line(), Some(SUBMITTING_STATUS));
        let before = engine.messages().to_vec();

        engine.cancel();
        assert!(!engine.is_busy());
        assert_eq!(engine.status_line(), None);

        assert_eq!(engine.finish_submission(ticket, receipt("FD-LATE")), TurnOutcome::Discarded);
        assert_eq!(engine.messages(), before.as_slice());
        assert!(!engine.messages().iter().any(|m| m.text.contains("FD-LATE")));
        assert_eq!(engine.status_line(), None);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn cancelled_turn_result_is_discarded() {
        let mut engine = IntakeEngine::new();
        let TurnPlan::Converse { ticket: stale, .. } = engine.begin_turn("hi").unwrap() else {
            panic!("expected converse plan");
        };
        engine.cancel();
        assert!(!engine.is_busy());

        let TurnPlan::Converse { ticket: current, .. } = engine.begin_turn("hello?").unwrap() else {
            panic!("expected converse plan");
        };
        assert_eq!(engine.finish_converse::<()>(stale, Ok("late".into())), TurnOutcome::Discarded);
        assert!(engine.is_busy());
        assert_eq!(engine.finish_converse::<()>(current, Ok("fresh".into())), TurnOutcome::Replied);
        assert_eq!(engine.messages().last(), Some(&ChatMessage::assistant("fresh")));
        assert!(!engine.messages().iter().any(|m| m.text == "late"));
    }

    #[test]
    fn payload_from_empty_extraction_has_all_fields_empty() {
        let payload = IntakePayload::from_extraction(&json!({}));
        assert_eq!(payload, IntakePayload::default());

        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 18);
        for field in IntakePayload::FIELDS {
            assert_eq!(obj[field], json!(""), "field {field}");
        }
    }

    #[test]
    fn payload_reads_strings_and_numbers() {
        let payload = IntakePayload::from_extraction(&json!({
            "customer_name": "Li Wei",
            "weight_value": 1200,
            "piece_count": "2",
            "mode": null,
        }));
        assert_eq!(payload.customer_name, "Li Wei");
        assert_eq!(payload.weight_value, "1200");
        assert_eq!(payload.piece_count, "2");
        assert_eq!(payload.mode, "");
    }

    #[test]
    fn schema_declares_every_field_as_string() {
        let schema = extraction_schema();
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), IntakePayload::FIELDS.len());
        assert!(props.values().all(|p| p["type"] == "STRING"));
    }

    #[test]
    fn extraction_prompt_contains_every_turn_without_sentinel() {
        let prompt = extraction_prompt(&[
            ChatMessage::user("Shanghai to Rotterdam"),
            ChatMessage::assistant("Summary ... [READY_TO_CONFIRM]"),
        ]);
        assert!(prompt.contains("Customer: Shanghai to Rotterdam"));
        assert!(prompt.contains("Assistant: Summary ..."));
        assert!(!prompt.contains(SENTINEL));
    }

    #[test]
    fn reference_read_from_either_key() {
        assert_eq!(
            reference_from_body(r#"{"reference_number": "FD-1"}"#).as_deref(),
            Some("FD-1")
        );
        assert_eq!(reference_from_body(r#"{"reference": 42}"#).as_deref(), Some("42"));
        assert_eq!(reference_from_body(r#"{"reference": ""}"#), None);
        assert_eq!(reference_from_body("OK"), None);
        assert_eq!(reference_from_body(""), None);
    }
}
