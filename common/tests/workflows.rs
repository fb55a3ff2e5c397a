//! End-to-end intake, scan and store workflows against a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::{TimeZone, Utc};
use futures::executor::block_on;
use serde_json::{json, Value};

use freightdesk_common::booking::{BookingStatus, Mode};
use freightdesk_common::config::ClientConfig;
use freightdesk_common::error::{ScanError, TransportError};
use freightdesk_common::intake::{
    run_turn, ChatMessage, IntakeEngine, IntakeEndpoint, IntakePayload, TurnOutcome,
    SUBMISSION_FAILED,
};
use freightdesk_common::llm::GeminiClient;
use freightdesk_common::scan::{scan_document, ScanFile, ScanGuard};
use freightdesk_common::storage::MemoryStore;
use freightdesk_common::store::BookingStore;
use freightdesk_common::transport::{HttpResponse, HttpTransport};

const LLM_BASE: &str = "http://llm.test/v1beta";
const INTAKE_URL: &str = "http://intake.test/bookings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Converse,
    Extract,
    Submit,
}

/// Replays queued responses in order and records what was sent.
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: RefCell<Vec<(Call, Value)>>,
}

impl ScriptedTransport {
    fn reply(self, status: u16, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    fn fail(self, reason: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(reason.to_string())));
        self
    }

    fn call_kinds(&self) -> Vec<Call> {
        self.calls.borrow().iter().map(|(c, _)| *c).collect()
    }

    fn body_of(&self, kind: Call) -> Value {
        self.calls
            .borrow()
            .iter()
            .find(|(c, _)| *c == kind)
            .map(|(_, b)| b.clone())
            .expect("call not made")
    }
}

impl HttpTransport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let body: Value = serde_json::from_str(body).unwrap();
        let kind = if url.starts_with(INTAKE_URL) {
            Call::Submit
        } else if body.get("generation_config").is_some() {
            Call::Extract
        } else {
            Call::Converse
        };
        self.calls.borrow_mut().push((kind, body));
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected extra request")
    }
}

fn config() -> ClientConfig {
    ClientConfig::from_values(Some("k"), None, Some(LLM_BASE), Some(INTAKE_URL))
}

fn model_text(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

#[test]
fn confirm_runs_converse_then_extract_then_submit() {
    let transport = ScriptedTransport::default()
        .reply(200, model_text("Great, what is the weight? [READY_TO_CONFIRM]"))
        .reply(200, model_text(r#"{"origin_port": "Shanghai (CNSHA)", "destination_port": "Rotterdam (NLRTM)", "piece_count": "2", "commodity": "electronics"}"#))
        .reply(200, json!({ "reference_number": "FD-2025-77" }));
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let endpoint = IntakeEndpoint::new(&transport, &cfg);
    let mut engine = IntakeEngine::new();

    let first = block_on(run_turn(
        &mut engine,
        "Shanghai to Rotterdam, 2 pallets electronics",
        &llm,
        &endpoint,
    ))
    .unwrap();
    assert_eq!(first, TurnOutcome::Replied);
    assert!(engine.awaiting_confirmation());
    assert_eq!(transport.call_kinds(), vec![Call::Converse]);

    let second = block_on(run_turn(&mut engine, "CoNfIrM", &llm, &endpoint)).unwrap();
    assert!(matches!(second, TurnOutcome::Submitted(ref r) if r.reference == "FD-2025-77"));
    assert_eq!(
        transport.call_kinds(),
        vec![Call::Converse, Call::Extract, Call::Submit]
    );

    // The extraction prompt saw the whole session.
    let extract = transport.body_of(Call::Extract);
    let prompt = extract["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Shanghai to Rotterdam, 2 pallets electronics"));
    assert!(prompt.contains("Great, what is the weight?"));

    let submitted = transport.body_of(Call::Submit);
    assert_eq!(submitted["origin_port"], "Shanghai (CNSHA)");
    assert_eq!(submitted["piece_count"], "2");
    assert_eq!(submitted["email"], "");

    let last = engine.messages().last().unwrap();
    assert!(last.text.contains("FD-2025-77"));
    assert_eq!(engine.status_line(), None);
    assert!(!engine.is_busy());
}

#[test]
fn empty_extraction_submits_all_fields_as_empty_strings() {
    let transport = ScriptedTransport::default()
        .reply(200, model_text("{}"))
        .reply(201, json!({ "status": "queued" }));
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let endpoint = IntakeEndpoint::new(&transport, &cfg);
    let mut engine = IntakeEngine::new();

    let outcome = block_on(run_turn(&mut engine, "confirm", &llm, &endpoint)).unwrap();
    let TurnOutcome::Submitted(receipt) = outcome else {
        panic!("expected submission, got {outcome:?}");
    };
    assert!(receipt.local_fallback);
    assert!(receipt.reference.starts_with("LOCAL-"));

    let submitted = transport.body_of(Call::Submit);
    let obj = submitted.as_object().unwrap();
    assert_eq!(obj.len(), 18);
    for field in IntakePayload::FIELDS {
        assert_eq!(obj[field], json!(""), "field {field}");
    }
}

#[test]
fn rejected_submission_reports_failure_and_allows_retry() {
    let transport = ScriptedTransport::default()
        .reply(200, model_text(r#"{"customer_name": "Li"}"#))
        .reply(500, json!({ "error": "database down" }))
        .reply(200, model_text(r#"{"customer_name": "Li"}"#))
        .reply(200, json!({ "reference": "FD-9" }));
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let endpoint = IntakeEndpoint::new(&transport, &cfg);
    let mut engine = IntakeEngine::new();

    let outcome = block_on(run_turn(&mut engine, "confirm", &llm, &endpoint)).unwrap();
    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(
        engine.messages().last(),
        Some(&ChatMessage::assistant(SUBMISSION_FAILED))
    );
    assert!(!engine.messages().iter().any(|m| m.text.contains("database down")));
    assert_eq!(engine.status_line(), None);

    let retry = block_on(run_turn(&mut engine, "confirm", &llm, &endpoint)).unwrap();
    assert!(matches!(retry, TurnOutcome::Submitted(ref r) if r.reference == "FD-9"));
}

#[test]
fn network_failure_during_extraction_skips_submission() {
    let transport = ScriptedTransport::default().fail("connection reset");
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let endpoint = IntakeEndpoint::new(&transport, &cfg);
    let mut engine = IntakeEngine::new();

    let outcome = block_on(run_turn(&mut engine, "confirm", &llm, &endpoint)).unwrap();
    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(transport.call_kinds(), vec![Call::Extract]);
}

#[test]
fn scanned_document_becomes_newest_booking() {
    let transport = ScriptedTransport::default().reply(
        200,
        model_text(
            r#"{"mode": "AIR", "direction": "Export", "shipper_name": "Acme",
                "origin_port": "Hong Kong (HKHKG)", "gross_weight": 340.5,
                "freight_charges": [{"charge_code": "OF", "quantity": 2, "unit_price": 100, "currency": "USD", "total": 1}]}"#,
        ),
    );
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let mut store = BookingStore::load(MemoryStore::new());
    let mut guard = ScanGuard::default();
    let file = ScanFile {
        name: "awb.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.7".to_vec(),
    };
    let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();

    guard.begin(&file.name).unwrap();
    let booking = block_on(scan_document(&llm, &file, now)).unwrap();
    guard.finish();
    let id = store.prepend(booking).unwrap();

    assert_eq!(store.len(), 2);
    let newest = &store.list()[0];
    assert_eq!(newest.id, id);
    assert_eq!(newest.mode, Mode::Air);
    assert_eq!(newest.customer_name, "Acme");
    assert_eq!(newest.weight_kg, 340.5);
    assert_eq!(newest.charges[0].total, 200.0);
    assert_eq!(newest.status, BookingStatus::New);

    let request = transport.body_of(Call::Extract);
    assert_eq!(
        request["contents"][0]["parts"][1]["inline_data"]["mime_type"],
        "application/pdf"
    );
}

#[test]
fn failed_scan_leaves_store_unchanged() {
    let transport = ScriptedTransport::default().reply(429, json!({ "error": "rate limited" }));
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let mut store = BookingStore::load(MemoryStore::new());
    let before = store.list().to_vec();
    let mut guard = ScanGuard::default();
    let file = ScanFile {
        name: "photo.jpg".into(),
        mime_type: "image/jpeg".into(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    };

    guard.begin(&file.name).unwrap();
    let result = block_on(scan_document(&llm, &file, Utc::now()));
    guard.finish();

    assert!(matches!(result, Err(ScanError::Collaborator(_))));
    if let Ok(booking) = result {
        store.prepend(booking).unwrap();
    }
    assert_eq!(store.list(), before.as_slice());
    assert!(!guard.is_scanning());
}

#[test]
fn unsupported_file_is_rejected_without_request() {
    let transport = ScriptedTransport::default();
    let cfg = config();
    let llm = GeminiClient::new(&transport, &cfg);
    let file = ScanFile {
        name: "notes.txt".into(),
        mime_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    let result = block_on(scan_document(&llm, &file, Utc::now()));
    assert_eq!(result, Err(ScanError::UnsupportedType("text/plain".into())));
    assert!(transport.call_kinds().is_empty());
}
