use std::future::Future;
use std::io::Write;
use std::time::Duration;

use report_forms_core::busy::{AnimationHandle, BusyIndicator};
use report_forms_core::controller::{
    SubmissionController, SubmissionLock, SubmissionPhase, SubmissionResult, SubmitView,
};
use report_forms_core::error::TransportError;
use report_forms_core::form::{build_payload, render_form, FormState, Payload};
use report_forms_core::registry::registry;
use report_forms_core::response::{DownloadFile, ReportResponse, ResponseOutcome};
use report_forms_core::transport::ReportTransport;

#[derive(Default)]
struct RecordingView {
    locks: Vec<SubmissionLock>,
    animations: Vec<u64>,
    outputs: Vec<String>,
    downloads: Vec<DownloadFile>,
}

impl RecordingView {
    fn releases(&self) -> usize {
        self.locks
            .iter()
            .filter(|l| **l == SubmissionLock::RELEASED)
            .count()
    }
}

impl SubmitView for RecordingView {
    fn apply_lock(&mut self, lock: SubmissionLock) {
        self.locks.push(lock);
    }

    fn play_animation(&mut self, animation: &AnimationHandle) {
        self.animations.push(animation.id());
    }

    fn show_output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn deliver_download(&mut self, file: DownloadFile) {
        self.downloads.push(file);
    }
}

enum Scripted {
    Respond(ReportResponse),
    Fail,
    Hang,
}

struct ScriptedTransport {
    script: Scripted,
    calls: std::cell::Cell<usize>,
    last_endpoint: std::cell::RefCell<String>,
}

impl ScriptedTransport {
    fn new(script: Scripted) -> Self {
        Self {
            script,
            calls: std::cell::Cell::new(0),
            last_endpoint: std::cell::RefCell::new(String::new()),
        }
    }
}

impl ReportTransport for ScriptedTransport {
    fn post_json(
        &self,
        endpoint: &str,
        _payload: &Payload,
    ) -> impl Future<Output = Result<ReportResponse, TransportError>> {
        self.calls.set(self.calls.get() + 1);
        *self.last_endpoint.borrow_mut() = endpoint.to_string();
        let endpoint = endpoint.to_string();
        async move {
            match &self.script {
                Scripted::Respond(response) => Ok(response.clone()),
                Scripted::Fail => Err(TransportError::Unreachable {
                    url: endpoint,
                    reason: "connection refused".to_string(),
                }),
                Scripted::Hang => std::future::pending().await,
            }
        }
    }
}

fn json_response(body: &str) -> ReportResponse {
    ReportResponse {
        status: 200,
        content_type: Some("application/json".to_string()),
        content_disposition: None,
        body: body.as_bytes().to_vec(),
    }
}

fn sample_payload() -> Payload {
    let params = registry().parameters("/export_detections");
    let mut state = FormState::for_view(&render_form(params));
    state.set_text("environment_sub_domain", "acme");
    state.set_text("ws_name", "prod");
    build_payload(params, &state)
}

fn controller() -> SubmissionController {
    SubmissionController::new(BusyIndicator::new("/nonexistent/loading.json"))
}

#[tokio::test]
async fn json_response_is_shown_and_lock_released_once() {
    let transport = ScriptedTransport::new(Scripted::Respond(json_response(r#"{"detail": "bad input"}"#)));
    let mut view = RecordingView::default();
    let mut controller = controller();

    let result = controller
        .submit(&transport, &mut view, "/export_detections", sample_payload())
        .await;

    assert!(matches!(result, SubmissionResult::Completed(ResponseOutcome::Message(_))));
    assert_eq!(view.outputs, ["bad input"]);
    assert_eq!(view.locks, [SubmissionLock::HELD, SubmissionLock::RELEASED]);
    assert_eq!(transport.calls.get(), 1);
    assert_eq!(*transport.last_endpoint.borrow(), "/export_detections");
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn transport_failure_shows_nothing_and_still_releases() {
    let transport = ScriptedTransport::new(Scripted::Fail);
    let mut view = RecordingView::default();
    let mut controller = controller();

    let result = controller
        .submit(&transport, &mut view, "/export_detections", sample_payload())
        .await;

    assert_eq!(result, SubmissionResult::Failed);
    assert!(view.outputs.is_empty());
    assert!(view.downloads.is_empty());
    assert_eq!(view.releases(), 1);
    assert_eq!(controller.lock(), SubmissionLock::RELEASED);
    assert!(!controller.busy().is_running());
}

#[tokio::test]
async fn file_response_is_delivered_as_download() {
    let transport = ScriptedTransport::new(Scripted::Respond(ReportResponse {
        status: 200,
        content_type: Some("text/csv".to_string()),
        content_disposition: Some(r#"attachment; filename="report_.csv""#.to_string()),
        body: b"id\n1\n".to_vec(),
    }));
    let mut view = RecordingView::default();
    let mut controller = controller();

    controller
        .submit(&transport, &mut view, "/generate_cost_recommendations", sample_payload())
        .await;

    assert!(view.outputs.is_empty());
    assert_eq!(view.downloads.len(), 1);
    assert_eq!(view.downloads[0].file_name, "report.csv");
    assert_eq!(view.releases(), 1);
}

#[tokio::test]
async fn dropped_submission_releases_the_lock() {
    let transport = ScriptedTransport::new(Scripted::Hang);
    let mut view = RecordingView::default();
    let mut controller = controller();

    let submission = controller.submit(&transport, &mut view, "/export_flow_logs", sample_payload());
    let timed_out = tokio::time::timeout(Duration::from_millis(20), submission).await;

    assert!(timed_out.is_err());
    assert_eq!(view.locks, [SubmissionLock::HELD, SubmissionLock::RELEASED]);
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn animation_plays_while_submitting_and_stops_after() {
    let mut asset = tempfile::NamedTempFile::new().unwrap();
    write!(asset, r#"{{"fr":25,"ip":0,"op":50,"w":64,"h":64}}"#).unwrap();

    let transport = ScriptedTransport::new(Scripted::Respond(json_response(r#"{"ok": true}"#)));
    let mut view = RecordingView::default();
    let mut controller = SubmissionController::new(BusyIndicator::new(asset.path()));

    controller
        .submit(&transport, &mut view, "/export_detections", sample_payload())
        .await;
    controller
        .submit(&transport, &mut view, "/export_detections", sample_payload())
        .await;

    assert_eq!(view.animations.len(), 2);
    assert_ne!(view.animations[0], view.animations[1]);
    assert_eq!(view.outputs[0], "{\n  \"ok\": true\n}");
    assert_eq!(view.releases(), 2);
    assert!(!controller.busy().is_running());
}
