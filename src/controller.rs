//! Submission workflow: `Idle -> Submitting -> Idle`, with the lock released
//! on every exit path.

use log::{error, info};

use crate::busy::{AnimationHandle, BusyIndicator};
use crate::form::Payload;
use crate::response::{interpret, DownloadFile, ResponseOutcome};
use crate::transport::ReportTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
}

/// What the window shows about an in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLock {
    pub submit_enabled: bool,
    pub overlay_visible: bool,
}

impl SubmissionLock {
    pub const RELEASED: Self = Self {
        submit_enabled: true,
        overlay_visible: false,
    };
    pub const HELD: Self = Self {
        submit_enabled: false,
        overlay_visible: true,
    };
}

/// Surface the controller drives. Implemented by the GTK window and by test
/// recorders.
pub trait SubmitView {
    fn apply_lock(&mut self, lock: SubmissionLock);
    fn play_animation(&mut self, animation: &AnimationHandle);
    fn show_output(&mut self, text: &str);
    fn deliver_download(&mut self, file: DownloadFile);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// A submission was already in flight; nothing was sent.
    Rejected,
    /// The call failed before a response arrived.
    Failed,
    Completed(ResponseOutcome),
}

pub struct SubmissionController {
    phase: SubmissionPhase,
    lock: SubmissionLock,
    busy: BusyIndicator,
}

impl SubmissionController {
    pub fn new(busy: BusyIndicator) -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            lock: SubmissionLock::RELEASED,
            busy,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn lock(&self) -> SubmissionLock {
        self.lock
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Send `payload` to `endpoint` and render the answer into `view`.
    pub async fn submit<T, V>(
        &mut self,
        transport: &T,
        view: &mut V,
        endpoint: &str,
        payload: Payload,
    ) -> SubmissionResult
    where
        T: ReportTransport,
        V: SubmitView,
    {
        if self.phase == SubmissionPhase::Submitting {
            return SubmissionResult::Rejected;
        }

        let mut in_flight = InFlight::enter(self, view);
        info!("Submitting {} ({} fields)", endpoint, payload.len());

        let result = transport.post_json(endpoint, &payload).await;
        match result {
            Ok(response) => {
                let outcome = interpret(response);
                match &outcome {
                    ResponseOutcome::Download(file) => in_flight.view.deliver_download(file.clone()),
                    other => {
                        if let Some(text) = other.output_text() {
                            in_flight.view.show_output(text);
                        }
                    }
                }
                SubmissionResult::Completed(outcome)
            }
            Err(e) => {
                error!("Submission to {} failed: {}", endpoint, e);
                SubmissionResult::Failed
            }
        }
    }
}

/// Held for the duration of the network call. Dropping it returns the
/// controller to `Idle`, whichever way the call ended.
struct InFlight<'a, V: SubmitView> {
    controller: &'a mut SubmissionController,
    view: &'a mut V,
}

impl<'a, V: SubmitView> InFlight<'a, V> {
    fn enter(controller: &'a mut SubmissionController, view: &'a mut V) -> Self {
        controller.phase = SubmissionPhase::Submitting;
        controller.lock = SubmissionLock::HELD;
        view.apply_lock(controller.lock);
        if let Some(animation) = controller.busy.start() {
            view.play_animation(animation);
        }
        Self { controller, view }
    }
}

impl<V: SubmitView> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.controller.busy.stop();
        self.controller.lock = SubmissionLock::RELEASED;
        self.controller.phase = SubmissionPhase::Idle;
        self.view.apply_lock(self.controller.lock);
    }
}
