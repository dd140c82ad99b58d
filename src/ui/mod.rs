mod fields;

use gtk4::prelude::*;
use gtk4::{
    ApplicationWindow, Box as GtkBox, Button, DropDown, Label, Orientation, Overlay, PolicyType,
    ProgressBar, ScrolledWindow, Spinner, TextView, WrapMode,
};
use libadwaita as adw;
use log::{debug, error, warn};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::busy::{AnimationHandle, BusyIndicator};
use crate::controller::{SubmissionController, SubmissionLock, SubmitView};
use crate::download::save_download;
use crate::error::DownloadError;
use crate::form::{build_payload, missing_required, render_form};
use crate::registry::EndpointRegistry;
use crate::response::DownloadFile;
use crate::transport::HttpTransport;
use crate::AppState;

use fields::{render_into, RenderedFields};

#[allow(dead_code)]
pub struct MainWindow {
    window: ApplicationWindow,
    app_state: Arc<AppState>,
}

impl MainWindow {
    pub fn new(app: &adw::Application, app_state: Arc<AppState>) -> Self {
        let window = ApplicationWindow::new(app);
        window.set_title(Some("Report Forms"));
        window.set_default_size(720, 820);

        let config = app_state.config.read().clone();
        let registry = app_state.registry;

        let form = GtkBox::new(Orientation::Vertical, 10);
        form.set_widget_name("apiForm");
        form.set_margin_top(20);
        form.set_margin_bottom(20);
        form.set_margin_start(20);
        form.set_margin_end(20);

        let title = Label::new(None);
        title.set_markup("<span size='x-large' weight='bold'>Generate Report</span>");
        title.set_halign(gtk4::Align::Start);
        form.append(&title);

        let titles: Vec<&str> = registry.endpoints().iter().map(|e| e.title).collect();
        let endpoint_select = DropDown::from_strings(&titles);
        endpoint_select.set_widget_name("apiEndpoint");
        form.append(&endpoint_select);

        let parameter_fields = GtkBox::new(Orientation::Vertical, 0);
        parameter_fields.set_widget_name("parameterFields");
        let fields_scroll = ScrolledWindow::builder()
            .child(&parameter_fields)
            .hscrollbar_policy(PolicyType::Never)
            .vexpand(true)
            .build();
        form.append(&fields_scroll);

        let submit_button = Button::with_label("Submit");
        submit_button.set_widget_name("submitButton");
        submit_button.set_halign(gtk4::Align::End);
        submit_button.add_css_class("suggested-action");
        form.append(&submit_button);

        let output = TextView::new();
        output.set_widget_name("responseOutput");
        output.set_editable(false);
        output.set_monospace(true);
        output.set_wrap_mode(WrapMode::WordChar);
        let output_scroll = ScrolledWindow::builder()
            .child(&output)
            .min_content_height(160)
            .build();
        form.append(&output_scroll);

        let (loading_overlay, spinner, progress) = Self::create_loading_overlay();

        let overlay = Overlay::new();
        overlay.set_child(Some(&form));
        overlay.add_overlay(&loading_overlay);

        let toasts = adw::ToastOverlay::new();
        toasts.set_child(Some(&overlay));
        window.set_child(Some(&toasts));

        let view = WindowView {
            submit_button: submit_button.clone(),
            loading_overlay,
            spinner,
            progress,
            output: output.clone(),
            toasts,
            download_dir: config.download_dir(),
            ticker: Rc::new(RefCell::new(None)),
        };

        let rendered = Rc::new(RefCell::new(RenderedFields::default()));
        let controller = Rc::new(RefCell::new(Some(SubmissionController::new(
            BusyIndicator::new(config.animation_asset_path()),
        ))));
        let transport = HttpTransport::new(&config.server.base_url, app_state.runtime.clone());

        // Rebuild the whole field set and clear the output on every selection.
        let rendered_clone = rendered.clone();
        let parameter_fields_clone = parameter_fields.clone();
        let output_clone = output.clone();
        let submit_clone = submit_button.clone();
        endpoint_select.connect_selected_notify(move |select| {
            let path = selected_path(registry, select);
            let view = render_form(registry.parameters(path));
            let fields = render_into(&parameter_fields_clone, &view);
            fields.connect_activate(&submit_clone);
            debug!("Rendered {} fields for {}", fields.ids().count(), path);
            *rendered_clone.borrow_mut() = fields;
            output_clone.buffer().set_text("");
        });

        let endpoint_select_clone = endpoint_select.clone();
        submit_button.connect_clicked(move |_| {
            let path = selected_path(registry, &endpoint_select_clone);
            let parameters = registry.parameters(path);
            let state = rendered.borrow().state();

            let missing: Vec<&str> = missing_required(parameters, &state)
                .iter()
                .map(|d| d.name)
                .collect();
            rendered.borrow().mark_missing(&missing);
            if !missing.is_empty() {
                view.toast("Fill in the required fields");
                return;
            }

            // An in-flight submission holds the controller.
            let Some(mut submission) = controller.borrow_mut().take() else {
                warn!("Submission already in progress, ignoring");
                return;
            };

            let payload = build_payload(parameters, &state);
            let transport = transport.clone();
            let controller = controller.clone();
            let mut view = view.clone();
            glib::spawn_future_local(async move {
                submission.submit(&transport, &mut view, path, payload).await;
                controller.borrow_mut().replace(submission);
            });
        });

        let initial = registry.position(&config.ui.default_endpoint).unwrap_or(0);
        endpoint_select.set_selected(initial as u32);
        if initial == 0 {
            // set_selected(0) on a fresh dropdown does not notify
            endpoint_select.notify("selected");
        }

        window.present();

        Self { window, app_state }
    }

    fn create_loading_overlay() -> (GtkBox, Spinner, ProgressBar) {
        let loading_overlay = GtkBox::new(Orientation::Vertical, 10);
        loading_overlay.set_widget_name("loadingOverlay");
        loading_overlay.set_halign(gtk4::Align::Center);
        loading_overlay.set_valign(gtk4::Align::Center);
        loading_overlay.add_css_class("osd");
        loading_overlay.set_visible(false);

        let animation = GtkBox::new(Orientation::Vertical, 6);
        animation.set_widget_name("lottieContainer");
        animation.set_margin_top(16);
        animation.set_margin_bottom(16);
        animation.set_margin_start(16);
        animation.set_margin_end(16);

        let spinner = Spinner::new();
        spinner.set_size_request(48, 48);
        animation.append(&spinner);

        let progress = ProgressBar::new();
        progress.set_visible(false);
        animation.append(&progress);

        let label = Label::new(Some("Generating report..."));
        animation.append(&label);

        loading_overlay.append(&animation);
        (loading_overlay, spinner, progress)
    }
}

fn selected_path(registry: &'static EndpointRegistry, select: &DropDown) -> &'static str {
    registry
        .endpoints()
        .get(select.selected() as usize)
        .map(|e| e.path)
        .unwrap_or_default()
}

/// Widgets the submission controller drives.
#[derive(Clone)]
struct WindowView {
    submit_button: Button,
    loading_overlay: GtkBox,
    spinner: Spinner,
    progress: ProgressBar,
    output: TextView,
    toasts: adw::ToastOverlay,
    download_dir: Option<PathBuf>,
    ticker: Rc<RefCell<Option<glib::SourceId>>>,
}

impl WindowView {
    fn toast(&self, message: &str) {
        self.toasts.add_toast(adw::Toast::new(message));
    }

    fn stop_ticker(&self) {
        if let Some(source) = self.ticker.borrow_mut().take() {
            source.remove();
        }
        self.progress.set_visible(false);
    }
}

impl SubmitView for WindowView {
    fn apply_lock(&mut self, lock: SubmissionLock) {
        self.submit_button.set_sensitive(lock.submit_enabled);
        self.loading_overlay.set_visible(lock.overlay_visible);
        if lock.overlay_visible {
            self.spinner.start();
        } else {
            self.spinner.stop();
            self.stop_ticker();
        }
    }

    fn play_animation(&mut self, animation: &AnimationHandle) {
        self.stop_ticker();

        let mut playing = animation.clone();
        let interval = Duration::from_secs_f64(1.0 / playing.definition().frame_rate);
        let progress = self.progress.clone();
        progress.set_fraction(playing.progress());
        progress.set_visible(true);

        let source = glib::timeout_add_local(interval, move || {
            playing.advance(interval);
            progress.set_fraction(playing.progress());
            glib::ControlFlow::Continue
        });
        self.ticker.borrow_mut().replace(source);
    }

    fn show_output(&mut self, text: &str) {
        self.output.buffer().set_text(text);
    }

    fn deliver_download(&mut self, file: DownloadFile) {
        let saved = match &self.download_dir {
            Some(dir) => save_download(dir, &file),
            None => Err(DownloadError::NoDirectory),
        };
        match saved {
            Ok(path) => self.toast(&format!("Saved {}", path.display())),
            Err(e) => {
                error!("Failed to save {}: {}", file.file_name, e);
                self.toast(&format!("Could not save {}", file.file_name));
            }
        }
    }
}
