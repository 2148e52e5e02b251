//! The widget runtime: one instance per embedding, no globals.
//!
//! [`activate`] bootstraps a session, connects the transport, and spawns
//! the event loop. The loop is the only place conversation state is
//! mutated: it applies interpreter reactions from inbound frames, and
//! dispatches host commands (free-text sends, sub-form input, confirms).
//! Everything user-visible goes through the [`WidgetView`] trait.

use crate::{
    bootstrap::{self, BootstrapError},
    config::WidgetConfig,
    forms::{AddressForm, EducationForm, GpsForm, WorkExperienceForm},
    places::{AutocompleteDriver, PlacesClient, SuggestionBatch},
    transport::{self, OutboundSink, SendError, TransportEvent},
    view::{GeoError, GeoPosition, Geolocator, WidgetView},
};
use screener_core::{
    forms::EducationLevel,
    interpreter::{Reaction, interpret},
    protocol::{Address, InboundMessage, MessageType, OutboundMessage, Speaker, WorkExperienceEntry},
    state::{ConversationState, FormKind, Phase, Status},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// User and host actions delivered to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCommand {
    /// Free-text input from the candidate.
    SendMessage(String),
    AddWorkEntry(WorkExperienceEntry),
    RemoveWorkEntry(usize),
    SelectEducation(EducationLevel),
    /// A keystroke in the address field.
    AddressInput(String),
    /// The user picked an autocomplete suggestion by place id.
    SelectPrediction(String),
    /// Confirm whichever sub-form is active.
    ConfirmForm,
    CaptureGps,
    SkipGps,
    /// Tear down the widget instance.
    Close,
}

/// Completions of the widget's own async work (lookups, GPS capture).
#[derive(Debug)]
pub enum InternalEvent {
    DetailsResolved {
        generation: u64,
        result: Option<Address>,
    },
    GpsCaptured {
        generation: u64,
        result: Result<(GeoPosition, Option<String>), GeoError>,
    },
}

const NOT_READY_NOTICE: &str = "Not connected yet. Please try again in a moment.";

pub struct ChatWidget {
    state: ConversationState,
    view: Box<dyn WidgetView>,
    sink: Arc<dyn OutboundSink>,
    places: PlacesClient,
    geolocator: Arc<dyn Geolocator>,
    autocomplete: AutocompleteDriver,
    internal_tx: mpsc::Sender<InternalEvent>,
    work_form: WorkExperienceForm,
    education_form: EducationForm,
    address_form: AddressForm,
    gps_form: GpsForm,
}

impl ChatWidget {
    /// Builds a widget around an already-connected transport. Returns the
    /// receiver for the widget's internal async completions, which the
    /// event loop consumes.
    pub fn new(
        view: Box<dyn WidgetView>,
        sink: Arc<dyn OutboundSink>,
        places: PlacesClient,
        geolocator: Arc<dyn Geolocator>,
        suggestions_tx: mpsc::Sender<SuggestionBatch>,
    ) -> (Self, mpsc::Receiver<InternalEvent>) {
        let (internal_tx, internal_rx) = mpsc::channel(16);
        let autocomplete =
            AutocompleteDriver::new(Arc::new(places.clone()), suggestions_tx);
        let widget = Self {
            state: ConversationState::new(),
            view,
            sink,
            places,
            geolocator,
            autocomplete,
            internal_tx,
            work_form: WorkExperienceForm::new(),
            education_form: EducationForm::new(),
            address_form: AddressForm::new(),
            gps_form: GpsForm::new(),
        };
        (widget, internal_rx)
    }

    /// Runs until the transport closes or the host sends `Close`.
    pub async fn run(
        mut self,
        mut transport_events: mpsc::Receiver<TransportEvent>,
        mut commands: mpsc::Receiver<WidgetCommand>,
        mut internal: mpsc::Receiver<InternalEvent>,
        mut suggestions: mpsc::Receiver<SuggestionBatch>,
    ) {
        loop {
            tokio::select! {
                Some(event) = transport_events.recv() => {
                    let terminal = matches!(event, TransportEvent::Closed);
                    self.handle_transport_event(event);
                    if terminal {
                        break;
                    }
                }
                Some(command) = commands.recv() => {
                    if matches!(command, WidgetCommand::Close) {
                        info!("Widget closed by host");
                        break;
                    }
                    self.handle_command(command);
                }
                Some(event) = internal.recv() => self.handle_internal(event),
                Some(batch) = suggestions.recv() => self.handle_suggestions(batch),
                else => break,
            }
        }
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                self.state.mark_live();
                self.view.set_status(Status::Connected);
            }
            TransportEvent::Frame(message) => {
                if matches!(message, InboundMessage::WorkflowComplete) {
                    // Even though the socket may stay open, nothing may be
                    // sent after the workflow finishes.
                    self.sink.retire();
                }
                let reactions = interpret(&mut self.state, message);
                self.apply_reactions(reactions);
            }
            TransportEvent::ProtocolError(description) => {
                self.view
                    .append_message(Speaker::Bot, &format!("Error: {}", description), MessageType::Body);
            }
            TransportEvent::Errored(description) => {
                warn!(%description, "Transport error");
                self.enter_disconnected();
            }
            TransportEvent::Closed => {
                self.enter_disconnected();
            }
        }
    }

    fn enter_disconnected(&mut self) {
        let dismissed = self.state.active_form();
        self.state.disconnect();
        if let Some(kind) = dismissed {
            self.view.hide_form(kind);
            self.reset_form(kind);
        }
        self.view.set_typing_indicator(false);
        self.view.set_input_enabled(false);
        if self.state.phase() != Phase::Complete {
            self.view.set_status(Status::Disconnected);
        }
    }

    fn apply_reactions(&mut self, reactions: Vec<Reaction>) {
        for reaction in reactions {
            match reaction {
                Reaction::AppendTranscript {
                    speaker,
                    content,
                    message_type,
                } => self.view.append_message(speaker, &content, message_type),
                Reaction::ShowTyping => self.view.set_typing_indicator(true),
                Reaction::HideTyping => self.view.set_typing_indicator(false),
                Reaction::ActivateForm(kind) => {
                    self.reset_form(kind);
                    self.view.show_form(kind);
                }
                Reaction::DeactivateForm(kind) => {
                    self.view.hide_form(kind);
                    self.reset_form(kind);
                }
                Reaction::SetInputEnabled(enabled) => self.view.set_input_enabled(enabled),
                Reaction::SetStatus(status) => self.view.set_status(status),
            }
        }
    }

    #[instrument(skip(self))]
    pub fn handle_command(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::SendMessage(text) => self.send_user_message(text),
            WidgetCommand::AddWorkEntry(entry) => {
                if self.state.active_form() == Some(FormKind::WorkExperience) {
                    self.work_form.add_entry(entry);
                }
            }
            WidgetCommand::RemoveWorkEntry(index) => {
                if self.state.active_form() == Some(FormKind::WorkExperience) {
                    self.work_form.remove_entry(index);
                }
            }
            WidgetCommand::SelectEducation(level) => {
                if self.state.active_form() == Some(FormKind::Education) {
                    self.education_form.select(level);
                }
            }
            WidgetCommand::AddressInput(text) => {
                if self.state.active_form() == Some(FormKind::Address) {
                    self.address_form.set_fallback(&text);
                    self.autocomplete.on_input(&text);
                }
            }
            WidgetCommand::SelectPrediction(place_id) => self.select_prediction(place_id),
            WidgetCommand::ConfirmForm => self.confirm_active_form(),
            WidgetCommand::CaptureGps => self.capture_gps(),
            WidgetCommand::SkipGps => self.skip_gps(),
            WidgetCommand::Close => {}
        }
    }

    fn send_user_message(&mut self, text: String) {
        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }
        if !self.state.input_enabled() {
            self.view.show_notice("Input is not available right now.");
            return;
        }
        if !self.sink.is_open() {
            self.view.show_notice(NOT_READY_NOTICE);
            return;
        }
        // Echo first, as the user sees their message the moment they send.
        self.view
            .append_message(Speaker::User, &text, MessageType::Body);
        if self
            .sink
            .send(OutboundMessage::UserMessage { content: text })
            .is_err()
        {
            self.view.show_notice(NOT_READY_NOTICE);
            return;
        }
        // Input stays closed until the next bot message re-opens it.
        self.state.disable_input();
        self.view.set_input_enabled(false);
    }

    fn select_prediction(&mut self, place_id: String) {
        if self.state.active_form() != Some(FormKind::Address) {
            return;
        }
        if self.address_form.prediction(&place_id).is_none() {
            warn!(%place_id, "Selected prediction is not in the current suggestion list");
            return;
        }
        let generation = self.address_form.begin_lookup();
        let places = self.places.clone();
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = places.details(&place_id).await.ok();
            let _ = internal_tx
                .send(InternalEvent::DetailsResolved { generation, result })
                .await;
        });
    }

    fn capture_gps(&mut self) {
        if self.state.active_form() != Some(FormKind::Gps) {
            return;
        }
        let Some(generation) = self.gps_form.begin_capture() else {
            return; // A capture is already in flight.
        };
        let geolocator = self.geolocator.clone();
        let places = self.places.clone();
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = match geolocator.capture().await {
                Ok(position) => {
                    // Reverse geocoding is for the transcript echo only;
                    // its failure never blocks submitting the coordinates.
                    let formatted = places
                        .reverse_geocode(position.lat, position.lng)
                        .await
                        .ok()
                        .map(|g| g.formatted_address);
                    Ok((position, formatted))
                }
                Err(e) => Err(e),
            };
            let _ = internal_tx
                .send(InternalEvent::GpsCaptured { generation, result })
                .await;
        });
    }

    fn skip_gps(&mut self) {
        if self.state.active_form() != Some(FormKind::Gps) || self.gps_form.capturing() {
            return;
        }
        if !self.sink.is_open() {
            self.view.show_notice(NOT_READY_NOTICE);
            return;
        }
        let (message, echo) = GpsForm::skip_payload();
        self.finish_form_submission(FormKind::Gps, message, echo);
    }

    fn confirm_active_form(&mut self) {
        let Some(kind) = self.state.active_form() else {
            return;
        };
        if !self.sink.is_open() {
            self.view.show_notice(NOT_READY_NOTICE);
            return;
        }
        let confirmed = match kind {
            FormKind::WorkExperience => self.work_form.confirm(),
            FormKind::Education => self.education_form.confirm(),
            FormKind::Address => {
                if self.address_form.pending_lookup() {
                    self.view.show_notice("Still looking up that address...");
                    return;
                }
                self.address_form.confirm()
            }
            // The GPS form confirms through its share/skip actions.
            FormKind::Gps => return,
        };
        match confirmed {
            Ok((message, echo)) => self.finish_form_submission(kind, message, echo),
            Err(e) => self.view.show_notice(&e.to_string()),
        }
    }

    pub fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::DetailsResolved { generation, result } => {
                if self.state.active_form() != Some(FormKind::Address) {
                    return; // The user navigated away; discard.
                }
                match result {
                    Some(address) => {
                        self.address_form.apply_details(generation, address);
                    }
                    None => {
                        self.address_form.lookup_failed(generation);
                        self.view
                            .show_notice("Address lookup failed. You can type your address instead.");
                    }
                }
            }
            InternalEvent::GpsCaptured { generation, result } => {
                if !self.gps_form.finish_capture(generation) {
                    return; // Stale capture from a hidden form; discard.
                }
                if self.state.active_form() != Some(FormKind::Gps) {
                    return;
                }
                match result {
                    Ok((position, formatted)) => {
                        if !self.sink.is_open() {
                            self.view.show_notice(NOT_READY_NOTICE);
                            return;
                        }
                        let (message, echo) =
                            GpsForm::share_payload(position, formatted.as_deref());
                        self.finish_form_submission(FormKind::Gps, message, echo);
                    }
                    Err(e) => {
                        // Retryable: the share action stays available, and
                        // a failure is never converted into a skip.
                        self.view
                            .show_notice(&format!("{}. You can try again or skip.", e));
                    }
                }
            }
        }
    }

    pub fn handle_suggestions(&mut self, batch: SuggestionBatch) {
        if !self.autocomplete.is_current(batch.generation) {
            return; // Superseded by newer typing; discard.
        }
        if self.state.active_form() != Some(FormKind::Address) {
            return;
        }
        let descriptions: Vec<String> = batch
            .predictions
            .iter()
            .map(|p| p.description.clone())
            .collect();
        self.address_form.set_suggestions(batch.predictions);
        self.view.show_suggestions(&descriptions);
    }

    /// The shared tail of every successful confirm: send the frame, echo
    /// it, hide the form, restore free-text input.
    fn finish_form_submission(&mut self, kind: FormKind, message: OutboundMessage, echo: String) {
        match self.sink.send(message) {
            Ok(()) => {
                self.view
                    .append_message(Speaker::User, &echo, MessageType::Body);
                self.view.hide_form(kind);
                self.reset_form(kind);
                self.state.deactivate_form(kind);
                if self.state.input_enabled() {
                    self.view.set_input_enabled(true);
                }
            }
            Err(SendError::NotConnected) => self.view.show_notice(NOT_READY_NOTICE),
        }
    }

    fn reset_form(&mut self, kind: FormKind) {
        match kind {
            FormKind::WorkExperience => self.work_form.reset(),
            FormKind::Education => self.education_form.reset(),
            FormKind::Address => {
                self.address_form.reset();
                self.autocomplete.reset();
            }
            FormKind::Gps => self.gps_form.reset(),
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &ConversationState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn work_form(&self) -> &WorkExperienceForm {
        &self.work_form
    }
}

/// Handle the embedder keeps; dropping it does not tear down the widget,
/// `Close` does.
pub struct WidgetHandle {
    commands: mpsc::Sender<WidgetCommand>,
    task: tokio::task::JoinHandle<()>,
}

impl WidgetHandle {
    /// Delivers a command to the event loop. Returns `false` once the
    /// widget has shut down.
    pub async fn command(&self, command: WidgetCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Waits for the event loop to finish.
    pub async fn closed(self) {
        let _ = self.task.await;
    }
}

/// Activates one widget instance: validates the embedding domain, starts
/// a session, connects the WebSocket, and spawns the event loop.
///
/// A bootstrap failure is fatal for this activation attempt: the view is
/// left showing a disconnected status plus the server-provided detail,
/// and the error is returned to the embedder. No retry is attempted.
#[instrument(skip_all, fields(job_id = %config.job_id, domain = %config.domain))]
pub async fn activate(
    config: WidgetConfig,
    mut view: Box<dyn WidgetView>,
    geolocator: Arc<dyn Geolocator>,
) -> Result<WidgetHandle, BootstrapError> {
    view.set_status(Status::Connecting);
    let http = reqwest::Client::new();

    let bootstrapped = async {
        let api_key = bootstrap::validate_domain(&http, &config).await?;
        bootstrap::start_session(&http, &config, &api_key).await
    }
    .await;
    let session = match bootstrapped {
        Ok(session) => session,
        Err(e) => {
            view.set_status(Status::Disconnected);
            view.show_notice(&e.to_string());
            return Err(e);
        }
    };
    info!(session_id = %session.id, "Session bootstrapped, connecting WebSocket");

    let (transport, transport_events) = transport::connect(&config.ws_base, &session.id);
    let places = PlacesClient::new(http, config.api_base.clone());
    let (suggestions_tx, suggestions_rx) = mpsc::channel(8);
    let (widget, internal_rx) = ChatWidget::new(
        view,
        Arc::new(transport),
        places,
        geolocator,
        suggestions_tx,
    );
    let (commands_tx, commands_rx) = mpsc::channel(16);
    let task = tokio::spawn(widget.run(transport_events, commands_rx, internal_rx, suggestions_rx));

    Ok(WidgetHandle {
        commands: commands_tx,
        task,
    })
}
