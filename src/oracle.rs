use std::time::Duration;

use futures_util::stream::{StreamExt as _, TryStreamExt as _};
use log::{debug, info, warn};
use message_bus::{
    Event, Message, MessageBus, MessageBusSubscription, OracleInput, SubmissionId, UiCommand,
};
use oracle_model::category::ResponseTable;
use oracle_model::session::SessionState;
use oracle_model::{CategoryId, EMPTY_QUESTION_MESSAGE, SELECTION_FAILURE_MESSAGE};
use tokio::time::Instant;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use ui_state::{UiCategory, UiState};

use crate::utils::print_err;
pub(crate) use config::Config;

mod config;
pub(crate) mod message_bus;
pub(crate) mod store;
mod ui_state;

/// Submission waiting for its delay to elapse.
struct PendingSubmission {
    id: SubmissionId,
    category: CategoryId,
    deadline: Instant,
}

/// Owner of the widget session. All state changes go through
/// [`PixelOracle::dispatch_ui_command`] and [`PixelOracle::dispatch_event`].
pub struct PixelOracle {
    session: SessionState,
    responses: ResponseTable,
    config: Config,
    message_bus: MessageBus,
    pending: Option<PendingSubmission>,
    last_submission_id: u64,
}

impl PixelOracle {
    pub fn new(responses: ResponseTable, config: Config, message_bus: MessageBus) -> Self {
        let session = SessionState::new(&responses, &config.default_category);
        if session.selected_category != config.default_category {
            warn!(
                "Default category `{}` not found, using `{}`",
                config.default_category, session.selected_category
            );
        }
        PixelOracle {
            session,
            responses,
            config,
            message_bus,
            pending: None,
            last_submission_id: 0,
        }
    }

    pub fn dispatch_ui_command(&mut self, ui_command: UiCommand) {
        match ui_command {
            UiCommand::InitializeUi => {}
            UiCommand::SetQuestion(question) => self.session.question_text = question,
            UiCommand::SelectCategory(category) => self.select_category(category),
            UiCommand::Submit { question, category } => self.submit(question, category),
            UiCommand::CloseApplication => {
                if self.pending.is_some() {
                    info!("Closing with a pending submission, dropping it.");
                }
                info!("Oracle closed.");
            }
        }
    }

    pub fn dispatch_event(&mut self, event: Event) {
        match event {
            Event::SubmissionDelayElapsed(id) => self.resolve_submission(id),
        }
    }

    /// Runs until `CloseApplication` arrives or the bus is gone. Publishes a
    /// fresh UI state after every handled input. Lagging behind the bus is
    /// survived, anything else ends the loop.
    pub async fn dispatch_inputs(mut self, inputs: MessageBusSubscription) {
        let mut input_stream = inputs.oracle_input_stream().boxed();
        loop {
            match input_stream.try_next().await {
                Ok(Some(OracleInput::UiCommand(command @ UiCommand::CloseApplication))) => {
                    self.dispatch_ui_command(command);
                    break;
                }
                Ok(Some(OracleInput::UiCommand(command))) => {
                    self.dispatch_ui_command(command);
                }
                Ok(Some(OracleInput::Event(event))) => {
                    self.dispatch_event(event);
                }
                Ok(None) => {
                    break;
                }
                Err(e) => match e.downcast_ref::<BroadcastStreamRecvError>() {
                    Some(BroadcastStreamRecvError::Lagged(skipped)) => {
                        print_err(&e);
                        if !self.recover_from_lag(*skipped) {
                            continue;
                        }
                    }
                    None => {
                        print_err(&e);
                        break;
                    }
                },
            }
            self.message_bus.send(self.ui_state().into())
        }
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            available_categories: self.responses.categories().map(UiCategory::from).collect(),
            selected_category: self.session.selected_category.clone(),
            question: self.session.question_text.clone(),
            response: self.session.last_response.clone(),
            is_busy: self.session.is_busy,
        }
    }

    fn select_category(&mut self, category: CategoryId) {
        if self.responses.contains(&category) {
            self.session.selected_category = category;
        } else {
            warn!("Ignoring unknown category `{category}`");
        }
    }

    fn submit(&mut self, question: String, category: CategoryId) {
        if self.session.is_busy {
            info!("Still answering the previous question, submission ignored");
            return;
        }
        self.session.question_text = question;
        if self.responses.contains(&category) {
            self.session.selected_category = category.clone();
        }
        if self.session.question().is_none() {
            debug!("Empty question submitted");
            self.session.last_response = EMPTY_QUESTION_MESSAGE.to_string();
            return;
        }

        self.last_submission_id += 1;
        let id = SubmissionId(self.last_submission_id);
        debug!("Submission {id:?}: `{}` ({category})", self.session.question_text);
        let delay = self.config.response_delay();
        self.pending = Some(PendingSubmission {
            id,
            category,
            deadline: Instant::now() + delay,
        });
        self.session.is_busy = true;
        self.schedule_resolution(id, delay);
    }

    /// Skipped messages may include the pending submission's resolution.
    /// That event is only ever sent once the deadline has passed, so a
    /// submission past its deadline is resolved here and a late event for it
    /// is stale. Before the deadline nothing can have been lost. Returns
    /// whether the session changed.
    fn recover_from_lag(&mut self, skipped: u64) -> bool {
        warn!("Oracle skipped {skipped} messages");
        match &self.pending {
            Some(pending) if pending.deadline <= Instant::now() => {
                let id = pending.id;
                debug!("Resolution of {id:?} may have been skipped, resolving now");
                self.resolve_submission(id);
                true
            }
            _ => false,
        }
    }

    fn schedule_resolution(&self, id: SubmissionId, delay: Duration) {
        let message_bus = self.message_bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            message_bus.send(Message::from(Event::SubmissionDelayElapsed(id)));
        });
    }

    fn resolve_submission(&mut self, id: SubmissionId) {
        let pending = match self.pending.take() {
            Some(pending) if pending.id == id => pending,
            other => {
                debug!("Stale resolution {id:?} ignored");
                self.pending = other;
                return;
            }
        };
        self.session.last_response = match self
            .responses
            .pick(&pending.category, &mut rand::thread_rng())
        {
            Ok(response) => response.to_string(),
            Err(e) => {
                warn!("Response selection failed: {e}");
                SELECTION_FAILURE_MESSAGE.to_string()
            }
        };
        self.session.is_busy = false;
        debug!("Submission {id:?} answered");
    }
}
