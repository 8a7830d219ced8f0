use anyhow::Result;
use futures_util::{Stream, StreamExt};
use log::{debug, error};
use oracle_model::CategoryId;
use serde::Serialize;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio_stream::wrappers::BroadcastStream;

use super::ui_state::UiState;

/// Two broadcast channels: oracle inputs (commands and events) and UI
/// updates. The oracle never reads the channel it publishes on.
#[derive(Clone)]
pub(crate) struct MessageBus {
    oracle_inputs: Sender<Message>,
    ui_updates: Sender<Message>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (oracle_inputs, _) = tokio::sync::broadcast::channel(100);
        let (ui_updates, _) = tokio::sync::broadcast::channel(100);
        Self {
            oracle_inputs,
            ui_updates,
        }
    }

    pub fn send(&self, message: Message) {
        match message {
            Message::UiUpdate(_) => {
                if self.ui_updates.send(message).is_err() {
                    debug!("No UI listening, update dropped");
                }
            }
            _ => {
                if let Err(message) = self.oracle_inputs.send(message) {
                    error!("Message not sent {:?}", message);
                }
            }
        }
    }

    pub fn subscribe(&self) -> MessageBusSubscription {
        MessageBusSubscription {
            oracle_inputs: self.oracle_inputs.subscribe(),
            ui_updates: self.ui_updates.subscribe(),
        }
    }
}

pub(crate) struct MessageBusSubscription {
    oracle_inputs: Receiver<Message>,
    ui_updates: Receiver<Message>,
}

fn message_stream(receiver: Receiver<Message>) -> impl Stream<Item = Result<Message>> {
    BroadcastStream::new(receiver).map(|r| r.map_err(anyhow::Error::from))
}

impl MessageBusSubscription {
    pub fn ui_update_stream(self) -> impl Stream<Item = Result<UiUpdate>> {
        message_stream(self.ui_updates).filter_map(|r| async move {
            match r {
                Ok(Message::UiUpdate(ui_update)) => Some(Ok(ui_update)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Everything the oracle reacts to: commands from the UI and its own
    /// scheduled events.
    pub fn oracle_input_stream(self) -> impl Stream<Item = Result<OracleInput>> {
        message_stream(self.oracle_inputs).filter_map(|r| async move {
            match r {
                Ok(Message::UiCommand(ui_command)) => Some(Ok(OracleInput::UiCommand(ui_command))),
                Ok(Message::Event(event)) => Some(Ok(OracleInput::Event(event))),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Message {
    UiUpdate(UiUpdate),
    UiCommand(UiCommand),
    Event(Event),
}

impl From<UiState> for Message {
    fn from(value: UiState) -> Self {
        Message::UiUpdate(UiUpdate::State(value))
    }
}

impl From<UiCommand> for Message {
    fn from(value: UiCommand) -> Self {
        Message::UiCommand(value)
    }
}

impl From<Event> for Message {
    fn from(value: Event) -> Self {
        Message::Event(value)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UiUpdate {
    State(UiState),
}

/// Identifies one accepted submission so that its delayed resolution can be
/// matched against the submission still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionId(pub u64);

#[derive(Debug, Clone)]
pub enum Event {
    SubmissionDelayElapsed(SubmissionId),
}

#[derive(Clone, Debug)]
pub enum UiCommand {
    InitializeUi,
    SetQuestion(String),
    SelectCategory(CategoryId),
    Submit {
        question: String,
        category: CategoryId,
    },
    CloseApplication,
}

#[derive(Debug)]
pub(crate) enum OracleInput {
    UiCommand(UiCommand),
    Event(Event),
}
