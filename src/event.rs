//! Channel plumbing between the scheduler loop and the helper tasks
//! (config watcher, shutdown listener).

use color_eyre::eyre::OptionExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Re-read the configuration file and re-apply it.
    Reload,
    /// Stop re-arming the tick timer and exit the run loop.
    Quit,
}

#[derive(Debug)]
pub struct EventHandler {
    sender: UnboundedSender<Event>,
    receiver: UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self { sender, receiver }
    }

    /// Sender handle for tasks that produce events.
    pub fn clone_sender(&self) -> UnboundedSender<Event> {
        self.sender.clone()
    }

    pub async fn next(&mut self) -> color_eyre::Result<Event> {
        self.receiver.recv().await.ok_or_eyre("event channel closed")
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
