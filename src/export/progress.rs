// Progress reporting for the export stage

use crossbeam_channel::Sender;
use indicatif::{ProgressBar, ProgressStyle};

/// One notification from a running export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    /// Completion percentage, 0 to 100
    Progress(u8),
}

/// Receives status lines and percentages while pages are written
pub trait ProgressSink {
    fn status(&mut self, message: &str);
    fn progress(&mut self, percent: u8);
}

/// Keeps every event in order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<ProgressEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink { events: Vec::new() }
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Status(text) => Some(text.as_str()),
                ProgressEvent::Progress(_) => None,
            })
            .collect()
    }

    pub fn last_progress(&self) -> Option<u8> {
        self.events.iter().rev().find_map(|event| match event {
            ProgressEvent::Progress(percent) => Some(*percent),
            ProgressEvent::Status(_) => None,
        })
    }
}

impl ProgressSink for RecordingSink {
    fn status(&mut self, message: &str) {
        self.events.push(ProgressEvent::Status(message.to_string()));
    }

    fn progress(&mut self, percent: u8) {
        self.events.push(ProgressEvent::Progress(percent));
    }
}

/// Forwards events to another thread; a disconnected receiver is ignored
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        ChannelSink { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn status(&mut self, message: &str) {
        let _ = self.sender.send(ProgressEvent::Status(message.to_string()));
    }

    fn progress(&mut self, percent: u8) {
        let _ = self.sender.send(ProgressEvent::Progress(percent));
    }
}

/// Terminal progress bar for the command line
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        ProgressBarSink { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBarSink {
    fn status(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn progress(&mut self, percent: u8) {
        self.bar.set_position(u64::from(percent.min(100)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.status("one");
        sink.progress(10);
        sink.status("two");
        sink.progress(55);

        assert_eq!(sink.statuses(), vec!["one", "two"]);
        assert_eq!(sink.last_progress(), Some(55));
        assert_eq!(sink.events.len(), 4);
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(sender);
        sink.status("working");
        sink.progress(42);

        assert_eq!(
            receiver.try_recv().unwrap(),
            ProgressEvent::Status("working".to_string())
        );
        assert_eq!(receiver.try_recv().unwrap(), ProgressEvent::Progress(42));
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        drop(receiver);
        let mut sink = ChannelSink::new(sender);
        sink.status("nobody listens");
        sink.progress(100);
    }
}
