use tokio::sync::mpsc::UnboundedSender;

use crate::error::NotifyError;
use crate::models::CheckInEvent;

/// Receives check-in events. Delivery is fire-and-forget: the roster logs
/// a failed delivery and keeps the state change.
pub trait CheckInNotifier {
    fn notify(&self, event: &CheckInEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl CheckInNotifier for LogNotifier {
    fn notify(&self, event: &CheckInEvent) -> Result<(), NotifyError> {
        tracing::info!(
            student_id = %event.student_id,
            status = %event.new_status,
            check_in_time = %event.check_in_time,
            "check-in recorded"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<CheckInEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: UnboundedSender<CheckInEvent>) -> Self {
        Self { sender }
    }
}

impl CheckInNotifier for ChannelNotifier {
    fn notify(&self, event: &CheckInEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event.clone())
            .map_err(|_| NotifyError::Closed)
    }
}
