use std::sync::Mutex;

use crate::domain::{Error, NotificationService};

/// Emits notifications as `tracing` events. Used by the binary.
#[derive(Default, Debug)]
pub struct LogNotifier {}

impl NotificationService for LogNotifier {
    fn notify_funds_low(&self, email: &str) -> Result<(), Error> {
        tracing::info!(email, "notifying account holder that funds are low");
        Ok(())
    }

    fn notify_approaching_pay_in_limit(&self, email: &str) -> Result<(), Error> {
        tracing::info!(email, "notifying account holder of approaching pay in limit");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    FundsLow(String),
    ApproachingPayInLimit(String),
}

/// Keeps every notification in dispatch order, like an outbox.
#[derive(Default, Debug)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, notification: Notification) -> Result<(), Error> {
        self.sent
            .lock()
            .map_err(|e| Error::Notification(e.to_string()))?
            .push(notification);
        Ok(())
    }
}

impl NotificationService for RecordingNotifier {
    fn notify_funds_low(&self, email: &str) -> Result<(), Error> {
        self.record(Notification::FundsLow(email.to_owned()))
    }

    fn notify_approaching_pay_in_limit(&self, email: &str) -> Result<(), Error> {
        self.record(Notification::ApproachingPayInLimit(email.to_owned()))
    }
}
