//! Popup rendering

use notify_rust::{Notification, NotificationHandle};
use tracing::debug;

use super::payload::NotificationPayload;
use crate::error::{Result, VolumenError};

/// A single on-screen notification that can be shown, updated in place and closed
pub trait Popup {
    /// Prepare the notification subsystem
    fn init(&mut self, app_name: &str) -> Result<()>;

    /// Display a new popup
    fn show(&mut self, payload: &NotificationPayload) -> Result<()>;

    /// Replace the content of the visible popup
    fn update(&mut self, payload: &NotificationPayload) -> Result<()>;

    /// Dismiss the popup; closing without a visible popup does nothing
    fn close(&mut self) -> Result<()>;
}

/// Freedesktop notification popup (D-Bus via notify-rust)
#[derive(Default)]
pub struct DesktopPopup {
    app_name: String,
    handle: Option<NotificationHandle>,
}

impl DesktopPopup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Popup for DesktopPopup {
    fn init(&mut self, app_name: &str) -> Result<()> {
        self.app_name = app_name.to_string();
        Ok(())
    }

    fn show(&mut self, payload: &NotificationPayload) -> Result<()> {
        debug!("Showing notification: {} - {}", payload.summary, payload.body);

        let handle = Notification::new()
            .appname(&self.app_name)
            .summary(payload.summary)
            .body(&payload.body)
            .icon(payload.icon.icon_name())
            .show()
            .map_err(|e| VolumenError::Notification(e.to_string()))?;
        self.handle = Some(handle);
        Ok(())
    }

    fn update(&mut self, payload: &NotificationPayload) -> Result<()> {
        match self.handle.as_mut() {
            Some(handle) => {
                debug!("Updating notification: {}", payload.body);
                handle
                    .summary(payload.summary)
                    .body(&payload.body)
                    .icon(payload.icon.icon_name());
                handle.update();
                Ok(())
            }
            None => self.show(payload),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        Ok(())
    }
}
