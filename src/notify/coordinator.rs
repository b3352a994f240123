//! Ownership arbitration and the owner's display loop

use std::time::Instant;
use tracing::{debug, info, warn};

use super::payload::NotificationPayload;
use super::popup::Popup;
use super::record::CoordinationRecord;
use super::APP_NAME;
use crate::app::CoordinationConfig;
use crate::error::Result;

/// What this invocation does after checking the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Another process owns a live popup; our value has been handed over
    WriterOnly,
    /// This process renders the popup
    Owner,
}

/// Summary of a finished owner session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Number of in-place popup updates
    pub updates: usize,
    /// Body displayed when the popup closed
    pub last_body: String,
}

/// Result of publishing a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    WriterOnly,
    Owned(SessionReport),
}

/// Runs the coalescing protocol for one invocation
pub struct Coordinator<P: Popup> {
    config: CoordinationConfig,
    record: CoordinationRecord,
    popup: P,
}

impl<P: Popup> Coordinator<P> {
    pub fn new(config: &CoordinationConfig, popup: P) -> Self {
        Self {
            config: config.clone(),
            record: CoordinationRecord::new(&config.path),
            popup,
        }
    }

    pub fn record(&self) -> &CoordinationRecord {
        &self.record
    }

    /// Hand `payload` to the current owner, or become the owner and display it
    pub fn publish(&mut self, payload: &NotificationPayload) -> Result<Outcome> {
        match self.check_in(&payload.body)? {
            Role::WriterOnly => {
                info!("Popup owned by another process, handed over {}", payload.body);
                Ok(Outcome::WriterOnly)
            }
            Role::Owner => self.run_session(payload).map(Outcome::Owned),
        }
    }

    /// Write our body into the record and decide who renders
    ///
    /// The body is written unconditionally so that the owner always picks up
    /// the freshest value. A record younger than the liveness threshold has a
    /// live owner; an older one was orphaned and is taken over.
    pub fn check_in(&self, body: &str) -> Result<Role> {
        let age = self.record.age()?;
        self.record.write(body)?;

        match age {
            Some(age) if age < self.config.liveness_threshold() => {
                debug!("Record is {:?} old, acting as writer", age);
                Ok(Role::WriterOnly)
            }
            Some(age) => {
                warn!("Taking over stale record ({:?} old)", age);
                Ok(Role::Owner)
            }
            None => Ok(Role::Owner),
        }
    }

    /// Display, extend and close the popup, then delete the record
    ///
    /// The record is deleted even when the popup fails, so a broken
    /// notification server cannot leave a live-looking record behind.
    pub fn run_session(&mut self, payload: &NotificationPayload) -> Result<SessionReport> {
        let displayed = self.display(payload);
        let closed = self.popup.close();
        let removed = self.record.remove();

        let report = displayed?;
        closed?;
        removed?;

        info!(
            "Session finished after {} update(s) at {}",
            report.updates, report.last_body
        );
        Ok(report)
    }

    fn display(&mut self, payload: &NotificationPayload) -> Result<SessionReport> {
        self.popup.init(APP_NAME)?;
        self.popup.show(payload)?;

        let window = self.config.session_window();
        let tick = self.config.poll_interval();
        let mut session_start = Instant::now();
        let mut last_seen = payload.body.clone();
        let mut updates = 0;

        while session_start.elapsed() <= window {
            // Empty content is a writer caught between truncate and write.
            if let Some(content) = self.record.read()? {
                if !content.is_empty() && content != last_seen {
                    debug!("Record changed: {} -> {}", last_seen, content);
                    self.popup.update(&NotificationPayload::from_body(&content))?;
                    last_seen = content;
                    updates += 1;
                    session_start = Instant::now();
                }
            }
            std::thread::sleep(tick);
        }

        Ok(SessionReport {
            updates,
            last_body: last_seen,
        })
    }
}
