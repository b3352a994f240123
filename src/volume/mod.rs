//! Volume controller: adjust and read the level, pick the popup icon

pub mod icon;

use tracing::{info, warn};

use crate::backend::{AudioBackend, Direction};
use crate::error::Result;

pub use icon::{icon_for, IconClass};

/// Current volume as reported by the backend
///
/// `None` means the backend output could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeReading {
    pub percentage: Option<u8>,
}

impl VolumeReading {
    pub fn new(percentage: u32) -> Self {
        Self {
            percentage: Some(percentage.min(100) as u8),
        }
    }

    pub fn absent() -> Self {
        Self { percentage: None }
    }
}

impl From<Option<u32>> for VolumeReading {
    fn from(value: Option<u32>) -> Self {
        value.map_or_else(Self::absent, Self::new)
    }
}

/// Reads and changes the volume through a single backend
pub struct VolumeController<'a> {
    backend: Box<dyn AudioBackend + 'a>,
}

impl<'a> VolumeController<'a> {
    pub fn new(backend: Box<dyn AudioBackend + 'a>) -> Self {
        Self { backend }
    }

    /// Raise or lower the volume by `step` percent
    pub fn adjust(&self, direction: Direction, step: u32) -> Result<()> {
        info!("Adjusting volume {:?} by {}% ({:?})", direction, step, self.backend.kind());
        self.backend.adjust(direction, step)
    }

    /// Current volume; unparsable output yields an absent reading
    pub fn read(&self) -> Result<VolumeReading> {
        let reading = VolumeReading::from(self.backend.read_percentage()?);
        if reading.percentage.is_none() {
            warn!("Master volume could not be read from {:?}", self.backend.kind());
        }
        Ok(reading)
    }
}
