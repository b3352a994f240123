use crate::volume::{icon_for, IconClass, VolumeReading};

/// Popup title, identical for every invocation
pub const SUMMARY: &str = "Volume";

/// Body used when the volume could not be read
pub const UNKNOWN_BODY: &str = "unknown";

/// What a popup shows
///
/// `body` doubles as the content of the coordination file, so two payloads
/// for the same volume always serialise to the same string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub icon: IconClass,
    pub summary: &'static str,
    pub body: String,
}

impl NotificationPayload {
    pub fn from_reading(reading: VolumeReading) -> Self {
        let body = match reading.percentage {
            Some(p) => format!("{}%", p),
            None => UNKNOWN_BODY.to_string(),
        };
        Self {
            icon: icon_for(reading),
            summary: SUMMARY,
            body,
        }
    }

    /// Rebuild a payload from coordination file content
    ///
    /// Content that is not a percentage is shown verbatim with the generic icon.
    pub fn from_body(body: &str) -> Self {
        let reading = body
            .strip_suffix('%')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n <= 100)
            .map_or_else(VolumeReading::absent, VolumeReading::new);
        Self {
            icon: icon_for(reading),
            summary: SUMMARY,
            body: body.to_string(),
        }
    }
}
