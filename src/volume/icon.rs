use super::VolumeReading;

/// Icon shown next to the volume popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconClass {
    /// Volume unknown
    Generic,
    Muted,
    Low,
    Medium,
    High,
}

impl IconClass {
    /// Freedesktop icon name
    pub fn icon_name(self) -> &'static str {
        match self {
            IconClass::Generic => "audio-card",
            IconClass::Muted => "notification-audio-volume-off",
            IconClass::Low => "notification-audio-volume-low",
            IconClass::Medium => "notification-audio-volume-medium",
            IconClass::High => "notification-audio-volume-high",
        }
    }
}

/// Map a reading to its icon
///
/// 0 is muted, then low below 30, medium below 60, high up to 100.
pub fn icon_for(reading: VolumeReading) -> IconClass {
    match reading.percentage {
        None => IconClass::Generic,
        Some(0) => IconClass::Muted,
        Some(1..=29) => IconClass::Low,
        Some(30..=59) => IconClass::Medium,
        Some(_) => IconClass::High,
    }
}
