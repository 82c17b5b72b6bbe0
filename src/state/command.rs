//! Typed timer operations

use crate::settings::SettingsUpdate;

/// One atomic change to the timer. Every control request maps to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Pause,
    Resume,
    TogglePause,
    AddTime(u64),
    SubtractTime(u64),
    SetRemaining(u64),
    SetTotal(i64),
    SetNumSegments(i64),
    SetMetadata {
        logo_url: Option<String>,
        message: Option<String>,
    },
    UpdateSettings(SettingsUpdate),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::TogglePause => "toggle",
            Self::AddTime(_) => "add_time",
            Self::SubtractTime(_) => "subtract_time",
            Self::SetRemaining(_) => "set_remaining",
            Self::SetTotal(_) => "set_total",
            Self::SetNumSegments(_) => "set_ends",
            Self::SetMetadata { .. } => "set_metadata",
            Self::UpdateSettings(_) => "config",
        }
    }

    /// Whether a successful run of this command should be persisted
    pub fn changes_settings(&self) -> bool {
        matches!(
            self,
            Self::SetTotal(_)
                | Self::SetNumSegments(_)
                | Self::SetMetadata { .. }
                | Self::UpdateSettings(_)
        )
    }
}
