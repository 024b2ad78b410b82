use crate::model::ConnectionStatus;
use serde::{Deserialize, Serialize};

/// What the feed area currently shows, in display-priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPhase {
    Loading,
    Error,
    Offline,
    Live,
}

/// Local, non-persisted flags of a mounted feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedFlags {
    pub loading: bool,
    pub error: bool,
    pub playing: bool,
    pub fullscreen: bool,
}

impl FeedFlags {
    /// Flags of a freshly mounted feed
    pub fn mounted() -> Self {
        Self {
            loading: true,
            error: false,
            playing: true,
            fullscreen: false,
        }
    }

    pub fn phase(&self, status: ConnectionStatus) -> FeedPhase {
        if self.loading {
            FeedPhase::Loading
        } else if self.error {
            FeedPhase::Error
        } else if !status.is_online() {
            FeedPhase::Offline
        } else {
            FeedPhase::Live
        }
    }
}

impl Default for FeedFlags {
    fn default() -> Self {
        Self::mounted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_priority() {
        let mut flags = FeedFlags::mounted();
        flags.error = true;
        assert_eq!(flags.phase(ConnectionStatus::Offline), FeedPhase::Loading);

        flags.loading = false;
        assert_eq!(flags.phase(ConnectionStatus::Offline), FeedPhase::Error);

        flags.error = false;
        assert_eq!(flags.phase(ConnectionStatus::Offline), FeedPhase::Offline);
        assert_eq!(flags.phase(ConnectionStatus::Online), FeedPhase::Live);
    }
}
