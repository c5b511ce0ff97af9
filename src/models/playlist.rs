use serde::{Deserialize, Serialize};

/// Placeholder name for EXTINF lines without a usable title
pub const UNNAMED_CHANNEL: &str = "Unnamed Channel";

/// Single playlist entry (channel/stream)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Playlist statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStats {
    pub total_channels: usize,
    pub group_count: usize,
}

impl PlaylistStats {
    /// Count channels and distinct group labels (ungrouped channels are not a group)
    pub fn from_channels(channels: &[Channel]) -> Self {
        let groups: std::collections::HashSet<&str> = channels
            .iter()
            .filter_map(|c| c.group.as_deref())
            .collect();

        Self {
            total_channels: channels.len(),
            group_count: groups.len(),
        }
    }
}
