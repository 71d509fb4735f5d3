//! Media core configuration

/// Default bound on frames held by a [`FrameMerger`](crate::merger::FrameMerger)
/// before it flushes regardless of timestamps
pub const DEFAULT_MERGER_MAX_CACHED_FRAMES: usize = 100;

/// Configuration options for the codec registry and frame merging
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Advertise H.265 to RTMP peers with its enhanced-RTMP FourCC instead of
    /// the legacy numeric codec id
    pub enhanced_rtmp: bool,

    /// Maximum frames a merger buffers for one presentation unit
    pub merger_max_cached_frames: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enhanced_rtmp: false,
            merger_max_cached_frames: DEFAULT_MERGER_MAX_CACHED_FRAMES,
        }
    }
}

impl MediaConfig {
    /// Enable or disable enhanced-RTMP codec signalling
    pub fn enhanced_rtmp(mut self, enabled: bool) -> Self {
        self.enhanced_rtmp = enabled;
        self
    }

    /// Set the merger cache bound (at least one frame)
    pub fn merger_max_cached_frames(mut self, max: usize) -> Self {
        self.merger_max_cached_frames = max.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MediaConfig::default();

        assert!(!config.enhanced_rtmp);
        assert_eq!(
            config.merger_max_cached_frames,
            DEFAULT_MERGER_MAX_CACHED_FRAMES
        );
    }

    #[test]
    fn test_builder_chaining() {
        let config = MediaConfig::default()
            .enhanced_rtmp(true)
            .merger_max_cached_frames(16);

        assert!(config.enhanced_rtmp);
        assert_eq!(config.merger_max_cached_frames, 16);
    }

    #[test]
    fn test_merger_bound_never_zero() {
        let config = MediaConfig::default().merger_max_cached_frames(0);

        assert_eq!(config.merger_max_cached_frames, 1);
    }
}
