//! Codec plugin registry
//!
//! Protocol layers never branch on codec: they hand a codec identity (an SDP
//! encoding name, an RTMP AMF value, a [`CodecId`]) to the [`CodecRegistry`],
//! which resolves it to a [`CodecPlugin`] and delegates construction of tracks,
//! RTP/RTMP codec stages and frames.
//!
//! # Architecture
//!
//! ```text
//!    SDP / AMF / CodecId
//!            │
//!            ▼
//!     CodecRegistry ── plugins: HashMap<CodecId, &'static dyn CodecPlugin>
//!            │
//!   ┌────────┼──────────┬──────────────┐
//!   ▼        ▼          ▼              ▼
//! Track   RtpCodec   RtmpCodec   FramePtr / SharedFrame
//! ```
//!
//! Every lookup failure is soft: the caller gets `None` and a warning is
//! logged. An unsupported codec rejects one track, never the process.

pub mod builtin;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::amf::AmfValue;
use crate::codec::{
    amf_from_codec_id, audio_codec_from_amf, codec_from_payload_type, video_codec_from_amf,
    CodecId,
};
use crate::config::MediaConfig;
use crate::error::{Error, Result};
use crate::frame::{CacheableFrame, FramePtr, SharedFrame};
use crate::track::{RtmpCodec, RtpCodec, SdpTrack, Track, TrackParams, TrackPtr};

pub use builtin::{register_builtins, BuiltinPlugin};

/// Format-specific constructors for one codec
///
/// Plugins are immutable and live for the whole process. Capabilities a
/// plugin does not provide keep the default `None`.
pub trait CodecPlugin: Send + Sync {
    fn codec_id(&self) -> CodecId;

    /// Build a track from an SDP media description
    fn track_from_sdp(&self, _sdp: &SdpTrack) -> Option<TrackPtr> {
        None
    }

    /// Build a track from explicit parameters
    fn track_from_params(&self, _params: TrackParams) -> Option<TrackPtr> {
        None
    }

    fn rtp_encoder(&self, _payload_type: u8) -> Option<Arc<dyn RtpCodec>> {
        None
    }

    fn rtp_decoder(&self) -> Option<Arc<dyn RtpCodec>> {
        None
    }

    fn rtmp_encoder(&self, _track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        None
    }

    fn rtmp_decoder(&self, _track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        None
    }

    /// Wrap raw bytes in a frame of this codec
    ///
    /// The frame borrows `data` and is not cacheable.
    fn frame_from_ptr<'a>(&self, data: &'a [u8], dts: u32, pts: u32) -> FramePtr<'a>;
}

/// Registry mapping codec identity to its plugin
pub struct CodecRegistry {
    plugins: HashMap<CodecId, &'static dyn CodecPlugin>,
    config: MediaConfig,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Create an empty registry with default configuration
    pub fn new() -> Self {
        Self::with_config(MediaConfig::default())
    }

    /// Create an empty registry with custom configuration
    pub fn with_config(config: MediaConfig) -> Self {
        Self {
            plugins: HashMap::new(),
            config,
        }
    }

    /// Create a registry holding every built-in plugin
    pub fn with_builtins(config: MediaConfig) -> Self {
        let mut registry = Self::with_config(config);
        register_builtins(&mut registry);
        registry
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Register a plugin under its codec id
    ///
    /// A later registration for the same codec replaces the earlier one.
    pub fn register(&mut self, plugin: &'static dyn CodecPlugin) {
        let codec = plugin.codec_id();
        let replaced = self.plugins.insert(codec, plugin).is_some();
        tracing::info!(codec = %codec, replaced = replaced, "Codec plugin registered");
    }

    pub fn is_registered(&self, codec: CodecId) -> bool {
        self.plugins.contains_key(&codec)
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Registered codecs in numeric order
    pub fn codecs(&self) -> Vec<CodecId> {
        let mut codecs: Vec<CodecId> = self.plugins.keys().copied().collect();
        codecs.sort();
        codecs
    }

    /// Plugin for `codec`, for callers that treat a miss as an error
    pub fn lookup(&self, codec: CodecId) -> Result<&'static dyn CodecPlugin> {
        self.plugins
            .get(&codec)
            .copied()
            .ok_or_else(|| Error::UnsupportedCodec(codec.to_string()))
    }

    fn plugin(&self, codec: CodecId) -> Option<&'static dyn CodecPlugin> {
        let plugin = self.plugins.get(&codec).copied();
        if plugin.is_none() {
            tracing::warn!(codec = %codec, "Codec plugin not registered");
        }
        plugin
    }

    /// Build a track from an SDP media description
    ///
    /// The codec is resolved from the encoding name, falling back to the
    /// static payload type for descriptions without a known name. Clock rate
    /// and channels implied by a static payload type fill in missing values.
    pub fn track_from_sdp(&self, sdp: &SdpTrack) -> Option<TrackPtr> {
        let (codec, sdp) = match CodecId::from_sdp_name(&sdp.codec_name) {
            Some(codec) => (codec, Cow::Borrowed(sdp)),
            None => {
                let Some(info) = codec_from_payload_type(sdp.payload_type) else {
                    tracing::warn!(
                        codec_name = %sdp.codec_name,
                        payload_type = sdp.payload_type,
                        "Unsupported SDP codec"
                    );
                    return None;
                };
                let mut filled = sdp.clone();
                if filled.sample_rate == 0 {
                    filled.sample_rate = info.clock_rate;
                }
                if filled.channels == 0 {
                    filled.channels = info.channels;
                }
                (info.codec, Cow::Owned(filled))
            }
        };

        self.plugin(codec)?.track_from_sdp(&sdp)
    }

    /// Rebuild a track of the same codec and parameters
    pub fn track_from_track(&self, track: &dyn Track) -> Option<TrackPtr> {
        self.track_from_codec(track.codec_id(), track.params())
    }

    /// Build a track from a codec and explicit parameters
    pub fn track_from_codec(&self, codec: CodecId, params: TrackParams) -> Option<TrackPtr> {
        let track = self.plugin(codec)?.track_from_params(params);
        if track.is_none() {
            tracing::warn!(codec = %codec, params = ?params, "Track parameters rejected");
        }
        track
    }

    /// Build a video track from an RTMP `videocodecid` value
    pub fn video_track_from_amf(&self, value: &AmfValue) -> Option<TrackPtr> {
        let codec = video_codec_from_amf(value)?;
        self.track_from_codec(codec, TrackParams::Video)
    }

    /// Build an audio track from an RTMP `audiocodecid` value
    pub fn audio_track_from_amf(
        &self,
        value: &AmfValue,
        sample_rate: u32,
        channels: u8,
        sample_bit: u8,
    ) -> Option<TrackPtr> {
        let codec = audio_codec_from_amf(value)?;
        self.track_from_codec(
            codec,
            TrackParams::Audio {
                sample_rate,
                channels,
                sample_bit,
            },
        )
    }

    pub fn rtp_encoder(&self, codec: CodecId, payload_type: u8) -> Option<Arc<dyn RtpCodec>> {
        self.plugin(codec)?.rtp_encoder(payload_type)
    }

    pub fn rtp_decoder(&self, codec: CodecId) -> Option<Arc<dyn RtpCodec>> {
        self.plugin(codec)?.rtp_decoder()
    }

    pub fn rtmp_encoder(&self, track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        self.plugin(track.codec_id())?.rtmp_encoder(track)
    }

    pub fn rtmp_decoder(&self, track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        self.plugin(track.codec_id())?.rtmp_decoder(track)
    }

    /// RTMP codec id to advertise for `codec`
    ///
    /// H.265 uses its FourCC when enhanced RTMP is enabled.
    pub fn amf_for_codec(&self, codec: CodecId) -> AmfValue {
        amf_from_codec_id(codec, self.config.enhanced_rtmp)
    }

    /// Wrap borrowed bytes in a frame of `codec`
    pub fn frame_from_ptr<'a>(
        &self,
        codec: CodecId,
        data: &'a [u8],
        dts: u32,
        pts: u32,
    ) -> Option<FramePtr<'a>> {
        Some(self.plugin(codec)?.frame_from_ptr(data, dts, pts))
    }

    /// Wrap a shared buffer in a cacheable frame of `codec`
    ///
    /// The frame keeps a reference on `buf` instead of copying it.
    pub fn frame_from_buffer(
        &self,
        codec: CodecId,
        buf: Bytes,
        dts: u32,
        pts: u32,
    ) -> Option<SharedFrame> {
        let plugin = self.plugin(codec)?;
        let view = plugin.frame_from_ptr(&buf, dts, pts);
        Some(Arc::new(CacheableFrame::with_buffer(&view, buf.clone())))
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs())
            .field("config", &self.config)
            .finish()
    }
}
