//! Media frame core for streaming servers
//!
//! This crate holds the codec-agnostic pieces shared by every protocol layer
//! of a media server (RTMP, RTSP/RTP, MPEG-TS, ...):
//!
//! - [`frame`]: the [`Frame`](frame::Frame) abstraction and its ownership
//!   variants (borrowed view, owned buffer, shared buffer, promotion, sub-range)
//! - [`codec`]: the closed codec taxonomy and per-codec payload inspection
//! - [`factory`]: the [`CodecRegistry`](factory::CodecRegistry) turning a codec
//!   identity into tracks, codec stages and frames
//! - [`dispatcher`]: one-to-many frame fan-out
//! - [`merger`]: reassembly of multi-unit frames into access units
//!
//! # Data flow
//!
//! ```text
//!   demuxer / depacketizer
//!            │  &[u8] or Bytes
//!            ▼
//!   CodecRegistry::frame_from_ptr / frame_from_buffer
//!            │  FramePtr
//!            ▼
//!   FrameDispatcher ──► FrameMerger ──► muxer
//!            │
//!            └──► broadcast::Sender<SharedFrame> ──► async subscribers
//! ```
//!
//! # Example
//!
//! ```
//! use media_frame::codec::CodecId;
//! use media_frame::config::MediaConfig;
//! use media_frame::dispatcher::FrameDispatcher;
//! use media_frame::factory::CodecRegistry;
//! use media_frame::frame::Frame;
//!
//! let registry = CodecRegistry::with_builtins(MediaConfig::default());
//! let dispatcher = FrameDispatcher::new();
//! dispatcher.add_fn(|frame| frame.key_frame());
//!
//! let idr = [0u8, 0, 0, 1, 0x65, 0x88, 0x84];
//! let frame = registry.frame_from_ptr(CodecId::H264, &idr, 0, 0).unwrap();
//! assert!(dispatcher.dispatch(&frame));
//! ```

pub mod amf;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod frame;
pub mod merger;
pub mod track;

pub use codec::{CodecId, TrackType};
pub use config::MediaConfig;
pub use dispatcher::{DelegateId, FrameDispatcher};
pub use error::{Error, Result};
pub use factory::{CodecPlugin, CodecRegistry};
pub use frame::{Frame, FramePtr, FrameWriter, SharedFrame};
pub use merger::{FrameMerger, MergeMode};
pub use track::{MediaTrack, SdpTrack, Track, TrackParams, TrackPtr};
