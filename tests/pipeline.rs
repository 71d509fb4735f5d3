//! End-to-end frame pipeline: ingest, fan-out, merge, broadcast

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use media_frame::codec::h264::LengthPrefixedUnits;
use media_frame::frame::split_annexb;
use media_frame::{
    CodecId, CodecRegistry, Frame, FrameDispatcher, FrameMerger, FramePtr, MediaConfig, MergeMode,
    SdpTrack, SharedFrame, Track, TrackParams,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_frame=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// SPS + PPS + IDR in one Annex B buffer, as an encoder emits a key frame
const KEY_UNIT: [u8; 20] = [
    0, 0, 0, 1, 0x67, 0x64, 0x00, //
    0, 0, 0, 1, 0x68, 0xEE, //
    0, 0, 0, 1, 0x65, 0x88, 0x84,
];

const SLICE: [u8; 6] = [0, 0, 0, 1, 0x41, 0x9A];

type Merged = Vec<(u32, Bytes, bool)>;

#[tokio::test]
async fn test_ingest_split_merge_and_broadcast() {
    init_tracing();

    let registry = CodecRegistry::with_builtins(MediaConfig::default());
    let track = registry.track_from_sdp(&SdpTrack::new("H264", 96)).unwrap();
    assert_eq!(track.params(), TrackParams::Video);

    // RTMP-style muxer branch: merge NAL units into length-prefixed units
    let merger = Arc::new(Mutex::new(FrameMerger::new(MergeMode::LengthPrefixed)));
    let merged = Arc::new(Mutex::new(Merged::new()));

    let dispatcher = FrameDispatcher::new();
    {
        let merger = Arc::clone(&merger);
        let merged = Arc::clone(&merged);
        dispatcher.add_fn(move |frame| {
            let mut out = merged.lock();
            merger
                .lock()
                .input_frame(frame, |dts, _pts, buf, key| out.push((dts, buf, key)))
        });
    }

    // Async subscriber branch
    let (tx, mut rx) = broadcast::channel::<SharedFrame>(16);
    dispatcher.add(Arc::new(tx));

    // Key frame from a borrowed buffer, split into NAL units
    {
        let ingest = KEY_UNIT.to_vec();
        let frame = registry.frame_from_ptr(CodecId::H264, &ingest, 0, 0).unwrap();
        for unit in split_annexb(&frame) {
            assert!(dispatcher.dispatch(&unit));
        }
    }

    // Next picture from a shared buffer
    let frame = registry
        .frame_from_buffer(CodecId::H264, Bytes::from_static(&SLICE), 40, 40)
        .unwrap();
    let frame: FramePtr<'_> = frame;
    assert!(dispatcher.dispatch(&frame));

    merger.lock().flush(|dts, _pts, buf, key| merged.lock().push((dts, buf, key)));

    let merged = merged.lock();
    assert_eq!(merged.len(), 2);

    let (dts, buf, key) = &merged[0];
    assert_eq!((*dts, *key), (0, true));
    let units: Vec<&[u8]> = LengthPrefixedUnits::new(buf, 4)
        .map(|r| &buf[r.start + 4..r.end])
        .collect();
    assert_eq!(units, vec![&KEY_UNIT[4..7], &KEY_UNIT[11..13], &KEY_UNIT[17..]]);

    let (dts, buf, key) = &merged[1];
    assert_eq!((*dts, *key), (40, false));
    assert_eq!(&buf[..], &[0, 0, 0, 2, 0x41, 0x9A]);

    // Subscribers got every unit, promoted so they outlive the ingest buffer
    let mut received = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        received.push(frame);
    }
    assert_eq!(received.len(), 4);
    assert!(received.iter().all(|f| f.cacheable()));
    assert!(received[0].config_frame());
    assert!(received[2].key_frame());
    assert_eq!(received[3].dts(), 40);
}

#[test]
fn test_unsupported_stream_is_rejected_softly() {
    init_tracing();

    let registry = CodecRegistry::with_builtins(MediaConfig::default());
    assert!(registry.track_from_sdp(&SdpTrack::new("MP4V-ES", 97)).is_none());

    // The registry remains usable for other streams
    let track = registry.track_from_sdp(&SdpTrack::new("PCMA", 8)).unwrap();
    assert_eq!(track.codec_id(), CodecId::G711A);
    assert_eq!(track.params(), TrackParams::audio(8000, 1));
}
