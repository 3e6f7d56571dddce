//! Property-based tests for frame encoding/decoding.
//!
//! These verify the framing layer for ALL valid inputs, not just specific
//! examples: round-trip identity across every command tag, equivalence of
//! arbitrary stream splits, and boundary behavior at zero-length and large
//! payloads.

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use roomcast_proto::{Command, Frame, FrameDecoder};

/// Strategy for generating arbitrary command tags.
fn arbitrary_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::JoinRoom),
        Just(Command::MessageText),
        Just(Command::FileOffer),
        Just(Command::FileSize),
        Just(Command::FileChunk),
        Just(Command::JoinRoomResponse),
        Just(Command::MessageTextResponse),
        Just(Command::FileOfferResponse),
        Just(Command::Unknown),
    ]
}

/// Strategy for generating arbitrary frames with payloads up to 4 KiB.
fn arbitrary_frame() -> impl Strategy<Value = Frame> {
    (arbitrary_command(), prop::collection::vec(any::<u8>(), 0..4096))
        .prop_map(|(command, payload)| Frame::new(command, Bytes::from(payload)))
}

fn decode_all(wire: &[u8]) -> Vec<Frame> {
    let mut decoder = FrameDecoder::new();
    let mut buf = BytesMut::from(wire);
    let mut frames = Vec::new();
    while let Some(frame) = decoder.decode(&mut buf).expect("decode should succeed") {
        frames.push(frame);
    }
    assert!(buf.is_empty(), "no leftover bytes after complete frames");
    frames
}

#[test]
fn prop_encode_decode_roundtrip() {
    proptest!(|(frame in arbitrary_frame())| {
        let wire = frame.to_vec().expect("encode should succeed");
        let decoded = decode_all(&wire);

        prop_assert_eq!(decoded.len(), 1);
        prop_assert_eq!(&decoded[0], &frame);
    });
}

#[test]
fn prop_split_feeding_is_equivalent() {
    proptest!(|(
        frames in prop::collection::vec(arbitrary_frame(), 1..6),
        chunk in 1usize..64,
    )| {
        let mut wire = Vec::new();
        for frame in &frames {
            frame.encode(&mut wire).expect("encode should succeed");
        }

        // Feed the stream in `chunk`-sized slices.
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for piece in wire.chunks(chunk) {
            buf.extend_from_slice(piece);
            while let Some(frame) = decoder.decode(&mut buf).expect("decode should succeed") {
                decoded.push(frame);
            }
        }

        prop_assert_eq!(decoded, frames);
    });
}

#[test]
fn prop_incomplete_prefix_yields_nothing() {
    proptest!(|(frame in arbitrary_frame(), cut in 1usize..16)| {
        let wire = frame.to_vec().expect("encode should succeed");
        prop_assume!(cut < wire.len());

        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&wire[..wire.len() - cut]);

        // PROPERTY: a truncated frame never yields a message.
        prop_assert!(decoder.decode(&mut buf).expect("decode should succeed").is_none());
    });
}

#[test]
fn prop_command_byte_preserved() {
    proptest!(|(command in arbitrary_command(), payload in prop::collection::vec(any::<u8>(), 0..128))| {
        let frame = Frame::new(command, Bytes::from(payload));
        let wire = frame.to_vec().expect("encode should succeed");
        let decoded = decode_all(&wire);

        prop_assert_eq!(decoded[0].command(), Some(command));
        prop_assert_eq!(decoded[0].raw_command(), command.to_u8());
    });
}

#[test]
fn zero_length_payload_decodes() {
    let frame = Frame::new(Command::JoinRoomResponse, Bytes::new());
    let decoded = decode_all(&frame.to_vec().expect("encode should succeed"));

    assert_eq!(decoded.len(), 1);
    assert!(decoded[0].payload.is_empty());
}

#[test]
fn megabyte_chunk_round_trips() {
    // Chunk frames must carry payloads up to 2^20 bytes.
    let payload = vec![0xA5u8; 1 << 20];
    let frame = Frame::new(Command::FileChunk, Bytes::from(payload.clone()));
    let decoded = decode_all(&frame.to_vec().expect("encode should succeed"));

    assert_eq!(decoded[0].payload.len(), payload.len());
    assert_eq!(&decoded[0].payload[..], &payload[..]);
}
