//! Nesting depth limits across every codec

mod common;

use common::nested_chain;
use vessel_codec::{AnyCodec, Codec, FormatId, FrameCodec, MsgPackReader};
use vessel_config::CodecSettings;
use vessel_types::{ErrorCode, Value, MAX_NESTING_DEPTH};

#[test]
fn test_forty_levels_fail_in_every_format() {
    let deep = nested_chain(40);
    for format in FormatId::ALL {
        let err = AnyCodec::for_format(format).encode(&deep).unwrap_err();
        assert_eq!(err.code, ErrorCode::MaxSizeExceeded, "{format}");
        assert_eq!(err.component, format.name());
    }
}

#[test]
fn test_the_limit_itself_is_allowed() {
    let at_limit = nested_chain(MAX_NESTING_DEPTH);
    for format in FormatId::ALL {
        assert!(AnyCodec::for_format(format).encode(&at_limit).is_ok(), "{format}");
    }

    let codec = FrameCodec::new();
    let decoded = codec.decode(&codec.encode(&at_limit).unwrap()).unwrap();
    assert_eq!(decoded, at_limit);
}

#[test]
fn test_configured_limit_is_honoured() {
    let settings = CodecSettings {
        max_depth: 2,
        ..CodecSettings::default()
    };
    let codec = AnyCodec::with_settings(FormatId::Frame, settings);
    assert!(codec.encode(&nested_chain(2)).is_ok());
    assert_eq!(
        codec.encode(&nested_chain(3)).unwrap_err().code,
        ErrorCode::MaxSizeExceeded
    );
}

#[test]
fn test_hand_built_deep_frame_is_rejected_on_decode() {
    let mut frame = String::from("@data={{}};");
    for _ in 0..40 {
        frame = format!("@data={{{{[c,14,{}:{}];}}}};", frame.len(), frame);
    }
    let err = FrameCodec::new().decode(frame.as_bytes()).unwrap_err();
    assert_eq!(err.code, ErrorCode::MaxSizeExceeded);
}

#[test]
fn test_deeply_nested_msgpack_arrays_are_rejected() {
    let mut bytes = vec![0x91u8; 64];
    bytes.push(0xc0);
    let err = MsgPackReader::new(&bytes, MAX_NESTING_DEPTH).read_value(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::MaxSizeExceeded);

    let shallow = [0x91u8, 0x91, 0xc0];
    assert_eq!(
        MsgPackReader::new(&shallow, MAX_NESTING_DEPTH).read_value(0).unwrap(),
        Value::Array(vec![Value::Array(vec![Value::Null])])
    );
}
