use super::frame::Frame;
use super::{Command,ResponseCode,Error,STAT,WSTA,NO_DRIVE,FRAME_LEN};

#[test]
fn stat_command_bytes() {
    let frame = Command::Stat { drive: 0, head_loaded: true, track: 5 }.to_frame();
    // "STAT" sums to 316, plus 1 for the head byte and 5 for the track
    assert_eq!(frame.encode(),[0x53,0x54,0x41,0x54,0x00,0x01,0x05,0x00,0x42,0x01]);
    assert!(frame.is_valid());
}

#[test]
fn decode_fields() {
    let buf = [b'R',b'E',b'A',b'D',0x22,0x31,0x20,0x11,0xff,0xee];
    let frame = Frame::decode(&buf);
    assert_eq!(&frame.tag,b"READ");
    assert_eq!(frame.param1,0x3122);
    assert_eq!(frame.param2,0x1120);
    assert_eq!(frame.checksum,0xeeff);
    assert!(!frame.is_valid());
}

#[test]
fn codec_is_lossless() {
    // includes a non-ASCII tag and an invalid checksum, the codec must not care
    let samples: [[u8;FRAME_LEN];3] = [
        [0;FRAME_LEN],
        [0xff;FRAME_LEN],
        [0x80,0x00,b'x',0x7f,1,2,3,4,5,6]
    ];
    for buf in samples {
        assert_eq!(Frame::decode(&buf).encode(),buf);
    }
}

#[test]
fn response_has_checksum() {
    let frame = Frame::response(WSTA,ResponseCode::ChecksumError,0x1120);
    assert!(frame.is_valid());
    assert_eq!(frame.response_code(),Some(ResponseCode::ChecksumError));
    assert_eq!(Frame::new(STAT,0x0007,0).response_code(),None);
}

#[test]
fn parse_read_write_addressing() {
    let frame = Command::Read { drive: 3, track: 76, len: 4384 }.to_frame();
    assert_eq!(frame.param1,0x304c);
    assert_eq!(Command::parse(&frame).expect("parse failed"),Command::Read { drive: 3, track: 76, len: 4384 });
    let frame = Command::Write { drive: 15, track: 0xfff, len: 137 }.to_frame();
    assert_eq!(frame.param1,0xffff);
    assert_eq!(Command::parse(&frame).expect("parse failed"),Command::Write { drive: 15, track: 4095, len: 137 });
}

#[test]
fn parse_stat_no_drive() {
    let frame = Frame::new(STAT,0x00ff,12);
    assert_eq!(Command::parse(&frame).expect("parse failed"),Command::Stat { drive: NO_DRIVE, head_loaded: false, track: 12 });
}

#[test]
fn tags_are_case_sensitive() {
    let frame = Frame::new(*b"stat",0,0);
    match Command::parse(&frame) {
        Err(Error::UnknownCommand(tag)) => assert_eq!(tag,"stat"),
        other => panic!("unexpected {:?}",other)
    }
}
