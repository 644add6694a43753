use super::checksum::{checksum,append_checksum,split_checksum};

#[test]
fn empty_is_zero() {
    assert_eq!(checksum(&[]),0);
}

#[test]
fn wraps_at_16_bits() {
    // 300 bytes of 0xff sum to 76500, which is 0x2AD4 after wrapping
    let dat = vec![0xff;300];
    assert_eq!(checksum(&dat),(76500u32 % 65536) as u16);
    assert_eq!(checksum(&dat),0x2AD4);
}

#[test]
fn concatenation_adds() {
    let a: Vec<u8> = (0..=255).collect();
    let b: Vec<u8> = (0..1000).map(|i| (i*7 % 251) as u8).collect();
    let mut ab = a.clone();
    ab.extend_from_slice(&b);
    assert_eq!(checksum(&ab),checksum(&a).wrapping_add(checksum(&b)));
    let mut ba = b.clone();
    ba.extend_from_slice(&a);
    assert_eq!(checksum(&ba),checksum(&ab));
}

#[test]
fn append_then_split() {
    let mut block = vec![0xe5;137];
    append_checksum(&mut block);
    assert_eq!(block.len(),139);
    assert_eq!(&block[137..],&(137u16*0xe5).to_le_bytes());
    let (payload,sum) = split_checksum(&block).expect("block too short");
    assert_eq!(payload.len(),137);
    assert_eq!(sum,checksum(payload));
}

#[test]
fn split_needs_two_bytes() {
    assert!(split_checksum(&[1]).is_none());
    assert_eq!(split_checksum(&[0x34,0x12]),Some((&[][..],0x1234)));
}
