//! ## Frame Codec
//!
//! Every command and every framed response has the same shape:
//!
//! Bytes 0-3 | Bytes 4-5 | Bytes 6-7 | Bytes 8-9
//! ----------|-----------|-----------|----------
//! tag       | param 1   | param 2   | checksum
//!
//! Words are little endian.  In responses parameter 1 is the response code and
//! parameter 2 is the response data.  The checksum is the 16 bit sum of bytes 0-7.
//! The codec itself never inspects the tag or validates the checksum.

use super::{Tag,ResponseCode,FRAME_LEN,COMMAND_LEN};
use super::checksum::checksum;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Frame {
    pub tag: Tag,
    pub param1: u16,
    pub param2: u16,
    pub checksum: u16
}

impl Frame {
    /// Create a frame with the checksum already stamped.
    pub fn new(tag: Tag,param1: u16,param2: u16) -> Self {
        let mut ans = Self { tag, param1, param2, checksum: 0 };
        ans.checksum = ans.calc_checksum();
        ans
    }
    /// Create a response frame with the checksum already stamped.
    pub fn response(tag: Tag,code: ResponseCode,data: u16) -> Self {
        Self::new(tag,code.word(),data)
    }
    pub fn decode(buf: &[u8;FRAME_LEN]) -> Self {
        Self {
            tag: [buf[0],buf[1],buf[2],buf[3]],
            param1: u16::from_le_bytes([buf[4],buf[5]]),
            param2: u16::from_le_bytes([buf[6],buf[7]]),
            checksum: u16::from_le_bytes([buf[8],buf[9]])
        }
    }
    pub fn encode(&self) -> [u8;FRAME_LEN] {
        let mut ans = [0;FRAME_LEN];
        ans[0..4].copy_from_slice(&self.tag);
        ans[4..6].copy_from_slice(&self.param1.to_le_bytes());
        ans[6..8].copy_from_slice(&self.param2.to_le_bytes());
        ans[8..10].copy_from_slice(&self.checksum.to_le_bytes());
        ans
    }
    /// Checksum of the first 8 encoded bytes, regardless of the stored checksum
    pub fn calc_checksum(&self) -> u16 {
        checksum(&self.encode()[0..COMMAND_LEN])
    }
    pub fn is_valid(&self) -> bool {
        self.calc_checksum() == self.checksum
    }
    /// Interpret parameter 1 as a response code
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::from_word(self.param1)
    }
}
