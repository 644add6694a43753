//! ## Track Transfer
//!
//! Track data is sent as a sequence of bytes followed by a 16 bit, little endian
//! checksum of those bytes.  The transfer length named in the command does NOT include
//! the two checksum bytes.  The image is a flat sequence of tracks, so that track `t` of
//! length `n` begins at byte `t*n`.
//!
//! The length is not inferred from the image, the controller is trusted to send the
//! track length it formatted the disk with, subject only to `MAX_TRACK_LEN`.

use log::{trace,warn};
use crate::drive::Drive;
use crate::protocol::{Error,MAX_TRACK_LEN};
use crate::protocol::checksum::{checksum,append_checksum,split_checksum};

/// Byte offset of a track in a flat image
pub fn track_offset(track: u16,len: u16) -> u64 {
    track as u64 * len as u64
}

/// Check a `READ` or `WRIT` request against a drive.
/// Conditions are tested in the order mounted, length, range.
pub fn check_request(drive: &Drive,idx: usize,track: u16,len: u16) -> Result<(),Error> {
    if !drive.is_mounted() {
        return Err(Error::DriveNotMounted(idx));
    }
    if len as usize > MAX_TRACK_LEN {
        return Err(Error::TrackLengthExceeded(len));
    }
    if !drive.track_in_range(track) {
        return Err(Error::TrackOutOfRange { track, max: drive.max_track() });
    }
    Ok(())
}

/// Read a track and return it with its checksum appended, ready to send.
pub fn read_track(drive: &mut Drive,idx: usize,track: u16,len: u16) -> Result<Vec<u8>,Error> {
    check_request(drive,idx,track,len)?;
    let want = len as usize;
    let offset = track_offset(track,len);
    let store = drive.store().ok_or(Error::DriveNotMounted(idx))?;
    if let Err(e) = store.seek(offset) {
        warn!("READ seek to {} failed on drive {}: {}",offset,idx,e);
    }
    let mut buf = match store.read(want) {
        Ok(dat) => dat,
        Err(e) => {
            warn!("READ failed on drive {}: {}",idx,e);
            return Err(Error::ShortStoreRead { got: 0, want });
        }
    };
    if buf.len() != want {
        return Err(Error::ShortStoreRead { got: buf.len(), want });
    }
    append_checksum(&mut buf);
    drive.count_read();
    trace!("read drive {} track {} at offset {}",idx,track,offset);
    Ok(buf)
}

/// Check a received block of track data, returning the payload.
/// The block must be exactly `len` bytes plus the 2 checksum bytes.
pub fn verify_block(block: &[u8],len: u16) -> Result<&[u8],Error> {
    let want = len as usize + 2;
    if block.len() != want {
        return Err(Error::ShortPayload { got: block.len(), want });
    }
    match split_checksum(block) {
        Some((payload,recv)) => {
            let calc = checksum(payload);
            if calc != recv {
                return Err(Error::PayloadChecksum { calc, recv });
            }
            Ok(payload)
        },
        None => Err(Error::ShortPayload { got: block.len(), want })
    }
}

/// Verify a received block and write its payload to the image.
/// Nothing is written unless the checksum matches.
pub fn write_track(drive: &mut Drive,idx: usize,track: u16,len: u16,block: &[u8]) -> Result<(),Error> {
    let payload = verify_block(block,len)?;
    check_request(drive,idx,track,len)?;
    let offset = track_offset(track,len);
    let store = drive.store().ok_or(Error::DriveNotMounted(idx))?;
    if let Err(e) = store.seek(offset) {
        warn!("WRIT seek to {} failed on drive {}: {}",offset,idx,e);
        return Err(Error::SeekFailure(offset));
    }
    let got = match store.write(payload) {
        Ok(count) => count,
        Err(e) => {
            warn!("WRIT failed on drive {}: {}",idx,e);
            0
        }
    };
    if got != payload.len() {
        return Err(Error::ShortStoreWrite { got, want: payload.len() });
    }
    if let Err(e) = store.flush() {
        warn!("flush failed on drive {}: {}",idx,e);
    }
    drive.count_write();
    trace!("wrote drive {} track {} at offset {}",idx,track,offset);
    Ok(())
}
