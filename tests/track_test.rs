// test of track transfer against in-memory and file images
use std::io::Write;
use fdcserve::drive::{DriveTable,DriveStore};
use fdcserve::drive::mem_store::MemStore;
use fdcserve::drive::file_store::FileStore;
use fdcserve::protocol::Error;
use fdcserve::protocol::checksum::checksum;
use fdcserve::track;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const TRACK_LEN: u16 = 137*16;

/// minidisk image where every byte of track `t` is `t`
fn minidisk() -> Vec<u8> {
    let mut ans = Vec::new();
    for t in 0..35u8 {
        ans.append(&mut vec![t;TRACK_LEN as usize]);
    }
    ans
}

fn block(payload: &[u8]) -> Vec<u8> {
    let mut ans = payload.to_vec();
    ans.extend_from_slice(&checksum(payload).to_le_bytes());
    ans
}

#[test]
fn read_returns_payload_and_checksum() -> STDRESULT {
    let mut table = DriveTable::new(4);
    table.mount(1,Box::new(MemStore::new("mini.dsk",minidisk())))?;
    let drive = table.get_mut(1).expect("no drive");
    let dat = track::read_track(drive,1,12,TRACK_LEN)?;
    assert_eq!(dat.len(),TRACK_LEN as usize + 2);
    assert!(dat[0..TRACK_LEN as usize].iter().all(|b| *b==12));
    let sum = 12u16.wrapping_mul(TRACK_LEN);
    assert_eq!(&dat[TRACK_LEN as usize..],&sum.to_le_bytes());
    assert_eq!(drive.reads(),1);
    Ok(())
}

#[test]
fn read_refusals() -> STDRESULT {
    let mut table = DriveTable::new(4);
    table.mount(0,Box::new(MemStore::new("mini.dsk",minidisk())))?;
    assert!(matches!(track::read_track(table.get_mut(2).expect("no drive"),2,0,TRACK_LEN),Err(Error::DriveNotMounted(2))));
    let drive = table.get_mut(0).expect("no drive");
    assert!(matches!(track::read_track(drive,0,0,4385),Err(Error::TrackLengthExceeded(4385))));
    assert!(matches!(track::read_track(drive,0,35,TRACK_LEN),Err(Error::TrackOutOfRange { track: 35, max: 34 })));
    // track 34 is in range but the image is one track short of it when tracks are longer
    match track::read_track(drive,0,34,TRACK_LEN+100) {
        Err(Error::ShortStoreRead { got, want }) => {
            assert_eq!(want,TRACK_LEN as usize + 100);
            assert!(got < want);
        },
        other => panic!("unexpected {:?}",other)
    }
    assert_eq!(drive.reads(),0);
    Ok(())
}

#[test]
fn bad_checksum_leaves_image_alone() -> STDRESULT {
    let store = MemStore::new("mini.dsk",minidisk());
    let data = store.data();
    let mut table = DriveTable::new(4);
    table.mount(0,Box::new(store))?;
    let mut blk = block(&vec![0xaa;TRACK_LEN as usize]);
    let last = blk.len()-1;
    blk[last] ^= 0x01;
    let drive = table.get_mut(0).expect("no drive");
    assert!(matches!(track::write_track(drive,0,3,TRACK_LEN,&blk),Err(Error::PayloadChecksum {..})));
    assert!(matches!(track::write_track(drive,0,3,TRACK_LEN,&blk[0..100]),Err(Error::ShortPayload { got: 100, .. })));
    assert_eq!(*data.lock().expect("lock"),minidisk());
    assert_eq!(drive.writes(),0);
    Ok(())
}

#[test]
fn partial_write_is_an_error() -> STDRESULT {
    let mut store = MemStore::new("mini.dsk",minidisk());
    store.set_write_limit(Some(100));
    let mut table = DriveTable::new(1);
    table.mount(0,Box::new(store))?;
    let blk = block(&vec![0x55;TRACK_LEN as usize]);
    let drive = table.get_mut(0).expect("no drive");
    match track::write_track(drive,0,1,TRACK_LEN,&blk) {
        Err(Error::ShortStoreWrite { got: 100, want }) => assert_eq!(want,TRACK_LEN as usize),
        other => panic!("unexpected {:?}",other)
    }
    Ok(())
}

#[test]
fn file_write_then_read() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("floppy.dsk");
    let mut f = std::fs::File::create(&path)?;
    f.write_all(&vec![0xe5;77*4384])?;
    drop(f);
    let mut table = DriveTable::new(4);
    let tier = table.mount(3,Box::new(FileStore::open(&path)?))?;
    assert_eq!(tier.max_track(),76);
    let payload: Vec<u8> = (0..4384).map(|i| (i % 256) as u8).collect();
    let drive = table.get_mut(3).expect("no drive");
    track::write_track(drive,3,76,4384,&block(&payload))?;
    let dat = track::read_track(drive,3,76,4384)?;
    assert_eq!(&dat[0..4384],&payload[..]);
    assert_eq!(drive.writes(),1);
    table.unmount(3)?;
    let raw = std::fs::read(&path)?;
    assert_eq!(raw.len(),77*4384);
    assert_eq!(&raw[76*4384..],&payload[..]);
    assert!(raw[0..76*4384].iter().all(|b| *b==0xe5));
    Ok(())
}

#[test]
fn file_store_reads_short_at_eof() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("short.dsk");
    std::fs::write(&path,vec![1;1000])?;
    let mut store = FileStore::open(&path)?;
    assert_eq!(store.name(),"short.dsk");
    assert_eq!(store.size()?,1000);
    store.seek(900)?;
    assert_eq!(store.read(500)?.len(),100);
    Ok(())
}
