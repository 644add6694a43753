use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use crate::drive::{self,DriveTable,SharedDriveTable};
use crate::drive::mem_store::MemStore;
use crate::engine::Counters;
use super::{Console,Flow};

fn setup() -> (Console,SharedDriveTable,Arc<AtomicBool>) {
    let table = drive::shared(DriveTable::new(4));
    let stop = Arc::new(AtomicBool::new(false));
    let mut console = Console::new(Arc::clone(&table),Arc::new(Counters::default()),Arc::clone(&stop));
    console.set_prompt(false);
    (console,table,stop)
}

fn exec(console: &Console,line: &str) -> (Flow,String) {
    let mut out = Vec::new();
    let flow = console.execute(line,&mut out).expect("command failed");
    (flow,String::from_utf8(out).expect("not UTF8"))
}

#[test]
fn mount_and_unmount() -> Result<(),Box<dyn std::error::Error>> {
    let (console,table,_) = setup();
    let mut img = tempfile::NamedTempFile::new()?;
    img.write_all(&vec![0;137*32*35])?;
    let path = img.path().to_str().expect("path not UTF8").to_string();
    let (flow,out) = exec(&console,&format!("mount 2 {}",path));
    assert_eq!(flow,Flow::Continue);
    assert!(out.contains("minidisk"));
    assert_eq!(drive::lock(&table).mounted_mask(),0b100);
    let mut sink = Vec::new();
    assert!(console.execute(&format!("mount 2 {}",path),&mut sink).is_err());
    exec(&console,"unmount 2");
    assert_eq!(drive::lock(&table).mounted_mask(),0);
    assert!(console.execute("unmount 2",&mut sink).is_err());
    assert!(console.execute("unmount",&mut sink).is_err());
    assert!(console.execute("mount 1",&mut sink).is_err());
    Ok(())
}

#[test]
fn status_rows() {
    let (console,table,_) = setup();
    drive::lock(&table).mount(1,Box::new(MemStore::new("games.dsk",vec![0;400_000]))).expect("mount failed");
    drive::lock(&table).select(1,true).expect("select failed");
    let (_,out) = exec(&console,"status");
    let rows: Vec<&str> = out.lines().collect();
    assert_eq!(rows.len(),4);
    assert!(rows[1].contains("games.dsk"));
    assert!(rows[1].contains("/76"));
    assert!(rows[0].contains("empty"));
}

#[test]
fn quit_sets_stop() -> Result<(),Box<dyn std::error::Error>> {
    let (console,_,stop) = setup();
    let mut out = Vec::new();
    console.run("help\nbogus\nstats\nquit\nstatus\n".as_bytes(),&mut out)?;
    assert!(stop.load(Ordering::Relaxed));
    let text = String::from_utf8(out)?;
    assert!(text.contains("unload drive n"));
    assert!(text.contains("unknown command `bogus`"));
    assert!(text.contains("STAT 0"));
    Ok(())
}

#[test]
fn end_of_input_stops() -> Result<(),Box<dyn std::error::Error>> {
    let (console,_,stop) = setup();
    let mut out = Vec::new();
    console.run("".as_bytes(),&mut out)?;
    assert!(stop.load(Ordering::Relaxed));
    Ok(())
}
