use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs
use std::io::Write;
use tempfile;

type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn image(dir: &tempfile::TempDir,name: &str,size: usize) -> Result<String,Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(&vec![0xe5;size])?;
    Ok(path.to_str().ok_or("path not UTF8")?.to_string())
}

#[test]
fn info_tiers() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let mini = image(&dir,"mini.dsk",35*137*16)?;
    let floppy = image(&dir,"floppy.dsk",77*137*32)?;
    let big = image(&dir,"big.dsk",8*1024*1024)?;
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("info")
        .arg("-d").arg(&mini)
        .arg("-d").arg(&floppy)
        .arg("-d").arg(&big)
        .assert()
        .success()
        .stdout(predicate::str::contains("minidisk, tracks 0-34"))
        .stdout(predicate::str::contains("8 inch floppy, tracks 0-76"))
        .stdout(predicate::str::contains("large disk, tracks 0-2047"));
    Ok(())
}

#[test]
fn info_missing_image() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("info")
        .arg("-d").arg(dir.path().join("nothing.dsk"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a file"));
    Ok(())
}

#[test]
fn serve_needs_port() -> STDRESULT {
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("serve")
        .arg("--no-console")
        .assert()
        .failure()
        .stderr(predicate::str::contains("a serial port is needed"));
    Ok(())
}

#[test]
fn serve_bad_mount() -> STDRESULT {
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("serve")
        .arg("-p").arg("nonexistent-port")
        .arg("-m").arg("cpm.dsk")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidCommand"));
    Ok(())
}

#[test]
fn serve_bad_settings() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fdc.json");
    std::fs::write(&path,r#"{"port": "nonexistent-port", "drives": 40}"#)?;
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("serve")
        .arg("-c").arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DriveCount(40)"));
    Ok(())
}

#[test]
fn drive_count_range() -> STDRESULT {
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("serve")
        .arg("-p").arg("nonexistent-port")
        .arg("-n").arg("17")
        .assert()
        .failure()
        .stderr(predicate::str::contains("17"));
    Ok(())
}

#[test]
fn completions_script() -> STDRESULT {
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.arg("completions")
        .arg("-s").arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("fdcserve"));
    Ok(())
}

#[test]
fn no_subcommand() -> STDRESULT {
    let mut cmd = Command::cargo_bin("fdcserve")?;
    cmd.assert()
        .failure();
    Ok(())
}
