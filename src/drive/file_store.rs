//! Drive storage backed by a disk image file on the host.
//!
//! The file is opened for reading and writing, never created or truncated.

use std::fs::{File,OpenOptions};
use std::io::{self,Read,Seek,SeekFrom,Write};
use std::path::{Path,PathBuf};
use super::DriveStore;

pub struct FileStore {
    path: PathBuf,
    file: File
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            file
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DriveStore for FileStore {
    fn name(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => self.path.to_string_lossy().to_string()
        }
    }
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
    fn seek(&mut self,offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
    fn read(&mut self,len: usize) -> io::Result<Vec<u8>> {
        let mut ans = Vec::with_capacity(len);
        (&mut self.file).take(len as u64).read_to_end(&mut ans)?;
        Ok(ans)
    }
    fn write(&mut self,dat: &[u8]) -> io::Result<usize> {
        let mut done = 0;
        while done < dat.len() {
            match self.file.write(&dat[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
        Ok(done)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
