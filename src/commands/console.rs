//! Operator console.
//!
//! Reads line commands while the server runs, on its own thread.  Everything it does goes
//! through the shared drive table, so a mount or unmount lands between two commands
//! from the controller, never in the middle of one.

use std::io::{BufRead,Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use colored::*;
use log::{info,warn};
use crate::drive::{self,Drive,SharedDriveTable};
use crate::engine::Counters;
use crate::{DYNERR,STDRESULT};
use super::CommandError;

const HELP: &str = "mount <n> <path>   load an image in drive n
unmount <n>        unload drive n
status             show the drives
stats              show the session counters
help               show this message
quit               stop the server";

#[derive(Debug,PartialEq,Eq)]
pub enum Flow {
    Continue,
    Quit
}

pub struct Console {
    drives: SharedDriveTable,
    counters: Arc<Counters>,
    stop: Arc<AtomicBool>,
    prompt: bool
}

fn led(on: bool,lit: ColoredString) -> ColoredString {
    match on {
        true => lit,
        false => "○".dimmed()
    }
}

fn drive_row(idx: usize,d: &Drive) -> String {
    let name = match d.name() {
        Some(name) => name.bold(),
        None => "empty".dimmed()
    };
    let track = match d.is_mounted() {
        true => format!("track {:4}/{:<4}",d.cur_track(),d.max_track()),
        false => format!("track {:>9}","-")
    };
    format!("{:2} {} {} {} reads {:6} writes {:6}  {}",
        idx,
        led(d.enabled(),"●".green()),
        led(d.head_loaded(),"●".yellow()),
        track,d.reads(),d.writes(),name)
}

fn parse_drive(arg: Option<&str>) -> Result<usize,CommandError> {
    match arg {
        Some(s) => usize::from_str_radix(s,10).map_err(|_| CommandError::InvalidCommand),
        None => Err(CommandError::InvalidCommand)
    }
}

impl Console {
    pub fn new(drives: SharedDriveTable,counters: Arc<Counters>,stop: Arc<AtomicBool>) -> Self {
        Self {
            drives,
            counters,
            stop,
            prompt: atty::is(atty::Stream::Stdin)
        }
    }
    pub fn set_prompt(&mut self,prompt: bool) {
        self.prompt = prompt;
    }
    /// Handle lines until `quit` or end of input, then ask the server to stop.
    pub fn run<R: BufRead,W: Write>(&self,input: R,out: &mut W) -> STDRESULT {
        if self.prompt {
            write!(out,"fdc> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            match self.execute(&line?,out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {},
                Err(e) => writeln!(out,"{} {}","error:".red(),e)?
            }
            if self.prompt {
                write!(out,"fdc> ")?;
                out.flush()?;
            }
        }
        info!("console is closing, stopping server");
        self.stop.store(true,Ordering::Relaxed);
        Ok(())
    }
    /// Handle one line
    pub fn execute<W: Write>(&self,line: &str,out: &mut W) -> Result<Flow,DYNERR> {
        let mut words = line.split_whitespace();
        match words.next() {
            None => {},
            Some("mount") => {
                let idx = parse_drive(words.next())?;
                let path = words.collect::<Vec<&str>>().join(" ");
                if path.is_empty() {
                    return Err(Box::new(CommandError::InvalidCommand));
                }
                let tier = super::mount_image(&self.drives,idx,&path)?;
                writeln!(out,"drive {}: {} ({}, tracks 0-{})",idx,path,tier,tier.max_track())?;
            },
            Some("unmount") => {
                let idx = parse_drive(words.next())?;
                drive::lock(&self.drives).unmount(idx)?;
                writeln!(out,"drive {}: empty",idx)?;
            },
            Some("status") => {
                let table = drive::lock(&self.drives);
                for (idx,d) in table.iter().enumerate() {
                    writeln!(out,"{}",drive_row(idx,d))?;
                }
            },
            Some("stats") => {
                let snap = self.counters.snapshot();
                writeln!(out,"STAT {}  READ {}  WRIT {}  errors {}",snap.stat,snap.read,snap.writ,snap.errors)?;
            },
            Some("help") => writeln!(out,"{}",HELP)?,
            Some("quit") | Some("exit") => return Ok(Flow::Quit),
            Some(other) => {
                warn!("unknown console command {}",other);
                writeln!(out,"unknown command `{}`, try `help`",other)?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod console_test;
