use clap;
use std::path::Path;
use log::error;
use crate::drive::Tier;
use crate::protocol::MAX_TRACK_LEN;
use crate::STDRESULT;
use super::CommandError;

/// Show how each image would be classified if it were mounted.
pub fn info(cmd: &clap::ArgMatches) -> STDRESULT {
    let paths: Vec<&String> = match cmd.get_many::<String>("dimg") {
        Some(paths) => paths.collect(),
        None => return Err(Box::new(CommandError::InvalidCommand))
    };
    for path in paths {
        if !Path::new(path).is_file() {
            error!("{} is not a file",path);
            return Err(Box::new(CommandError::FileNotFound));
        }
        let size = std::fs::metadata(path)?.len();
        let tier = Tier::from_size(size);
        let tracks = tier.max_track() as u64 + 1;
        println!("{}: {} bytes, {}, tracks 0-{}",path,size,tier,tier.max_track());
        if size > tracks * MAX_TRACK_LEN as u64 {
            println!("    only the first {} bytes can be reached",tracks * MAX_TRACK_LEN as u64);
        }
    }
    Ok(())
}
