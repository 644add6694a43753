use clap_complete::shells;
use crate::STDRESULT;
use super::CommandError;

pub fn generate(mut main_cmd: clap::Command,cmd: &clap::ArgMatches) -> STDRESULT {
    let shell = cmd.get_one::<String>("shell").ok_or(CommandError::InvalidCommand)?;
    let mut out = std::io::stdout();
    match shell.as_str() {
        "bash" => clap_complete::generate(shells::Bash,&mut main_cmd,"fdcserve",&mut out),
        "elv" => clap_complete::generate(shells::Elvish,&mut main_cmd,"fdcserve",&mut out),
        "fish" => clap_complete::generate(shells::Fish,&mut main_cmd,"fdcserve",&mut out),
        "ps1" => clap_complete::generate(shells::PowerShell,&mut main_cmd,"fdcserve",&mut out),
        "zsh" => clap_complete::generate(shells::Zsh,&mut main_cmd,"fdcserve",&mut out),
        _ => return Err(Box::new(CommandError::InvalidCommand))
    }
    Ok(())
}
