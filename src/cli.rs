use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const MOUNT_HELP: &str = "Mount the disk image at PATH in drive N, e.g. `--mount 0=cpm22.dsk`.
The option can be repeated.  The file must already exist, it is opened for reading
and writing and is never created or truncated.";
const CONFIG_LONG_HELP: &str = "JSON settings file, for example
{
    \"port\": \"/dev/ttyUSB0\",
    \"baud\": 403200,
    \"drives\": 4,
    \"mount\": [\"cpm22.dsk\", null, \"games.dsk\"],
    \"timing\": { \"commandMs\": 50, \"payloadMs\": 250 }
}
Options given on the command line take precedence.";
const BAUD_HELP: &str = "The FDC+ serial drive runs at 403200 baud.
460800 is within about 3.5% and usually works, 230400 works on almost
any port but is slower than a real disk.";

fn dimg_arg() -> Arg {
    Arg::new("dimg").short('d').long("dimg").help("path to disk image")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .action(ArgAction::Append)
        .required(true)
}

fn ms_arg(name: &'static str,help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
        .value_name("MS")
        .value_parser(value_parser!(u64).range(1..60_000))
        .required(false)
}

pub fn build_cli() -> Command {
    let long_help = "fdcserve is always invoked with exactly one of several subcommands.
The server answers the FDC+ controller over a serial line, serving disk images
from the host as if they were drives.  While it runs, type `help` for the console commands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
find the port:         `fdcserve ports`
serve two drives:      `fdcserve serve -p /dev/ttyUSB0 -m 0=cpm22.dsk -m 1=work.dsk`
serve from settings:   `fdcserve serve -c fdc.json`
check an image:        `fdcserve info -d cpm22.dsk`";

    let mut main_cmd = Command::new("fdcserve")
        .about("Serves disk images to the FDC+ floppy disk controller over a serial line.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("serve")
            .arg(Arg::new("port").short('p').long("port").help("serial port name")
                .value_name("PORT").required(false))
            .arg(Arg::new("baud").short('b').long("baud").help("baud rate")
                .value_name("BAUD")
                .value_parser(value_parser!(u32))
                .long_help(BAUD_HELP)
                .required(false))
            .arg(Arg::new("drives").short('n').long("drives").help("number of drives")
                .value_name("COUNT")
                .value_parser(value_parser!(u64).range(1..=16))
                .required(false))
            .arg(Arg::new("config").short('c').long("config").help("settings file")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .long_help(CONFIG_LONG_HELP)
                .required(false))
            .arg(Arg::new("mount").short('m').long("mount").help("mount an image, N=PATH")
                .value_name("N=PATH")
                .action(ArgAction::Append)
                .long_help(MOUNT_HELP)
                .required(false))
            .arg(ms_arg("command-ms","discard a partial command after this long"))
            .arg(ms_arg("payload-ms","limit on receiving write data"))
            .arg(Arg::new("no-console").long("no-console").help("do not read console commands from stdin")
                .action(ArgAction::SetTrue))
            .about("serve disk images until the console says quit")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("ports")
            .about("list serial ports")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("info")
            .arg(dimg_arg())
            .about("show how disk images would be served")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(Arg::new("shell").short('s').long("shell").help("shell type")
                .value_name("SHELL")
                .value_parser(["bash","elv","fish","ps1","zsh"])
                .required(true))
            .about("write completions script to stdout")
    );
    main_cmd
}
