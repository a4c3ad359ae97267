use clap::Parser;
use clio::Input;

use crate::command::Command;

#[derive(Debug, Parser)]
#[command(name = "rides", about = "Ride sharing scheduling client")]
pub struct Opt {
    /// Config file path
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: Input,

    #[command(subcommand)]
    pub command: Command,
}
