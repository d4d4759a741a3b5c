use clap::{ArgMatches, Command};

pub trait Cmd {
    const NAME: &'static str;

    fn cmd() -> Command;

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()>;
}

mod config;
pub use config::RsaCbcConfig;

mod server;
pub use server::ServerCmd;

mod client;
pub use client::ClientCmd;

mod demo;
pub use demo::DemoCmd;
