use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;
use rsacbc::cmd::{ClientCmd, Cmd, DemoCmd, RsaCbcConfig, ServerCmd};
use rsacbc::log_error;
use std::path::PathBuf;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let version = env!("RSACBC_VERSION_INFO");
    let app = Command::new("rsacbc")
        .version(version)
        .about("rsa-cbc encrypted messages over tcp")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .action(ArgAction::Set)
                .required(false)
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("to specify the config file(json/json5)"),
        )
        .subcommand(ServerCmd::cmd())
        .subcommand(ClientCmd::cmd())
        .subcommand(DemoCmd::cmd())
        .get_matches();

    let config = app.get_one::<PathBuf>("config").map(PathBuf::as_path);
    if log_error(RsaCbcConfig::init(config)).is_none() {
        std::process::exit(1);
    }

    let res = match app.subcommand() {
        Some((ServerCmd::NAME, m)) => ServerCmd.run(m),
        Some((ClientCmd::NAME, m)) => ClientCmd.run(m),
        Some((DemoCmd::NAME, m)) => DemoCmd.run(m),
        Some((name, _)) => Err(anyhow::anyhow!("unsupport for {name}")),
        None => {
            println!(
                "{} {} {}",
                env!("CARGO_PKG_NAME"),
                version,
                env!("RSACBC_GIT_INFO")
            );
            Ok(())
        }
    };

    if log_error(res).is_none() {
        std::process::exit(1);
    }
}
