use crate::cmd::{Cmd, RsaCbcConfig};
use crate::session::Server;
use cipher::DefaultRand;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;
use std::time::Instant;

pub struct ServerCmd;

impl Cmd for ServerCmd {
    const NAME: &'static str = "server";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("generate a rsa key pair, publish the public key and decrypt client messages")
            .arg(
                Arg::new("host")
                    .long("host")
                    .short('H')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(String))
                    .help("to specify the address to listen on"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .short('p')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(u16))
                    .help("to specify the port to listen on"),
            )
            .arg(
                Arg::new("bits")
                    .long("bits")
                    .short('b')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("to specify the public key modulus bits length"),
            )
            .arg(
                Arg::new("rounds")
                    .long("rounds")
                    .short('t')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("to specify the Miller-Rabin test rounds"),
            )
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let cfg = RsaCbcConfig::config();
        let (host, port, bits, rounds) = (
            m.get_one::<String>("host").unwrap_or(&cfg.bind_host),
            m.get_one::<u16>("port").copied().unwrap_or(cfg.port),
            m.get_one::<usize>("bits").copied().unwrap_or(cfg.bits),
            m.get_one::<usize>("rounds")
                .copied()
                .unwrap_or(cfg.prime_test_rounds),
        );

        if bits < 2048 {
            log::warn!("{bits}-bits rsa modulus is not secure, use 2048 bits or more outside of demonstrations");
        }

        let t = Instant::now();
        let key = cfg
            .key_generator(bits, rounds)
            .generate(&mut DefaultRand::default())?;
        log::info!("generated rsa keys in {:?}", t.elapsed());
        log::info!("n: {}", key.public_key().modules());
        log::info!("e: {}", key.public_key().exponent());
        log::trace!("d: {}", key.private_exponent());

        let server = Server::bind((host.as_str(), port), Arc::new(key), cfg.max_payload)?;
        log::info!("server is listening on {}", server.local_addr()?);
        server.serve();

        Ok(())
    }
}
