use crate::cmd::{Cmd, RsaCbcConfig};
use crate::session::{ClientSession, Transport};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::{BufRead, Write};
use std::net::TcpStream;

pub struct ClientCmd;

impl ClientCmd {
    fn send<T: Transport>(session: &mut ClientSession<T>, msg: &str) -> anyhow::Result<()> {
        let ack = session.send_message(msg)?;
        print!("Server response: {ack}");
        if !ack.ends_with('\n') {
            println!();
        }
        Ok(())
    }

    fn interactive<T: Transport>(session: &mut ClientSession<T>) -> anyhow::Result<()> {
        let (stdin, mut line) = (std::io::stdin(), String::new());
        loop {
            print!("Enter message (or '.' to quit): ");
            std::io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            let msg = line.trim_end_matches(['\r', '\n']);
            if msg == "." {
                break;
            }

            Self::send(session, msg)?;
        }

        Ok(())
    }
}

impl Cmd for ClientCmd {
    const NAME: &'static str = "client";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("receive the server public key and send rsa-cbc encrypted messages")
            .arg(
                Arg::new("host")
                    .long("host")
                    .short('H')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(String))
                    .help("to specify the server address"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .short('p')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(u16))
                    .help("to specify the server port"),
            )
            .arg(
                Arg::new("msg")
                    .long("message")
                    .short('m')
                    .action(ArgAction::Append)
                    .required(false)
                    .value_parser(value_parser!(String))
                    .help("to specify the messages to send, read messages from stdin when not specified"),
            )
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let cfg = RsaCbcConfig::config();
        let (host, port) = (
            m.get_one::<String>("host").unwrap_or(&cfg.host),
            m.get_one::<u16>("port").copied().unwrap_or(cfg.port),
        );

        log::info!("connecting to {host}:{port}");
        let stream = TcpStream::connect((host.as_str(), port))?;
        log::info!("connected to {}", stream.peer_addr()?);

        let mut session = ClientSession::connect(stream, cfg.max_payload)?;
        let res = match m.get_many::<String>("msg") {
            Some(msgs) => msgs
                .into_iter()
                .try_for_each(|msg| Self::send(&mut session, msg)),
            None => Self::interactive(&mut session),
        };

        session.close();
        log::info!("shutting down");
        res
    }
}
