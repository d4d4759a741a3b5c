use crate::cmd::{Cmd, RsaCbcConfig};
use crate::session::wire::EncryptedRequest;
use cipher::cipher_mode::{decrypt_message, encrypt_message};
use cipher::DefaultRand;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// In-process run of the whole exchange, both parties live in this process.
pub struct DemoCmd;

impl Cmd for DemoCmd {
    const NAME: &'static str = "demo";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("simulate the key exchange and one encrypted message in process")
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
                Arg::new("msg")
                    .long("message")
                    .short('m')
                    .action(ArgAction::Set)
                    .default_value("Hello World!")
                    .value_parser(value_parser!(String))
                    .help("to specify the message to encrypt"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("print the generated key pair as json"),
            )
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let cfg = RsaCbcConfig::config();
        let (bits, msg) = (
            m.get_one::<usize>("bits").copied().unwrap_or(cfg.bits),
            m.get_one::<String>("msg").map(String::as_str).unwrap_or_default(),
        );

        let mut rng = DefaultRand::default();
        let key = cfg
            .key_generator(bits, cfg.prime_test_rounds)
            .generate(&mut rng)?;
        let pk = key.public_key();
        if m.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&key)?);
        }
        println!("Server Public Key: (e = {}, n = {})", pk.exponent(), pk.modules());
        println!(
            "Server Private Key: (d = {}, n = {})",
            key.private_exponent(),
            pk.modules()
        );

        let nonce = pk.random_nonce(&mut rng)?;
        let request = EncryptedRequest {
            nonce: pk.encrypt(&nonce),
            blocks: encrypt_message(msg.as_bytes(), pk, &nonce),
        };
        println!("Client: Encrypted Nonce: {}", request.nonce);

        let iv = key.decrypt(&request.nonce);
        println!("Server: Decrypted Nonce (IV): {iv}");

        let blocks = request
            .blocks
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("Client: Encrypted Message: {blocks}");

        let plaintext = decrypt_message(request.blocks.as_slice(), &key, &iv);
        let plaintext = String::from_utf8_lossy(plaintext.as_slice());
        println!("Server: Decrypted Message: {plaintext}");

        anyhow::ensure!(
            iv == nonce && plaintext == msg,
            "decrypted message does not match the original message"
        );
        Ok(())
    }
}
