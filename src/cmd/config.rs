use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use cipher::rsa::{KeyGenerator, DEFAULT_TEST_ROUNDS};
use config::Config;
use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_MAX_PAYLOAD;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RsaCbcConfig {
    // RSA modulus bits length, 512 is only good for demonstration
    pub bits: usize,

    pub prime_test_rounds: usize,

    // server listen address, the IPv6 wildcard by default
    pub bind_host: String,

    // address the client connects to
    pub host: String,

    pub port: u16,

    // byte size of one logical message
    pub max_payload: usize,

    // 0 means unbounded
    pub keygen_max_candidates: usize,

    // milliseconds, 0 means no deadline
    pub keygen_timeout_ms: u64,
}

impl Default for RsaCbcConfig {
    fn default() -> Self {
        Self {
            bits: 512,
            prime_test_rounds: DEFAULT_TEST_ROUNDS,
            bind_host: "::".to_string(),
            host: "::1".to_string(),
            port: 1234,
            max_payload: DEFAULT_MAX_PAYLOAD,
            keygen_max_candidates: 0,
            keygen_timeout_ms: 0,
        }
    }
}

static CONFIG: OnceLock<RsaCbcConfig> = OnceLock::new();

impl RsaCbcConfig {
    /// defaults -> config file(json/json5) -> environment variables `RSACBC_<FIELD>`
    pub fn load(f: Option<&Path>) -> anyhow::Result<Self> {
        let default_config = Config::try_from(&RsaCbcConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::from(f).required(true));
        }
        config = config.add_source(
            config::Environment::with_prefix("RSACBC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut cfg: RsaCbcConfig = config.build()?.try_deserialize()?;
        cfg.prime_test_rounds = cfg.prime_test_rounds.max(1);
        cfg.max_payload = cfg.max_payload.max(1);

        log::trace!("{:?}", cfg);

        Ok(cfg)
    }

    /// 只在进程启动时调用一次, 之后的调用返回第一次的结果
    pub fn init(f: Option<&Path>) -> anyhow::Result<&'static Self> {
        if let Some(cfg) = CONFIG.get() {
            return Ok(cfg);
        }

        let cfg = Self::load(f)?;
        Ok(CONFIG.get_or_init(|| cfg))
    }

    pub fn config() -> &'static Self {
        CONFIG.get_or_init(|| {
            Self::load(None).unwrap_or_else(|e| {
                log::warn!("load config failed, use the default config: {e}");
                Self::default()
            })
        })
    }

    pub fn key_generator(&self, bits: usize, rounds: usize) -> KeyGenerator {
        let mut keygen = KeyGenerator::new(bits).rounds(rounds);
        if self.keygen_max_candidates > 0 {
            keygen = keygen.max_candidates(self.keygen_max_candidates);
        }
        if self.keygen_timeout_ms > 0 {
            keygen = keygen.timeout(Duration::from_millis(self.keygen_timeout_ms));
        }
        keygen
    }
}

#[cfg(test)]
mod tests {
    use super::RsaCbcConfig;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = RsaCbcConfig::default();
        assert_eq!(cfg.bits, 512);
        assert_eq!(cfg.prime_test_rounds, 10);
        assert_eq!(cfg.port, 1234);
        assert_eq!(cfg.bind_host, "::");
        assert_eq!(cfg.host, "::1");
        assert_eq!(cfg.max_payload, 64 * 1024);
        assert_eq!(cfg.key_generator(512, 10).bits_len(), 512);
    }

    #[test]
    fn from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("rsacbc-config-{}.json", std::process::id()));
        {
            let mut f = std::fs::File::create(&path).unwrap();
            let data = r#"{"bits": 2048, "port": 4321, "prime_test_rounds": 0, "bind_host": "0.0.0.0"}"#;
            f.write_all(data.as_bytes()).unwrap();
        }

        let cfg = RsaCbcConfig::load(Some(path.as_path()));
        std::fs::remove_file(&path).unwrap();
        let cfg = cfg.unwrap();
        assert_eq!(cfg.bits, 2048);
        assert_eq!(cfg.port, 4321);
        assert_eq!(cfg.prime_test_rounds, 1);
        assert_eq!(cfg.bind_host, "0.0.0.0");
        assert_eq!(cfg.host, RsaCbcConfig::default().host);
    }

    #[test]
    fn missing_file() {
        let mut path = std::env::temp_dir();
        path.push("rsacbc-config-not-exist.json");
        assert!(RsaCbcConfig::load(Some(path.as_path())).is_err());
    }
}
