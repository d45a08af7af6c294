use crate::datasource::RecordErrorPolicy;
use crate::domain::parse_address;
use crate::replay::ReplayParams;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub txs_path: PathBuf,
    pub logs_path: PathBuf,
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub airdrop_path: Option<PathBuf>,
    pub record_error_policy: RecordErrorPolicy,
    pub params: ReplayParams,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let txs_path = required_path(&env_map, "TXS_PATH")?;
        let logs_path = required_path(&env_map, "LOGS_PATH")?;

        let output_path = env_map
            .get("OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("rewards.csv"));

        let summary_path = env_map
            .get("SUMMARY_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let airdrop_path = env_map
            .get("AIRDROP_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let record_error_policy = match env_map
            .get("RECORD_ERROR_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("abort")
        {
            "abort" => RecordErrorPolicy::Abort,
            "skip" => RecordErrorPolicy::Skip,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RECORD_ERROR_POLICY".to_string(),
                    format!("must be abort or skip, got {}", other),
                ))
            }
        };

        let defaults = ReplayParams::default();

        let token_contract = match env_map.get("TOKEN_CONTRACT") {
            Some(s) => parse_address(s).map_err(|_| {
                ConfigError::InvalidValue(
                    "TOKEN_CONTRACT".to_string(),
                    "must be a 20-byte hex address".to_string(),
                )
            })?,
            None => defaults.token_contract,
        };

        let activation_block = parse_or(
            &env_map,
            "ACTIVATION_BLOCK",
            defaults.activation_block,
            "must be a valid u64",
        )?;

        let epoch_length = parse_or(
            &env_map,
            "EPOCH_LENGTH",
            defaults.epoch_length,
            "must be a valid u64",
        )?;
        if epoch_length == 0 {
            return Err(ConfigError::InvalidValue(
                "EPOCH_LENGTH".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let reward_pool: f64 = parse_or(
            &env_map,
            "REWARD_POOL",
            defaults.reward_pool,
            "must be a number",
        )?;
        if !reward_pool.is_finite() || reward_pool < 0.0 {
            return Err(ConfigError::InvalidValue(
                "REWARD_POOL".to_string(),
                "must be a finite non-negative number".to_string(),
            ));
        }

        let replay_pre_activation_logs = match env_map
            .get("REPLAY_PRE_ACTIVATION_LOGS")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "REPLAY_PRE_ACTIVATION_LOGS".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            txs_path,
            logs_path,
            output_path,
            summary_path,
            airdrop_path,
            record_error_policy,
            params: ReplayParams {
                token_contract,
                activation_block,
                epoch_length,
                reward_pool,
                replay_pre_activation_logs,
                on_decode_error: record_error_policy,
                ..defaults
            },
        })
    }
}

fn required_path(env_map: &HashMap<String, String>, key: &str) -> Result<PathBuf, ConfigError> {
    env_map
        .get(key)
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    expectation: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), expectation.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{ACTIVATION_BLOCK, GAS_TOKEN};

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("TXS_PATH".to_string(), "/data/txs".to_string());
        map.insert("LOGS_PATH".to_string(), "/data/logs".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.txs_path, PathBuf::from("/data/txs"));
        assert_eq!(config.output_path, PathBuf::from("rewards.csv"));
        assert_eq!(config.summary_path, None);
        assert_eq!(config.airdrop_path, None);
        assert_eq!(config.record_error_policy, RecordErrorPolicy::Abort);
        assert_eq!(config.params.token_contract, GAS_TOKEN);
        assert_eq!(config.params.activation_block, ACTIVATION_BLOCK);
        assert_eq!(config.params.epoch_length, 5760);
        assert_eq!(config.params.reward_pool, 500_000_000.0);
        assert!(!config.params.replay_pre_activation_logs);
    }

    #[test]
    fn test_missing_txs_path() {
        let mut env_map = setup_required_env();
        env_map.remove("TXS_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "TXS_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_logs_path() {
        let mut env_map = setup_required_env();
        env_map.remove("LOGS_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "LOGS_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_skip_policy_applies_to_replay() {
        let mut env_map = setup_required_env();
        env_map.insert("RECORD_ERROR_POLICY".to_string(), "skip".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.record_error_policy, RecordErrorPolicy::Skip);
        assert_eq!(config.params.on_decode_error, RecordErrorPolicy::Skip);
    }

    #[test]
    fn test_invalid_record_error_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("RECORD_ERROR_POLICY".to_string(), "coerce".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "RECORD_ERROR_POLICY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_overrides() {
        let mut env_map = setup_required_env();
        env_map.insert(
            "TOKEN_CONTRACT".to_string(),
            "0x1111111111111111111111111111111111111111".to_string(),
        );
        env_map.insert("ACTIVATION_BLOCK".to_string(), "100".to_string());
        env_map.insert("EPOCH_LENGTH".to_string(), "10".to_string());
        env_map.insert("REWARD_POOL".to_string(), "1000".to_string());
        env_map.insert("REPLAY_PRE_ACTIVATION_LOGS".to_string(), "true".to_string());
        env_map.insert("SUMMARY_PATH".to_string(), "summary.json".to_string());
        env_map.insert("AIRDROP_PATH".to_string(), "claims.csv".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.params.token_contract,
            parse_address("0x1111111111111111111111111111111111111111").unwrap()
        );
        assert_eq!(config.params.activation_block, 100);
        assert_eq!(config.params.epoch_length, 10);
        assert_eq!(config.params.reward_pool, 1000.0);
        assert!(config.params.replay_pre_activation_logs);
        assert_eq!(config.summary_path, Some(PathBuf::from("summary.json")));
        assert_eq!(config.airdrop_path, Some(PathBuf::from("claims.csv")));
    }

    #[test]
    fn test_invalid_activation_block() {
        let mut env_map = setup_required_env();
        env_map.insert("ACTIVATION_BLOCK".to_string(), "soon".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ACTIVATION_BLOCK"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_epoch_length_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("EPOCH_LENGTH".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "EPOCH_LENGTH"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_token_contract() {
        let mut env_map = setup_required_env();
        env_map.insert("TOKEN_CONTRACT".to_string(), "0x12".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TOKEN_CONTRACT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
