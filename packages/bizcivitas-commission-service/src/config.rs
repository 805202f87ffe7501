//! Service configuration.

use bizcivitas_commission::{DistributionPolicy, MembershipPlan};
use serde::Deserialize;
use std::path::Path;

use crate::Error;

/// Environment variables override file values: `COMMISSION_BIND_ADDRESS`,
/// `COMMISSION_POLICY_REFRESH_SECS`, ... Nested keys are joined with `__`.
const ENV_PREFIX: &str = "COMMISSION";

/// Configuration for the commission service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Backend endpoint listing distribution policies. `None` serves only
    /// the seeded `policies`.
    #[serde(default = "defaults::policy_source_url")]
    pub policy_source_url: Option<String>,

    /// Bearer token for the backend.
    #[serde(default = "defaults::policy_source_token")]
    pub policy_source_token: Option<String>,

    #[serde(default = "defaults::policy_refresh_secs")]
    pub policy_refresh_secs: u64,

    #[serde(default = "defaults::policy_fetch_timeout_ms")]
    pub policy_fetch_timeout_ms: u64,

    /// Served until the first successful fetch.
    #[serde(default)]
    pub policies: Vec<DistributionPolicy>,

    #[serde(default = "defaults::plans")]
    pub plans: Vec<MembershipPlan>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            policy_source_url: defaults::policy_source_url(),
            policy_source_token: defaults::policy_source_token(),
            policy_refresh_secs: defaults::policy_refresh_secs(),
            policy_fetch_timeout_ms: defaults::policy_fetch_timeout_ms(),
            policies: Vec::new(),
            plans: defaults::plans(),
        }
    }
}

impl Config {
    /// Load `commission.{toml,json,yaml}` from the working directory, then
    /// apply environment overrides.
    ///
    /// A missing file leaves every field at its default. A file or variable
    /// that fails to parse is an error.
    pub fn load() -> Result<Self, Error> {
        Self::from_sources(
            config::File::with_name("commission").required(false),
            environment(),
        )
    }

    /// Like [`Config::load`], reading the given file instead.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        Self::from_sources(config::File::from(path).required(false), environment())
    }

    fn from_sources<S>(file: S, env: config::Environment) -> Result<Self, Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

mod defaults {
    use bizcivitas_commission::MembershipPlan;

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn policy_source_url() -> Option<String> {
        // Priority: COMMISSION_POLICY_SOURCE_URL (via config) > BIZCIVITAS_API_URL
        non_empty_env("BIZCIVITAS_API_URL")
            .map(|base| format!("{}/commission-distribution", base.trim_end_matches('/')))
    }

    pub fn policy_source_token() -> Option<String> {
        non_empty_env("BIZCIVITAS_API_TOKEN")
    }

    pub fn policy_refresh_secs() -> u64 {
        300
    }

    pub fn policy_fetch_timeout_ms() -> u64 {
        5_000
    }

    pub fn plans() -> Vec<MembershipPlan> {
        MembershipPlan::known_plans()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizcivitas_commission::PlanKind;

    const EXAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/commission.example.toml");

    fn env_vars(pairs: &[(&str, &str)]) -> config::Environment {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    fn from_toml(toml: &str) -> Result<Config, Error> {
        Config::from_sources(
            config::File::from_str(toml, config::FileFormat::Toml),
            env_vars(&[]),
        )
    }

    #[test]
    fn test_load_example_file() {
        let config = Config::load_from(Path::new(EXAMPLE)).unwrap();

        assert_eq!(config.policy_refresh_secs, 300);
        assert_eq!(config.policies.len(), 1);
        let policy = &config.policies[0];
        assert_eq!(policy.membership_plan_id, "Flagship Membership");
        assert!(policy.is_active);
        assert_eq!(policy.total_pool_percentage, 27.0);
        assert_eq!(policy.shares.master_franchise, 12.0);
        assert_eq!(policy.shares.final_recipient, 10.0);

        assert_eq!(config.plans.len(), 4);
        let flagship = MembershipPlan::find(&config.plans, "Flagship Membership").unwrap();
        assert_eq!(flagship.component("Annual Fee").unwrap().base_amount, 300_000.0);
        let digital = MembershipPlan::find(&config.plans, "Digital Membership").unwrap();
        assert_eq!(digital.kind, PlanKind::Digital);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::from_sources(
            config::File::from(Path::new("/nonexistent/commission.toml")).required(false),
            env_vars(&[]),
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3050");
        assert_eq!(config.policy_refresh_secs, 300);
        assert!(config.policies.is_empty());
        assert_eq!(config.plans, MembershipPlan::known_plans());
    }

    #[test]
    fn test_env_overrides_file() {
        let env = env_vars(&[
            ("COMMISSION_BIND_ADDRESS", "127.0.0.1:4000"),
            ("COMMISSION_POLICY_FETCH_TIMEOUT_MS", "1234"),
            ("OTHER_POLICY_REFRESH_SECS", "1"),
        ]);
        let config =
            Config::from_sources(config::File::from(Path::new(EXAMPLE)), env).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:4000");
        assert_eq!(config.policy_fetch_timeout_ms, 1234);
        // unprefixed variables are ignored
        assert_eq!(config.policy_refresh_secs, 300);
        // file values without an override survive
        assert_eq!(config.policies.len(), 1);
    }

    #[test]
    fn test_malformed_policy_rejected() {
        let err = from_toml(
            r#"
            [[policies]]
            total_pool_percentage = 27
            is_active = true
            shares = { platform = 12, master_franchise = 12, area_franchise = 5, final_recipient = 10 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("membershipPlanId")));
    }

    #[test]
    fn test_malformed_scalar_rejected() {
        let err = from_toml(r#"policy_refresh_secs = "soon""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let env = env_vars(&[("COMMISSION_POLICY_REFRESH_SECS", "soon")]);
        let result = Config::from_sources(config::File::from(Path::new(EXAMPLE)), env);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
