//! Runtime configuration for a paging run

use ugcpage_core::{HttpConfig, PagingError, RetryPolicy};

use crate::state::{DEFAULT_DOMAIN, Endpoint, Environment, PageBudget};

/// Query parameters sent with every collection request
pub const BASE_PARAMS: [(&str, &str); 3] = [
    ("include_media", "true"),
    ("include_syndication", "true"),
    ("include_merchant_responses", "true"),
];

/// Parameters owned by the paging loop; callers may not set them
const RESERVED_PARAMS: [&str; 2] = ["limit", "next_page"];

/// OAuth2 client credentials. `Debug` masks the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PagingError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(PagingError::Config(
                "Set the client id and secret.".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Raw run arguments as collected from CLI flags and config files
/// (plain struct, no clap derive). Unknown names fall back to defaults.
#[derive(Default)]
pub struct RunArgs {
    pub client_id: String,
    pub client_secret: String,
    pub endpoint: Option<String>,
    pub env: Option<String>,
    pub max_pages: Option<String>,
    pub unbounded: bool,
    pub retry_policy: Option<String>,
    pub domain: Option<String>,
    pub params: Vec<(String, String)>,
    pub http: HttpConfig,
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoint: Endpoint,
    pub env: Environment,
    pub domain: String,
    pub budget: PageBudget,
    pub retry_policy: RetryPolicy,
    /// Base parameters followed by caller-supplied filters
    pub params: Vec<(String, String)>,
    pub http: HttpConfig,
}

impl Config {
    /// Host for the selected environment
    pub fn host(&self) -> String {
        self.env.host(&self.domain)
    }

    pub fn token_url(&self) -> String {
        format!("https://{}/oauth2/token", self.host())
    }

    pub fn collection_url(&self) -> String {
        format!("https://{}/v1/{}", self.host(), self.endpoint)
    }
}

impl TryFrom<RunArgs> for Config {
    type Error = PagingError;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        let credentials = Credentials::new(args.client_id, args.client_secret);
        credentials.validate()?;

        let endpoint = args
            .endpoint
            .as_deref()
            .and_then(Endpoint::from_name)
            .unwrap_or_default();
        let env = args
            .env
            .as_deref()
            .and_then(Environment::from_name)
            .unwrap_or_default();
        let budget = if args.unbounded {
            PageBudget::Unbounded
        } else {
            args.max_pages
                .as_deref()
                .map(PageBudget::from_arg)
                .unwrap_or_default()
        };
        let retry_policy = match args.retry_policy.as_deref() {
            None => RetryPolicy::default(),
            Some(name) => RetryPolicy::from_name(name).ok_or_else(|| {
                PagingError::Config(format!(
                    "unknown retry policy '{name}' (expected server-errors or any-non-success)"
                ))
            })?,
        };
        let domain = args
            .domain
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

        Ok(Self {
            credentials,
            endpoint,
            env,
            domain,
            budget,
            retry_policy,
            params: merge_params(args.params)?,
            http: args.http,
        })
    }
}

/// Base parameters with `extra` applied on top; a repeated key replaces the
/// earlier value in place.
fn merge_params(extra: Vec<(String, String)>) -> Result<Vec<(String, String)>, PagingError> {
    let mut params: Vec<(String, String)> = BASE_PARAMS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (key, value) in extra {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            return Err(PagingError::Config(format!(
                "parameter '{key}' is managed by the pager"
            )));
        }
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => params.push((key, value)),
        }
    }
    Ok(params)
}

/// Parse a `key=value` filter argument
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let config = Config::try_from(args()).unwrap();
        assert_eq!(config.endpoint, Endpoint::Reviews);
        assert_eq!(config.env, Environment::Dev);
        assert_eq!(config.budget, PageBudget::Bounded(1));
        assert_eq!(config.retry_policy, RetryPolicy::ServerErrors);
        assert_eq!(
            config.collection_url(),
            "https://dev-enterprise-api.powerreviews.com/v1/reviews"
        );
        assert_eq!(
            config.token_url(),
            "https://dev-enterprise-api.powerreviews.com/oauth2/token"
        );
        assert_eq!(config.params.len(), BASE_PARAMS.len());
    }

    #[test]
    fn invalid_names_fall_back() {
        let config = Config::try_from(RunArgs {
            endpoint: Some("answers".to_string()),
            env: Some("staging".to_string()),
            max_pages: Some("-4".to_string()),
            ..args()
        })
        .unwrap();
        assert_eq!(config.endpoint, Endpoint::Reviews);
        assert_eq!(config.env, Environment::Dev);
        assert_eq!(config.budget, PageBudget::Bounded(1));
    }

    #[test]
    fn zero_max_pages_becomes_one() {
        let config = Config::try_from(RunArgs {
            max_pages: Some("0".to_string()),
            ..args()
        })
        .unwrap();
        assert_eq!(config.budget.max_pages(), 1);
    }

    #[test]
    fn prod_questions_unbounded() {
        let config = Config::try_from(RunArgs {
            endpoint: Some("questions".to_string()),
            env: Some("prod".to_string()),
            max_pages: Some("3".to_string()),
            unbounded: true,
            retry_policy: Some("any-non-success".to_string()),
            ..args()
        })
        .unwrap();
        assert_eq!(
            config.collection_url(),
            "https://enterprise-api.powerreviews.com/v1/questions"
        );
        assert_eq!(config.budget, PageBudget::Unbounded);
        assert_eq!(config.retry_policy, RetryPolicy::AnyNonSuccess);
    }

    #[test]
    fn missing_credentials_rejected() {
        let err = Config::try_from(RunArgs::default()).unwrap_err();
        assert!(matches!(err, PagingError::Config(_)));

        let err = Config::try_from(RunArgs {
            client_secret: String::new(),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, PagingError::Config(_)));
    }

    #[test]
    fn unknown_retry_policy_rejected() {
        let err = Config::try_from(RunArgs {
            retry_policy: Some("forever".to_string()),
            ..args()
        })
        .unwrap_err();
        assert!(format!("{err}").contains("forever"));
    }

    #[test]
    fn extra_params_merge() {
        let config = Config::try_from(RunArgs {
            params: vec![
                ("locale".to_string(), "en_US".to_string()),
                ("include_syndication".to_string(), "false".to_string()),
            ],
            ..args()
        })
        .unwrap();
        assert_eq!(
            config.params,
            vec![
                ("include_media".to_string(), "true".to_string()),
                ("include_syndication".to_string(), "false".to_string()),
                ("include_merchant_responses".to_string(), "true".to_string()),
                ("locale".to_string(), "en_US".to_string()),
            ]
        );
    }

    #[test]
    fn reserved_params_rejected() {
        let err = Config::try_from(RunArgs {
            params: vec![("limit".to_string(), "10".to_string())],
            ..args()
        })
        .unwrap_err();
        assert!(format!("{err}").contains("limit"));
    }

    #[test]
    fn parse_param_forms() {
        assert_eq!(
            parse_param("merchant_id=883243"),
            Ok(("merchant_id".to_string(), "883243".to_string()))
        );
        assert_eq!(
            parse_param("user_id="),
            Ok(("user_id".to_string(), String::new()))
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn credentials_debug_masks_secret() {
        let dbg = format!("{:?}", Credentials::new("cid", "hunter2"));
        assert!(dbg.contains("cid"));
        assert!(!dbg.contains("hunter2"));
    }
}
