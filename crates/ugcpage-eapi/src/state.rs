//! Run selection types: which collection, which environment, how many pages

/// Production host of the Enterprise API
pub const DEFAULT_DOMAIN: &str = "enterprise-api.powerreviews.com";

/// Page budget for an unbounded run (2^18 pages)
pub const UNBOUNDED_MAX_PAGES: u64 = 1 << 18;

/// Collections that can be paged
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endpoint {
    #[default]
    Reviews,
    Questions,
}

impl Endpoint {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "reviews" => Some(Self::Reviews),
            "questions" => Some(Self::Questions),
            _ => None,
        }
    }

    /// Path segment under `/v1/`, also the JSON key holding the items
    pub fn name(self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Questions => "questions",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Deployment environment; non-prod hosts carry an `{env}-` prefix
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Dev,
    Qa,
    Prod,
}

impl Environment {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "dev" => Some(Self::Dev),
            "qa" => Some(Self::Qa),
            "prod" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Prod => "prod",
        }
    }

    /// Host for this environment, e.g. `qa-enterprise-api.powerreviews.com`
    pub fn host(self, domain: &str) -> String {
        match self {
            Self::Prod => domain.to_string(),
            Self::Dev | Self::Qa => format!("{}-{domain}", self.name()),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Upper bound on pages consumed in one run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageBudget {
    Bounded(u64),
    Unbounded,
}

impl Default for PageBudget {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl PageBudget {
    /// Budget from a raw `--max_pages` value; anything that is not a
    /// positive integer falls back to a single page.
    pub fn from_arg(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 1 => Self::Bounded(n as u64),
            _ => Self::Bounded(1),
        }
    }

    pub fn max_pages(self) -> u64 {
        match self {
            Self::Bounded(n) => n.max(1),
            Self::Unbounded => UNBOUNDED_MAX_PAGES,
        }
    }
}
