use std::fmt::{self, Display};
use std::str::FromStr;

use super::Provider;

/// Canonical repository identity: the provider-native id plus the
/// provider, rendered as `"{provider_id}|{provider}"`. This rendering is
/// the primary key in the store and the `id` field of every external
/// record.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RepoKey {
    pub provider: Provider,
    pub provider_id: i64,
}

impl RepoKey {
    pub fn new(provider: Provider, provider_id: i64) -> Self {
        Self {
            provider,
            provider_id,
        }
    }
}

impl Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.provider_id, self.provider)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid repository id: {0}")]
pub struct ParseRepoKeyError(String);

impl FromStr for RepoKey {
    type Err = ParseRepoKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, provider) = s
            .split_once('|')
            .ok_or_else(|| ParseRepoKeyError(s.to_owned()))?;

        let provider_id = id
            .parse::<i64>()
            .map_err(|_| ParseRepoKeyError(s.to_owned()))?;
        let provider = provider
            .parse::<Provider>()
            .map_err(|_| ParseRepoKeyError(s.to_owned()))?;

        Ok(Self::new(provider, provider_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_parse() {
        let key = RepoKey::new(Provider::Github, 10270250);
        assert_eq!(key.to_string(), "10270250|github");
        assert_eq!("10270250|github".parse::<RepoKey>().unwrap(), key);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("10270250".parse::<RepoKey>().is_err());
        assert!("abc|github".parse::<RepoKey>().is_err());
        assert!("1|sourcehut".parse::<RepoKey>().is_err());
    }
}
