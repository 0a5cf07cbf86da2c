use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Hosting providers a repository can be indexed from.
///
/// GitLab and Bitbucket are valid filter values, but contribution and
/// refresh reject them until a client for them exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
}
