use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Primary labels form a closed taxonomy (seeded by migration) and every
/// repository carries exactly one. Regular labels are community-suggested
/// tags attached via the `repo_labels` join.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LabelKind {
    Primary,
    Regular,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub name: String,
    pub display_name: String,
    pub kind: LabelKind,
    pub suggested_by: Option<i32>,
}

/// Derive the safe identifier used as a label or language primary key:
/// lowercase, with every run of non-alphanumeric characters collapsed to
/// a single `-` and no leading/trailing `-`.
pub fn safe_name(display: &str) -> String {
    let mut out = String::with_capacity(display.len());
    let mut pending_dash = false;

    for c in display.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_lowercases_and_dashes() {
        assert_eq!(safe_name("Looking for Maintainers"), "looking-for-maintainers");
        assert_eq!(safe_name("C++"), "c");
        assert_eq!(safe_name("Jupyter Notebook"), "jupyter-notebook");
    }

    #[test]
    fn safe_name_collapses_symbol_runs() {
        assert_eq!(safe_name("  weird -- name!  "), "weird-name");
        assert_eq!(safe_name("a/b\\c"), "a-b-c");
    }

    #[test]
    fn safe_name_keeps_digits() {
        assert_eq!(safe_name("Web3 Tools"), "web3-tools");
    }

    #[test]
    fn label_kind_parses_case_insensitively() {
        assert_eq!("primary".parse::<LabelKind>().unwrap(), LabelKind::Primary);
        assert_eq!("Regular".parse::<LabelKind>().unwrap(), LabelKind::Regular);
    }
}
