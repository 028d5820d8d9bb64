use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Front-end destinations the workflow navigates between.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Route {
    Landing,
    Config,
    Candidate,
    Result,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Config => "/config",
            Self::Candidate => "/candidate",
            Self::Result => "/result",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Route::from_str("Candidate").unwrap(), Route::Candidate);
        assert_eq!(Route::from_str("result").unwrap(), Route::Result);
        assert!(Route::from_str("nowhere").is_err());
    }

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<_> = Route::iter().map(Route::path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
    }
}
