use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::user::User;

/// Keyword that selects every role
pub const ALL_ROLES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortSpec {
    #[default]
    None,
    AgeAsc,
    AgeDesc,
    NameAsc,
    NameDesc,
}

impl SortSpec {
    pub const ALL: [SortSpec; 5] = [
        SortSpec::None,
        SortSpec::AgeAsc,
        SortSpec::AgeDesc,
        SortSpec::NameAsc,
        SortSpec::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortSpec::None => "none",
            SortSpec::AgeAsc => "age-asc",
            SortSpec::AgeDesc => "age-desc",
            SortSpec::NameAsc => "name-asc",
            SortSpec::NameDesc => "name-desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortSpec::None => "None",
            SortSpec::AgeAsc => "Age (Low to High)",
            SortSpec::AgeDesc => "Age (High to Low)",
            SortSpec::NameAsc => "Name (A to Z)",
            SortSpec::NameDesc => "Name (Z to A)",
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown sort option '{0}'. Must be one of: none, age-asc, age-desc, name-asc, name-desc")]
pub struct UnknownSortSpec(pub String);

impl FromStr for SortSpec {
    type Err = UnknownSortSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortSpec::ALL
            .into_iter()
            .find(|spec| spec.as_str() == s)
            .ok_or_else(|| UnknownSortSpec(s.to_string()))
    }
}

/// Role equality filter. `Role` compares exactly, including case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Role(String),
}

impl RoleFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Role(role) => user.role == *role,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RoleFilter::All)
    }
}

impl From<&str> for RoleFilter {
    fn from(value: &str) -> Self {
        if value == ALL_ROLES {
            RoleFilter::All
        } else {
            RoleFilter::Role(value.to_string())
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleFilter::All => f.write_str(ALL_ROLES),
            RoleFilter::Role(role) => f.write_str(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::fixtures::user;

    #[test]
    fn test_sort_spec_parse() {
        for spec in SortSpec::ALL {
            assert_eq!(spec.as_str().parse::<SortSpec>(), Ok(spec));
        }
        assert!("age".parse::<SortSpec>().is_err());
        assert!("AGE-ASC".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_sort_spec_serde_matches_display() {
        let json = serde_json::to_string(&SortSpec::NameDesc).unwrap();
        assert_eq!(json, "\"name-desc\"");
    }

    #[test]
    fn test_role_filter_is_case_sensitive() {
        let admin = user(1, "John", "Doe", 30, "admin");
        let filter = RoleFilter::from("Admin");

        assert!(!filter.matches(&admin));
        assert!(RoleFilter::from("admin").matches(&admin));
        assert!(RoleFilter::from(ALL_ROLES).matches(&admin));
    }
}
