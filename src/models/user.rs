use serde::{Deserialize, Serialize};

/// A user record as returned by the user service.
/// Records are never edited after retrieval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// National identifier
    pub ssn: String,
    pub email: String,
    pub age: u32,
    /// Free-form, compared case-sensitively
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl User {
    /// `"{first} {last}"`, the key used for name ordering
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::User;

    pub fn user(id: u64, first: &str, last: &str, age: u32, role: &str) -> User {
        User {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            ssn: format!("000-00-{:04}", id),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            age,
            role: role.to_string(),
            phone: None,
            username: None,
            birth_date: None,
            gender: None,
        }
    }
}
