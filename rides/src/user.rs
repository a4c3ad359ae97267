//! Users and roles

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Invalid user id format")]
    InvalidUserId,
    #[error("Unknown role {0}")]
    UnknownRole(String),
}

/// Newtype for user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().parse().map_err(|_| Error::InvalidUserId)?;
        Ok(Self(id))
    }
}

/// Which side of a trip the user is on
///
/// Decides which screens and actions are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "motorista")]
    Driver,
    #[serde(rename = "passageiro")]
    Passenger,
}

impl Role {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "motorista",
            Self::Passenger => "passageiro",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "motorista" | "driver" => Ok(Self::Driver),
            "passageiro" | "passenger" => Ok(Self::Passenger),
            _ => Err(Error::UnknownRole(s.to_owned())),
        }
    }
}

/// User as listed by the API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "tipo", default)]
    pub role: Option<Role>,
}

impl User {
    /// Finds the user registered with the given email
    pub fn find_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
        users
            .iter()
            .find(|user| user.email.as_deref() == Some(email))
    }

    /// Users listed without a role are taken as having any
    pub fn has_role(&self, role: Role) -> bool {
        self.role.is_none_or(|own| own == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        let role: Role = serde_json::from_str(r#""motorista""#).unwrap();
        assert_eq!(role, Role::Driver);
        let role: Role = serde_json::from_str(r#""passageiro""#).unwrap();
        assert_eq!(role, Role::Passenger);

        serde_json::from_str::<Role>(r#""admin""#).unwrap_err();
    }

    #[test]
    fn role_from_cli_names() {
        assert_eq!("driver".parse::<Role>().unwrap(), Role::Driver);
        assert_eq!("Passageiro".parse::<Role>().unwrap(), Role::Passenger);
        assert_eq!(
            "pilot".parse::<Role>().unwrap_err(),
            Error::UnknownRole("pilot".to_owned())
        );
    }

    #[test]
    fn find_user_by_email() {
        let users: Vec<User> = serde_json::from_str(
            r#"[
                {"id": 1, "nome": "Ana", "email": "ana@example.com", "tipo": "motorista"},
                {"id": 2, "nome": "Bruno", "email": "bruno@example.com", "tipo": "motorista"},
                {"id": 3, "nome": "Sem email"}
            ]"#,
        )
        .unwrap();

        let user = User::find_by_email(&users, "bruno@example.com").unwrap();
        assert_eq!(user.id, UserId::new(2));
        assert_eq!(user.name, "Bruno");

        assert!(User::find_by_email(&users, "carla@example.com").is_none());
    }

    #[test]
    fn listed_role_is_checked() {
        let users: Vec<User> = serde_json::from_str(
            r#"[
                {"id": 1, "nome": "Ana", "tipo": "motorista"},
                {"id": 2, "nome": "Sem tipo"}
            ]"#,
        )
        .unwrap();

        assert!(users[0].has_role(Role::Driver));
        assert!(!users[0].has_role(Role::Passenger));
        assert!(users[1].has_role(Role::Driver));
        assert!(users[1].has_role(Role::Passenger));
    }
}
