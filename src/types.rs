/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors raised while parsing the small enums and identifiers below
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("'{0}' is not a valid id, it must be a 12-byte, 24 hex character string")]
    ObjectIdInvalid(String),
    #[error("Unknown dashboard type: {0}")]
    UnknownDashboard(String),
    #[error("Unknown screen type: {0}")]
    UnknownScreen(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// 12-byte document identifier, rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(bson::oid::ObjectId);

impl ObjectId {
    pub fn new() -> Self {
        Self(bson::oid::ObjectId::new())
    }

    pub fn parse(input: &str) -> Result<Self, TypeError> {
        bson::oid::ObjectId::parse_str(input)
            .map(Self)
            .map_err(|_| TypeError::ObjectIdInvalid(input.to_string()))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Which front-end a menu tree is built for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardType {
    #[default]
    AdminDashboard,
    StudentDashboard,
}

impl DashboardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardType::AdminDashboard => "admin_dashboard",
            DashboardType::StudentDashboard => "student_dashboard",
        }
    }
}

impl fmt::Display for DashboardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin_dashboard" => Ok(DashboardType::AdminDashboard),
            "student_dashboard" => Ok(DashboardType::StudentDashboard),
            other => Err(TypeError::UnknownDashboard(other.to_string())),
        }
    }
}

/// Owner population of a stored screen tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenType {
    MasterScreen,
    CollegeScreen,
    ClientScreen,
}

impl ScreenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenType::MasterScreen => "master_screen",
            ScreenType::CollegeScreen => "college_screen",
            ScreenType::ClientScreen => "client_screen",
        }
    }
}

impl fmt::Display for ScreenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master_screen" => Ok(ScreenType::MasterScreen),
            "college_screen" => Ok(ScreenType::CollegeScreen),
            "client_screen" => Ok(ScreenType::ClientScreen),
            other => Err(TypeError::UnknownScreen(other.to_string())),
        }
    }
}

/// Capability checked against a feature's permission flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl FromStr for Action {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            "delete" => Ok(Action::Delete),
            other => Err(TypeError::UnknownAction(other.to_string())),
        }
    }
}
