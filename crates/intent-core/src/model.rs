//! Wire-level building blocks shared by every controller

use serde::{Deserialize, Serialize};

/// Metadata block carried by every intent resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, rename = "userData1", skip_serializing_if = "String::is_empty")]
    pub user_data1: String,
    #[serde(default, rename = "userData2", skip_serializing_if = "String::is_empty")]
    pub user_data2: String,
}
