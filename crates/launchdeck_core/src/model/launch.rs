//! Launch entity as served by the launches endpoint.
//!
//! # Invariants
//! - `id` is the server-assigned identifier and is never reused.

use crate::model::entity::Entity;
use serde::{Deserialize, Serialize};

/// Server-assigned launch identifier.
pub type LaunchId = String;

/// One launch record from the remote launch feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    pub id: LaunchId,
    pub flight_number: u32,
    pub name: String,
    /// ISO-8601 UTC timestamp as delivered by the server.
    pub date_utc: String,
    /// `None` for upcoming launches.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub details: Option<String>,
}

impl Entity for Launch {
    type Id = LaunchId;
    const RESOURCE: &'static str = "launches";

    fn id(&self) -> &LaunchId {
        &self.id
    }
}
