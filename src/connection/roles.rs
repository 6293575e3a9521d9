//! The two known service roles.

use serde::{Deserialize, Serialize};

/// Well-known remote services and their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    /// Simulation service.
    Simulation,
    /// Data-management (database manager) service.
    DataManagement,
}

impl ServiceRole {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceRole::Simulation => 50051,
            ServiceRole::DataManagement => 50052,
        }
    }

    /// Connection name used by the facade and in logs.
    pub fn service_name(self) -> &'static str {
        match self {
            ServiceRole::Simulation => "simulation_service",
            ServiceRole::DataManagement => "database_service",
        }
    }
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service_name())
    }
}
