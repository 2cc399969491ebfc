use serde::{Deserialize, Serialize};

/// Role of the person invoking an operation.
///
/// The core records roles onto the audit trail; it never enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Enters demand and builds production plans.
    ProductionPlanner,

    /// Reviews submitted plans.
    ProductionManager,

    /// Gives final approval and schedules capacity.
    OperationsHead,

    /// Reports production against the schedule.
    ShopFloor,
}

impl Role {
    /// Returns the role name as used on the audit trail.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ProductionPlanner => "production-planner",
            Role::ProductionManager => "production-manager",
            Role::OperationsHead => "operations-head",
            Role::ShopFloor => "shop-floor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller identity supplied by the session layer on every mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn planner(name: impl Into<String>) -> Self {
        Self::new(name, Role::ProductionPlanner)
    }

    pub fn manager(name: impl Into<String>) -> Self {
        Self::new(name, Role::ProductionManager)
    }

    pub fn operations_head(name: impl Into<String>) -> Self {
        Self::new(name, Role::OperationsHead)
    }

    pub fn shop_floor(name: impl Into<String>) -> Self {
        Self::new(name, Role::ShopFloor)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}
