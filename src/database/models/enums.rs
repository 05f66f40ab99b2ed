use serde::{Deserialize, Serialize};

/// Mapped to the Postgres `user_role` enum type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Root,
    Admin,
    Supervisor,
    Technician,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Root => "root",
            UserRole::Admin => "admin",
            UserRole::Supervisor => "supervisor",
            UserRole::Technician => "technician",
            UserRole::Viewer => "viewer",
        }
    }

    /// Root is platform staff; admin manages one company
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Root | UserRole::Admin)
    }

    pub fn can_assign_work(&self) -> bool {
        matches!(self, UserRole::Root | UserRole::Admin | UserRole::Supervisor)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(UserRole::Root),
            "admin" => Ok(UserRole::Admin),
            "supervisor" => Ok(UserRole::Supervisor),
            "technician" => Ok(UserRole::Technician),
            "viewer" => Ok(UserRole::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "asset_category", rename_all = "snake_case")]
pub enum AssetCategory {
    Hvac,
    Electrical,
    Plumbing,
    Safety,
    Furniture,
    It,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "asset_status", rename_all = "snake_case")]
pub enum AssetStatus {
    Operational,
    NeedsMaintenance,
    UnderMaintenance,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "report_priority", rename_all = "snake_case")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    InReview,
    Converted,
    Closed,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::InReview => "in_review",
            ReportStatus::Converted => "converted",
            ReportStatus::Closed => "closed",
            ReportStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Converted | ReportStatus::Closed | ReportStatus::Rejected)
    }

    /// Allowed edges of the report lifecycle. Conversion to a work order is
    /// reachable straight from `open` (triage is optional).
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Open, InReview) | (Open, Converted) | (Open, Closed) | (Open, Rejected)
                | (InReview, Converted)
                | (InReview, Closed)
                | (InReview, Rejected)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "work_order_priority", rename_all = "snake_case")]
pub enum WorkOrderPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "work_order_status", rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Pending,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "pending",
            WorkOrderStatus::Assigned => "assigned",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::OnHold => "on_hold",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Cancelled)
    }

    /// Allowed edges of the work-order lifecycle. Cancellation is reachable
    /// from any non-terminal state.
    pub fn can_transition_to(&self, next: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Cancelled) => true,
            (Pending, Assigned) => true,
            (Assigned, InProgress) => true,
            (InProgress, OnHold) => true,
            (OnHold, InProgress) => true,
            (InProgress, Completed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
pub enum NotificationKind {
    WorkOrderAssigned,
    WorkOrderCompleted,
    ReportSubmitted,
    ReportStatusChanged,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    LoginFailed,
    Create,
    Update,
    SoftDelete,
    Restore,
    StatusChange,
    CheckIn,
    CheckOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_order_happy_path() {
        use WorkOrderStatus::*;
        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(OnHold));
        assert!(OnHold.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn work_order_terminal_states_are_final() {
        use WorkOrderStatus::*;
        for next in [Pending, Assigned, InProgress, OnHold, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn work_order_cannot_skip_states() {
        use WorkOrderStatus::*;
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Completed));
        assert!(!OnHold.can_transition_to(Completed));
    }

    #[test]
    fn cancel_from_any_open_state() {
        use WorkOrderStatus::*;
        for state in [Pending, Assigned, InProgress, OnHold] {
            assert!(state.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn report_lifecycle() {
        use ReportStatus::*;
        assert!(Open.can_transition_to(InReview));
        assert!(Open.can_transition_to(Converted));
        assert!(InReview.can_transition_to(Converted));
        assert!(!Converted.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Open));
        assert!(!InReview.can_transition_to(Open));
    }

    #[test]
    fn priority_ordering() {
        assert!(ReportPriority::Critical > ReportPriority::Low);
        assert!(WorkOrderPriority::High > WorkOrderPriority::Medium);
    }

    #[test]
    fn role_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&UserRole::Supervisor).unwrap(), "\"supervisor\"");
        let parsed: WorkOrderStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, WorkOrderStatus::InProgress);
    }
}
