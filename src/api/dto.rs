//! Wire-format records, distinct from the persistent entities. Response
//! types carry hand-written `From<Entity>` mappers so persistence details
//! (password hashes, tenant ids) never leak onto the wire by accident.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{
    Asset, AssetCategory, AssetStatus, Attendance, Company, Notification, NotificationKind, Report,
    ReportPriority, ReportStatus, School, User, UserRole, WorkOrder, WorkOrderPriority, WorkOrderStatus,
};

// ---------------------------------------------------------------------------
// Auth

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Company slug the account belongs to
    pub company: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Users

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Companies (root surface)

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub slug: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            slug: company.slug,
            contact_email: company.contact_email,
            contact_phone: company.contact_phone,
            is_active: company.is_active,
            created_at: company.created_at,
            deleted_at: company.deleted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Schools

#[derive(Debug, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub name_ar: Option<String>,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchoolResponse {
    pub id: Uuid,
    pub name: String,
    pub name_ar: Option<String>,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<School> for SchoolResponse {
    fn from(school: School) -> Self {
        Self {
            id: school.id,
            name: school.name,
            name_ar: school.name_ar,
            code: school.code,
            address: school.address,
            city: school.city,
            region: school.region,
            contact_phone: school.contact_phone,
            created_at: school.created_at,
            updated_at: school.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Assets

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub school_id: Uuid,
    pub name: String,
    pub asset_tag: String,
    pub category: AssetCategory,
    pub status: Option<AssetStatus>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_cost: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_until: Option<NaiveDate>,
    pub location_note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub status: Option<AssetStatus>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_cost: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_until: Option<NaiveDate>,
    pub location_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub asset_tag: String,
    pub category: AssetCategory,
    pub status: AssetStatus,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_cost: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_until: Option<NaiveDate>,
    pub location_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            school_id: asset.school_id,
            name: asset.name,
            asset_tag: asset.asset_tag,
            category: asset.category,
            status: asset.status,
            manufacturer: asset.manufacturer,
            model: asset.model,
            serial_number: asset.serial_number,
            purchase_cost: asset.purchase_cost,
            purchase_date: asset.purchase_date,
            warranty_until: asset.warranty_until,
            location_note: asset.location_note,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub school_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: ReportPriority,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<ReportPriority>,
}

#[derive(Debug, Deserialize)]
pub struct ReportStatusRequest {
    pub status: ReportStatus,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub school_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub reported_by: Uuid,
    pub title: String,
    pub description: String,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            school_id: report.school_id,
            asset_id: report.asset_id,
            reported_by: report.reported_by,
            title: report.title,
            description: report.description,
            priority: report.priority,
            status: report.status,
            resolved_at: report.resolved_at,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Work orders

#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderRequest {
    pub school_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: WorkOrderPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkOrderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<WorkOrderPriority>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AssignWorkOrderRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct WorkOrderStatusRequest {
    pub status: WorkOrderStatus,
    pub completion_notes: Option<String>,
}

/// Body for converting a maintenance report into a work order. Fields not
/// given are carried over from the report.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<WorkOrderPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct WorkOrderResponse {
    pub id: Uuid,
    pub school_id: Uuid,
    pub report_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: WorkOrderPriority,
    pub status: WorkOrderStatus,
    pub due_date: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkOrder> for WorkOrderResponse {
    fn from(wo: WorkOrder) -> Self {
        Self {
            id: wo.id,
            school_id: wo.school_id,
            report_id: wo.report_id,
            asset_id: wo.asset_id,
            assigned_to: wo.assigned_to,
            title: wo.title,
            description: wo.description,
            priority: wo.priority,
            status: wo.status,
            due_date: wo.due_date,
            started_at: wo.started_at,
            completed_at: wo.completed_at,
            completion_notes: wo.completion_notes,
            created_at: wo.created_at,
            updated_at: wo.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Attendance

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub school_id: Uuid,
    pub vehicle_plate: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckOutRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub vehicle_plate: Option<String>,
    pub notes: Option<String>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(a: Attendance) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            school_id: a.school_id,
            checked_in_at: a.checked_in_at,
            checked_out_at: a.checked_out_at,
            vehicle_plate: a.vehicle_plate,
            notes: a.notes,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            body: n.body,
            entity_type: n.entity_type,
            entity_id: n.entity_id,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard statistics

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

impl From<(String, i64)> for StatusCount {
    fn from((status, count): (String, i64)) -> Self {
        Self { status, count }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub schools: i64,
    pub assets: i64,
    pub users: i64,
    pub open_reports: i64,
    pub reports_by_status: Vec<StatusCount>,
    pub work_orders_by_status: Vec<StatusCount>,
    pub open_attendance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_response_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "tech@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            display_name: "Tech".to_string(),
            phone: None,
            role: UserRole::Technician,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let dto = UserResponse::from(user);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("company_id").is_none());
        assert_eq!(json["role"], "technician");
    }

    #[test]
    fn school_response_carries_both_names() {
        let school = School {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Al Noor Primary".to_string(),
            name_ar: Some("مدرسة النور الابتدائية".to_string()),
            code: "SCH-001".to_string(),
            address: None,
            city: Some("Riyadh".to_string()),
            region: None,
            contact_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let json = serde_json::to_value(SchoolResponse::from(school)).unwrap();
        assert_eq!(json["code"], "SCH-001");
        assert!(json["name_ar"].as_str().unwrap().contains("مدرسة"));
        assert!(json.get("company_id").is_none());
    }
}
