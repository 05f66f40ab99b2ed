pub mod asset;
pub mod attendance;
pub mod audit;
pub mod company;
pub mod enums;
pub mod notification;
pub mod report;
pub mod school;
pub mod user;
pub mod work_order;

pub use asset::Asset;
pub use attendance::Attendance;
pub use audit::AuditEntry;
pub use company::Company;
pub use enums::*;
pub use notification::Notification;
pub use report::Report;
pub use school::School;
pub use user::User;
pub use work_order::WorkOrder;
