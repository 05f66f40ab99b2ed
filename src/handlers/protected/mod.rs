pub mod assets;
pub mod attendance;
pub mod auth;
pub mod find;
pub mod notifications;
pub mod reports;
pub mod schools;
pub mod stats;
pub mod users;
pub mod work_orders;
