/// Forward dispatcher: fan-out, quota gate and debit
pub mod dispatch;
/// Mapping registry
pub mod mapping;
/// Payment claims and premium approval
pub mod payment;
/// Chat identifiers and the platform client seam
pub mod platform;
/// Quota policy
pub mod quota;
/// Daily counter reset scheduler
pub mod scheduler;
/// User registry
pub mod user;
