mod audit;
mod export;

pub use audit::{run_audit, AuditArgs};
pub use export::run_export;
