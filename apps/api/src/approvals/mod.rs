// Approval requests: employees raise them, HR approves or rejects once.

pub mod handlers;
pub mod store;
