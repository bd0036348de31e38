// Course completion workflow: save, submit proof, HR review, delete.
// Capacity and duplicate checks happen under a row lock on the employee.

pub mod dedup;
pub mod handlers;
pub mod store;
pub mod workflow;
