pub mod advisory;
pub mod submission;
