pub mod submission_handler;
