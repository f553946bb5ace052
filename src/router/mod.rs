pub mod submission_router;
