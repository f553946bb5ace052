pub mod submission_dto;
