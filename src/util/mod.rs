pub mod minio;
pub mod storage;
pub mod notifier;
pub mod email;
pub mod emailjs;
pub mod validation;
pub mod logger;
pub mod error;
