pub mod account_repository;
pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod features;
pub mod ingestion;
pub mod notifications;
