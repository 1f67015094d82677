//! Application layer: job construction service

pub mod service;

pub use service::TransactionJobBuilder;
