//! Git operations and repository management.

pub mod repository;

pub use repository::GitRepository;
