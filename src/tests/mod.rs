//! Integration and unit tests for the Katalog application.
//!
//! - **api_tests**: HTTP endpoint tests (CRUD, optimistic locking, files)
//! - **query_tests**: criteria search properties against a seeded database
//! - **config_tests**: configuration loading and validation
//! - **db_tests**: schema initialization
//! - **error_tests**: error-to-response mapping

pub mod api_tests;
pub mod db_tests;
