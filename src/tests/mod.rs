//! Unit test suites for the domain model and the rules engines.

mod helpers;
mod task_service_tests;
