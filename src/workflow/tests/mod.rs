//! Tests for the work-item workflow.

mod relation_service_tests;
mod retry_tests;
mod support;
