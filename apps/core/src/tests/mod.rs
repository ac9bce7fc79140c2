//! Test Module
//!
//! Cross-component test suite for the DisasterAI core.
//!
//! ## Test Categories
//! - `classifier_tests`: Message classification priorities
//! - `prompt_tests`: Prompt composition and message containment
//! - `assessment_tests`: Scene assessment invariants
//! - `service_tests`: Request boundary, gateway failures and session history
//! - `gateway_tests`: Chat service against a mocked Gemini endpoint

pub mod gateway_tests;
