//! Prompt module for LLM-based operations.
//!
//! This module provides the prompt templates used by the summarizer.

pub mod announcement;

pub use announcement::*;
