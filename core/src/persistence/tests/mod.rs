//! Tests for units of work, providers and the database context

#[cfg(test)]
mod context_tests;
