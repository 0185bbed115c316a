//! Tests for the service container

#[cfg(test)]
mod environment_tests;
#[cfg(test)]
mod resolve_tests;
