//! Tests for pools and the database provider
