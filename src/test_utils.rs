//! Shared test utilities for caer-build tests
//!
//! Fixtures for a minimal package checkout: `setup.cfg`, the long
//! description, contributors, the package directory and stand-ins for the
//! interpreter and source generator.
