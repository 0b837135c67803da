//! End-to-end tests for the derivation pipeline live in `tests/`.
