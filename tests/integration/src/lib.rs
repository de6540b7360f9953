//! Intentionally empty — integration tests live in tests/.
