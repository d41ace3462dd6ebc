/// Router Module Index
///
/// Article routes split by access level. Both tables are merged and nested
/// under `/article` by `create_router`.

/// Routes open to anonymous clients (read and view counting).
pub mod public;

/// Routes whose handlers require the `AdminUser` extractor.
pub mod admin;
