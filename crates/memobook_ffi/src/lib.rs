//! Flutter-facing bindings for `memobook_core`.

pub mod api;
