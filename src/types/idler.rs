use serde::Deserialize;

/// JSON payload of `GET /api/idler/isidle/{namespace}`.
///
/// Unknown fields are ignored and a missing `is_idle` reads as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct IdleStatus {
    #[serde(default)]
    pub is_idle: bool,
}
