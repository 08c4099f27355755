//! Permission flags computed by the permission service for one user on one resource.

use schemars::JsonSchema;
use utoipa::ToSchema;

/// The set of flags a recipient-resolution pass cares about.
///
/// The permission service returns more flags than these; unknown fields are
/// ignored on deserialization and absent fields default to `false`.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Eq,
    PartialEq,
    Debug,
    ToSchema,
    JsonSchema,
    Clone,
    Copy,
    Default,
)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailablePermissions {
    /// The user can see the resource
    pub view: bool,
    /// The user can comment on the resource
    pub comment: bool,
    /// The user reviews the resource (proposal evaluation steps)
    pub evaluate: bool,
    /// The user reviews appeals of the resource
    pub evaluate_appeal: bool,
}

impl AvailablePermissions {
    /// No access at all
    pub const fn none() -> Self {
        Self {
            view: false,
            comment: false,
            evaluate: false,
            evaluate_appeal: false,
        }
    }

    /// Every flag granted
    pub const fn full() -> Self {
        Self {
            view: true,
            comment: true,
            evaluate: true,
            evaluate_appeal: true,
        }
    }

    /// View only
    pub const fn viewer() -> Self {
        Self {
            view: true,
            comment: false,
            evaluate: false,
            evaluate_appeal: false,
        }
    }

    /// View plus comment
    pub const fn commenter() -> Self {
        Self {
            view: true,
            comment: true,
            evaluate: false,
            evaluate_appeal: false,
        }
    }
}
