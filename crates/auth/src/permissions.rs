use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier on an access-control container.
///
/// Permissions are opaque strings. The container levels used by entity
/// services are provided as constants; `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const READ: Permission = Permission(Cow::Borrowed("read"));
    pub const WRITE: Permission = Permission(Cow::Borrowed("write"));
    pub const DELETE: Permission = Permission(Cow::Borrowed("delete"));
    pub const ADMIN: Permission = Permission(Cow::Borrowed("admin"));
    pub const ALL: Permission = Permission(Cow::Borrowed("*"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    ///
    /// `admin` on a container implies every other level on it.
    pub fn grants(&self, required: &Permission) -> bool {
        self.is_wildcard() || self == required || self == &Permission::ADMIN
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
