use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "properties.create"). The wildcard
/// `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

macro_rules! permissions {
    ($($name:ident = $value:literal),+ $(,)?) => {
        impl Permission {
            $(pub const $name: Permission = Permission(Cow::Borrowed($value));)+

            /// Every write permission the back office knows about.
            pub const ALL_WRITES: &'static [Permission] = &[$(Permission::$name),+];
        }
    };
}

permissions! {
    PROPERTIES_CREATE = "properties.create",
    PROPERTIES_UPDATE = "properties.update",
    PROPERTIES_DELETE = "properties.delete",
    LEADS_CREATE = "leads.create",
    LEADS_UPDATE = "leads.update",
    LEADS_DELETE = "leads.delete",
    CLIENTS_CREATE = "clients.create",
    CLIENTS_UPDATE = "clients.update",
    CLIENTS_DELETE = "clients.delete",
    PURCHASE_ORDERS_CREATE = "purchase_orders.create",
    PURCHASE_ORDERS_UPDATE = "purchase_orders.update",
    PURCHASE_ORDERS_DELETE = "purchase_orders.delete",
}

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
