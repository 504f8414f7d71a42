use realtyops_auth::{CommandAuthorization, Permission};

/// Small helper wrapper to associate required permissions with a write.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, required: impl Into<Vec<Permission>>) -> Self {
        Self { inner, required: required.into() }
    }
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}
