/// The signed-in user the pipeline resolves menus for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub name: Option<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Session context handed to every pipeline entry point.
///
/// There is no ambient "current user": callers construct this explicitly.
/// An unauthenticated context (the login surface) short-circuits every
/// read to an empty result without touching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub authenticated: bool,
    pub principal: Option<Principal>,
}

impl AuthContext {
    /// Context of the login page: nothing is loaded.
    pub fn login_page() -> Self {
        Self {
            authenticated: false,
            principal: None,
        }
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self {
            authenticated: true,
            principal: Some(principal),
        }
    }

    /// Authenticated session whose principal is not known to the caller.
    /// Requests omit `userId` and the backend falls back to the session.
    pub fn anonymous_session() -> Self {
        Self {
            authenticated: true,
            principal: None,
        }
    }

    pub fn is_login_page(&self) -> bool {
        !self.authenticated
    }

    pub fn user_id(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.user_id.as_str())
    }
}
