//! UI hooks the auth context drives on logout: navigation and toasts.

/// Client routes the auth layer can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Surfaces a short message to the user.
pub trait Toaster: Send + Sync {
    fn show(&self, message: &str);
}
