use crate::user::{Role, User};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Client-side routes and who may see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Login,
    Register,
    Home,
    Account,
    Flights,
    Bookings,
    ManagerDashboard,
    AdminDashboard,
    Reports,
    UserManagement,
}

impl AppRoute {
    pub const ALL: [AppRoute; 10] = [
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::Home,
        AppRoute::Account,
        AppRoute::Flights,
        AppRoute::Bookings,
        AppRoute::ManagerDashboard,
        AppRoute::AdminDashboard,
        AppRoute::Reports,
        AppRoute::UserManagement,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Login => LOGIN_PATH,
            AppRoute::Register => "/register",
            AppRoute::Home => HOME_PATH,
            AppRoute::Account => "/account",
            AppRoute::Flights => "/flights",
            AppRoute::Bookings => "/bookings",
            AppRoute::ManagerDashboard => "/manager",
            AppRoute::AdminDashboard => "/admin",
            AppRoute::Reports => "/reports",
            AppRoute::UserManagement => "/users",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => HOME_PATH,
            trimmed => trimmed,
        };
        AppRoute::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, AppRoute::Login | AppRoute::Register)
    }

    /// `None` means any authenticated user.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            AppRoute::ManagerDashboard => Some(Role::Manager),
            AppRoute::AdminDashboard | AppRoute::Reports | AppRoute::UserManagement => {
                Some(Role::Administrator)
            }
            _ => None,
        }
    }
}

/// What the guard knows about the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    /// Stored credentials have not been read yet.
    Loading,
    Anonymous,
    Authenticated(Role),
}

impl SessionView {
    pub fn from_user(user: Option<&User>) -> Self {
        match user {
            Some(user) => SessionView::Authenticated(user.role),
            None => SessionView::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Render a loading placeholder and decide once the session is known.
    Pending,
    Redirect(&'static str),
}

pub fn guard(route: AppRoute, session: SessionView) -> Access {
    if route.is_public() {
        return Access::Allow;
    }

    match session {
        SessionView::Loading => Access::Pending,
        SessionView::Anonymous => Access::Redirect(LOGIN_PATH),
        SessionView::Authenticated(role) => match route.required_role() {
            Some(required) if required != role => {
                tracing::debug!(route = route.path(), %role, "role mismatch, redirecting home");
                Access::Redirect(HOME_PATH)
            }
            _ => Access::Allow,
        },
    }
}

/// Unknown paths fall back to home.
pub fn guard_path(path: &str, session: SessionView) -> Access {
    match AppRoute::from_path(path) {
        Some(route) => guard(route, session),
        None => Access::Redirect(HOME_PATH),
    }
}
