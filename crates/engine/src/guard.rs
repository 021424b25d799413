//! Route table and access decisions.
//!
//! The dashboard navigates by path strings; [`Route::parse`] turns them into
//! a typed route and [`decide`] checks it against the current [`AuthState`].

use std::fmt;

/// Role stored on the user's document. Only `admin` and `manager` open the
/// admin panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Other(String),
}

impl Role {
    /// Matches the stored string exactly; an empty role counts as no role.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            other => Some(Self::Other(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Other(other) => other,
        }
    }

    pub fn can_administer(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedInUser {
    pub uid: String,
    pub email: String,
    pub role: Option<Role>,
}

/// Snapshot published by the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Startup, before the stored session has been checked.
    #[default]
    Checking,
    SignedOut,
    SignedIn(SignedInUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&SignedInUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminPage {
    Payments,
    Plots,
    RegisterPlot,
    EditPlot(String),
    Tenants,
    Receipts,
    Settings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    PlotDetail(String),
    Admin(AdminPage),
    NotFound(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Only for signed-out users.
    Public,
    /// Any signed-in user.
    Protected,
    /// Signed-in users whose role can administer.
    AdminOnly,
    /// Shown to everybody.
    Open,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let segments: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Self::Login,
            ["dashboard"] => Self::Dashboard,
            ["plot", id] => Self::PlotDetail((*id).to_string()),
            ["admin"] => Self::Admin(AdminPage::Payments),
            ["admin", "plots"] => Self::Admin(AdminPage::Plots),
            ["admin", "plots", "new"] => Self::Admin(AdminPage::RegisterPlot),
            ["admin", "plots", id, "edit"] => Self::Admin(AdminPage::EditPlot((*id).to_string())),
            ["admin", "tenants"] => Self::Admin(AdminPage::Tenants),
            ["admin", "receipts"] => Self::Admin(AdminPage::Receipts),
            ["admin", "settings"] => Self::Admin(AdminPage::Settings),
            _ => Self::NotFound(bare.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::PlotDetail(id) => format!("/plot/{id}"),
            Self::Admin(page) => match page {
                AdminPage::Payments => "/admin".to_string(),
                AdminPage::Plots => "/admin/plots".to_string(),
                AdminPage::RegisterPlot => "/admin/plots/new".to_string(),
                AdminPage::EditPlot(id) => format!("/admin/plots/{id}/edit"),
                AdminPage::Tenants => "/admin/tenants".to_string(),
                AdminPage::Receipts => "/admin/receipts".to_string(),
                AdminPage::Settings => "/admin/settings".to_string(),
            },
            Self::NotFound(path) => path.clone(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Login => Access::Public,
            Self::Dashboard | Self::PlotDetail(_) => Access::Protected,
            Self::Admin(_) => Access::AdminOnly,
            Self::NotFound(_) => Access::Open,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    CheckingAuth,
    Unauthenticated,
    AuthenticatedNoRole,
    Authorized,
}

impl GuardState {
    pub fn resolve(auth: &AuthState) -> Self {
        match auth {
            AuthState::Checking => Self::CheckingAuth,
            AuthState::SignedOut => Self::Unauthenticated,
            AuthState::SignedIn(user) => match &user.role {
                Some(role) if role.can_administer() => Self::Authorized,
                _ => Self::AuthenticatedNoRole,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Keep showing the loader.
    Wait,
    Allow,
    Redirect {
        to: Route,
        /// Where to go back to after signing in.
        return_to: Option<Route>,
    },
}

impl Decision {
    fn to_login(from: &Route) -> Self {
        Self::Redirect {
            to: Route::Login,
            return_to: Some(from.clone()),
        }
    }

    fn to_dashboard() -> Self {
        Self::Redirect {
            to: Route::Dashboard,
            return_to: None,
        }
    }
}

pub fn decide(route: &Route, auth: &AuthState) -> Decision {
    let state = GuardState::resolve(auth);
    match (route.access(), state) {
        (Access::Open, _) => Decision::Allow,
        (_, GuardState::CheckingAuth) => Decision::Wait,

        (Access::Public, GuardState::Unauthenticated) => Decision::Allow,
        (Access::Public, _) => Decision::to_dashboard(),

        (Access::Protected | Access::AdminOnly, GuardState::Unauthenticated) => {
            Decision::to_login(route)
        }
        (Access::Protected, _) => Decision::Allow,

        (Access::AdminOnly, GuardState::Authorized) => Decision::Allow,
        (Access::AdminOnly, GuardState::AuthenticatedNoRole) => Decision::to_dashboard(),
    }
}

/// Destination after a successful sign-in.
pub fn post_login_target(return_to: Option<&Route>) -> Route {
    match return_to {
        Some(route) if matches!(route.access(), Access::Protected | Access::AdminOnly) => {
            route.clone()
        }
        _ => Route::Dashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(role: Option<&str>) -> AuthState {
        AuthState::SignedIn(SignedInUser {
            uid: "u1".to_string(),
            email: "ops@jobawu.test".to_string(),
            role: role.and_then(Role::parse),
        })
    }

    #[test]
    fn parses_every_route() {
        let cases = [
            ("/", Route::Login),
            ("/login", Route::Login),
            ("/dashboard", Route::Dashboard),
            ("/plot/p9", Route::PlotDetail("p9".to_string())),
            ("/admin", Route::Admin(AdminPage::Payments)),
            ("/admin/plots", Route::Admin(AdminPage::Plots)),
            ("/admin/plots/new", Route::Admin(AdminPage::RegisterPlot)),
            ("/admin/plots/p9/edit", Route::Admin(AdminPage::EditPlot("p9".to_string()))),
            ("/admin/tenants", Route::Admin(AdminPage::Tenants)),
            ("/admin/receipts/", Route::Admin(AdminPage::Receipts)),
            ("/admin/settings?tab=daraja", Route::Admin(AdminPage::Settings)),
        ];
        for (path, route) in cases {
            assert_eq!(Route::parse(path), route, "{path}");
        }
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".to_string()));
    }

    #[test]
    fn path_round_trips() {
        for path in ["/login", "/dashboard", "/plot/a", "/admin", "/admin/plots/a/edit"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }

    #[test]
    fn role_parsing() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("viewer"), Some(Role::Other("viewer".to_string())));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Other("ADMIN".to_string())));
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn guard_state_per_auth_snapshot() {
        assert_eq!(GuardState::resolve(&AuthState::Checking), GuardState::CheckingAuth);
        assert_eq!(GuardState::resolve(&AuthState::SignedOut), GuardState::Unauthenticated);
        assert_eq!(GuardState::resolve(&signed_in(None)), GuardState::AuthenticatedNoRole);
        assert_eq!(GuardState::resolve(&signed_in(Some("viewer"))), GuardState::AuthenticatedNoRole);
        assert_eq!(GuardState::resolve(&signed_in(Some("manager"))), GuardState::Authorized);
    }

    #[test]
    fn checking_waits_everywhere_but_not_found() {
        for path in ["/login", "/dashboard", "/admin/plots"] {
            assert_eq!(decide(&Route::parse(path), &AuthState::Checking), Decision::Wait);
        }
        assert_eq!(decide(&Route::parse("/zzz"), &AuthState::Checking), Decision::Allow);
    }

    #[test]
    fn signed_out_is_sent_to_login_with_origin() {
        let route = Route::Admin(AdminPage::Tenants);
        assert_eq!(
            decide(&route, &AuthState::SignedOut),
            Decision::Redirect {
                to: Route::Login,
                return_to: Some(route.clone()),
            }
        );
        assert_eq!(decide(&Route::Login, &AuthState::SignedOut), Decision::Allow);
    }

    #[test]
    fn missing_or_wrong_role_bounces_to_dashboard() {
        let route = Route::Admin(AdminPage::Settings);
        let bounce = Decision::Redirect {
            to: Route::Dashboard,
            return_to: None,
        };
        assert_eq!(decide(&route, &signed_in(None)), bounce);
        assert_eq!(decide(&route, &signed_in(Some("viewer"))), bounce);
        assert_eq!(decide(&route, &signed_in(Some("admin"))), Decision::Allow);
        assert_eq!(decide(&Route::Dashboard, &signed_in(None)), Decision::Allow);
    }

    #[test]
    fn role_match_is_case_and_space_sensitive() {
        let route = Route::Admin(AdminPage::Settings);
        let bounce = Decision::Redirect {
            to: Route::Dashboard,
            return_to: None,
        };
        for role in ["ADMIN", "Admin", " Manager ", "manager "] {
            assert_eq!(decide(&route, &signed_in(Some(role))), bounce, "{role:?}");
        }
        assert_eq!(
            GuardState::resolve(&signed_in(Some("ADMIN"))),
            GuardState::AuthenticatedNoRole
        );
    }

    #[test]
    fn signed_in_users_skip_login() {
        assert_eq!(
            decide(&Route::Login, &signed_in(Some("admin"))),
            Decision::Redirect {
                to: Route::Dashboard,
                return_to: None,
            }
        );
    }

    #[test]
    fn post_login_returns_to_guarded_origin_only() {
        let origin = Route::PlotDetail("p1".to_string());
        assert_eq!(post_login_target(Some(&origin)), origin);
        assert_eq!(post_login_target(Some(&Route::Login)), Route::Dashboard);
        assert_eq!(post_login_target(None), Route::Dashboard);
    }
}
