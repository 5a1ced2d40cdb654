// ============================================================================
// ROUTES - page paths and the auth guard
// ============================================================================

use crate::models::SessionUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Newsfeed,
    Login,
    Signup,
    ForgotPassword,
    Dashboard,
    Comparison,
    Settings,
    MarketNews,
    Investments,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Newsfeed,
        Route::Login,
        Route::Signup,
        Route::ForgotPassword,
        Route::Dashboard,
        Route::Comparison,
        Route::Settings,
        Route::MarketNews,
        Route::Investments,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Newsfeed => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ForgotPassword => "/forgot-password",
            Route::Dashboard => "/dashboard",
            Route::Comparison => "/comparison",
            Route::Settings => "/settings",
            Route::MarketNews => "/market-news",
            Route::Investments => "/investments",
        }
    }

    /// Ignores query, fragment and a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Pages behind the sidebar; they need a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Comparison | Route::Settings | Route::MarketNews | Route::Investments
        )
    }

    /// Pages that make no sense once signed in.
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login | Route::Signup | Route::ForgotPassword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// Session not known yet; show a placeholder.
    Defer,
    Redirect(Route),
}

/// What to do with a navigation to `route` given the session state.
pub fn guard(route: Route, loading: bool, user: Option<&SessionUser>) -> RouteDecision {
    if route.is_protected() {
        return match (loading, user) {
            (true, _) => RouteDecision::Defer,
            (false, Some(_)) => RouteDecision::Render,
            (false, None) => RouteDecision::Redirect(Route::Login),
        };
    }
    if route.is_guest_only() && !loading && user.is_some() {
        return RouteDecision::Redirect(Route::Dashboard);
    }
    RouteDecision::Render
}
