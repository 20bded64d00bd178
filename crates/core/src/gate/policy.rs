use crate::gate::route::{Route, RouteError};
use crate::model::Role;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    Public,
    Authenticated,
    RequiresRole(Role),
}

const PUBLIC_PREFIXES: &[&str] = &["/login", "/register", "/courses"];

impl RoutePolicy {
    /// Access rule for an in-app path.
    ///
    /// `/`, `/login`, `/register` and the course catalogue are public, the
    /// admin area needs the admin role, and every other page needs a
    /// signed-in user of any role.
    #[must_use]
    pub fn for_route(route: &Route) -> Self {
        if route.path() == "/" || PUBLIC_PREFIXES.iter().any(|p| route.is_under(p)) {
            return RoutePolicy::Public;
        }
        if route.is_under("/admin") {
            return RoutePolicy::RequiresRole(Role::Admin);
        }
        RoutePolicy::Authenticated
    }

    /// Parse `path` and resolve its policy.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if `path` is not an absolute in-app path.
    pub fn for_path(path: &str) -> Result<Self, RouteError> {
        Route::parse(path).map(|route| Self::for_route(&route))
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        !matches!(self, RoutePolicy::Public)
    }

    #[must_use]
    pub fn required_role(self) -> Option<Role> {
        match self {
            RoutePolicy::RequiresRole(role) => Some(role),
            RoutePolicy::Public | RoutePolicy::Authenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(path: &str) -> RoutePolicy {
        RoutePolicy::for_route(&Route::parse(path).unwrap())
    }

    #[test]
    fn public_routes() {
        assert_eq!(policy("/"), RoutePolicy::Public);
        assert_eq!(policy("/login"), RoutePolicy::Public);
        assert_eq!(policy("/register"), RoutePolicy::Public);
        assert_eq!(policy("/courses"), RoutePolicy::Public);
        assert_eq!(policy("/courses/x"), RoutePolicy::Public);
        assert_eq!(RoutePolicy::for_path("/courses/x"), Ok(RoutePolicy::Public));
        assert!(RoutePolicy::for_path("courses").is_err());
    }

    #[test]
    fn admin_area_requires_admin() {
        assert_eq!(policy("/admin/courses"), RoutePolicy::RequiresRole(Role::Admin));
        assert_eq!(policy("/admin"), RoutePolicy::RequiresRole(Role::Admin));
        assert_eq!(
            policy("/admin/courses").required_role(),
            Some(Role::Admin)
        );
    }

    #[test]
    fn student_area_requires_sign_in() {
        assert_eq!(policy("/dashboard"), RoutePolicy::Authenticated);
        assert_eq!(policy("/dashboard/learn/c1"), RoutePolicy::Authenticated);
        assert_eq!(policy("/learn/c1"), RoutePolicy::Authenticated);
        assert_eq!(policy("/coursework"), RoutePolicy::Authenticated);
        assert!(policy("/learn/c1").requires_auth());
        assert!(!policy("/").requires_auth());
    }
}
