// ── Route table ──
//
// Every backend resource the client talks to is declared once here with
// its access tag. Endpoint methods build their paths from these constants,
// and the guest-mode gate resolves a request path against the same table.

use std::fmt;

use reqwest::Method;
use serde_json::{Value, json};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session (auth flows, reference dictionaries).
    Public,
    /// Requires a signed-in user; short-circuited in guest mode.
    Protected,
}

/// Shape of the empty payload returned when the gate short-circuits a
/// request to the route's collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyShape {
    List,
    Object,
}

/// A backend resource, identified by its path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub prefix: &'static str,
    pub access: Access,
    pub empty: EmptyShape,
}

impl Route {
    const fn public(prefix: &'static str, empty: EmptyShape) -> Self {
        Self {
            prefix,
            access: Access::Public,
            empty,
        }
    }

    const fn protected(prefix: &'static str, empty: EmptyShape) -> Self {
        Self {
            prefix,
            access: Access::Protected,
            empty,
        }
    }

    /// The collection path itself.
    pub fn path(&self) -> &'static str {
        self.prefix
    }

    /// `{prefix}/{segment}`, e.g. `/vehicles/12`.
    pub fn child(&self, segment: impl fmt::Display) -> String {
        format!("{}/{segment}", self.prefix)
    }

    /// `true` if `path` is this route or one of its sub-resources.
    ///
    /// `/user` matches `/user` and `/user/123`, but not `/user-settings`.
    pub fn matches(&self, path: &str) -> bool {
        let path = strip_query(path);
        path == self.prefix
            || path
                .strip_prefix(self.prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn is_protected(&self) -> bool {
        self.access == Access::Protected
    }
}

// ── Auth ─────────────────────────────────────────────────────────────
pub const LOGIN: Route = Route::public("/auth/login", EmptyShape::Object);
pub const REGISTER: Route = Route::public("/auth/register", EmptyShape::Object);
pub const LOGOUT: Route = Route::public("/auth/logout", EmptyShape::Object);
pub const SOCIAL_AUTH: Route = Route::public("/auth/social", EmptyShape::Object);

// ── User data ────────────────────────────────────────────────────────
pub const USER: Route = Route::protected("/user", EmptyShape::Object);
pub const PROFILE: Route = Route::protected("/profile", EmptyShape::Object);
pub const VEHICLES: Route = Route::protected("/vehicles", EmptyShape::List);
pub const REMINDERS: Route = Route::protected("/reminders", EmptyShape::List);
pub const SERVICE_HISTORY: Route = Route::protected("/service-history", EmptyShape::List);
pub const HISTORY: Route = Route::protected("/history", EmptyShape::List);
pub const SERVICE_STATIONS: Route = Route::protected("/service-stations", EmptyShape::List);
pub const USER_STATIONS: Route = Route::protected("/user-stations", EmptyShape::List);
pub const MANUALS: Route = Route::protected("/manuals", EmptyShape::List);
pub const STATISTICS: Route = Route::protected("/statistics", EmptyShape::Object);
pub const CAR_RECOMMENDATIONS: Route = Route::protected("/car-recommendations", EmptyShape::List);
pub const EXPENSES: Route = Route::protected("/expenses", EmptyShape::List);

// ── Reference dictionaries ───────────────────────────────────────────
pub const EXPENSE_TYPES: Route = Route::public("/expense-types", EmptyShape::List);
pub const REMINDER_TYPES: Route = Route::public("/reminder-types", EmptyShape::List);
pub const MANUAL_SECTIONS: Route = Route::public("/manual-sections", EmptyShape::List);
pub const ADVICE_SECTIONS: Route = Route::public("/advice-sections", EmptyShape::List);

/// Every known route.
pub const ROUTES: &[Route] = &[
    LOGIN,
    REGISTER,
    LOGOUT,
    SOCIAL_AUTH,
    USER,
    PROFILE,
    VEHICLES,
    REMINDERS,
    SERVICE_HISTORY,
    HISTORY,
    SERVICE_STATIONS,
    USER_STATIONS,
    MANUALS,
    STATISTICS,
    CAR_RECOMMENDATIONS,
    EXPENSES,
    EXPENSE_TYPES,
    REMINDER_TYPES,
    MANUAL_SECTIONS,
    ADVICE_SECTIONS,
];

/// Paths that must never carry the bearer token.
const TOKENLESS: &[Route] = &[LOGIN, REGISTER];

/// Drop any `?query` suffix.
pub fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}

/// The route owning `path` (longest matching prefix), if any.
pub fn resolve(path: &str) -> Option<&'static Route> {
    ROUTES
        .iter()
        .filter(|r| r.matches(path))
        .max_by_key(|r| r.prefix.len())
}

/// `true` if `path` belongs to a protected route. Unknown paths are public.
pub fn is_protected(path: &str) -> bool {
    resolve(path).is_some_and(Route::is_protected)
}

/// `false` for the login and registration endpoints.
pub fn sends_bearer(path: &str) -> bool {
    let path = strip_query(path);
    !TOKENLESS.iter().any(|r| r.prefix == path)
}

// ── Guest-mode gate ──────────────────────────────────────────────────

/// Outcome of evaluating a request against the guest-mode gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Send the request to the backend.
    PassThrough,
    /// Answer locally with an empty success payload of this shape.
    ShortCircuit(EmptyShape),
}

impl GateDecision {
    /// The synthetic `{ data, success: true }` envelope for a short circuit.
    pub fn empty_envelope(shape: EmptyShape) -> Value {
        let data = match shape {
            EmptyShape::List => json!([]),
            EmptyShape::Object => json!({}),
        };
        json!({ "data": data, "success": true })
    }
}

/// Decide whether a request may reach the network.
///
/// Only `guest && protected` short-circuits. A `GET` on the exact
/// collection path of a list route yields `[]`; every other protected
/// request yields `{}`.
pub fn evaluate(guest: bool, method: &Method, path: &str) -> GateDecision {
    if !guest {
        return GateDecision::PassThrough;
    }
    let Some(route) = resolve(path).filter(|r| r.is_protected()) else {
        return GateDecision::PassThrough;
    };

    let on_collection = strip_query(path) == route.prefix;
    let shape = if *method == Method::GET && on_collection {
        route.empty
    } else {
        EmptyShape::Object
    };
    GateDecision::ShortCircuit(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTECTED: &[&str] = &[
        "/user",
        "/vehicles",
        "/reminders",
        "/service-history",
        "/history",
        "/service-stations",
        "/user-stations",
        "/manuals",
        "/statistics",
        "/car-recommendations",
        "/expenses",
        "/profile",
    ];

    #[test]
    fn every_protected_prefix_is_protected() {
        for path in PROTECTED {
            assert!(is_protected(path), "{path} should be protected");
            assert!(is_protected(&format!("{path}/123")), "{path}/123 should be protected");
        }
    }

    #[test]
    fn lookalike_paths_are_not_conflated() {
        assert!(!is_protected("/user-settings"));
        assert!(!is_protected("/vehiclesx"));
        assert!(is_protected("/user/123"));
        assert_eq!(resolve("/user-stations/4").map(|r| r.prefix), Some("/user-stations"));
    }

    #[test]
    fn public_and_unknown_paths_pass() {
        for path in ["/auth/login", "/expense-types", "/manual-sections", "/health"] {
            assert_eq!(evaluate(true, &Method::GET, path), GateDecision::PassThrough);
        }
    }

    #[test]
    fn gate_only_fires_for_guests() {
        assert_eq!(
            evaluate(false, &Method::GET, "/vehicles"),
            GateDecision::PassThrough
        );
        assert_eq!(
            evaluate(true, &Method::GET, "/vehicles"),
            GateDecision::ShortCircuit(EmptyShape::List)
        );
    }

    #[test]
    fn empty_shape_depends_on_method_and_depth() {
        assert_eq!(
            evaluate(true, &Method::GET, "/vehicles?page=2"),
            GateDecision::ShortCircuit(EmptyShape::List)
        );
        assert_eq!(
            evaluate(true, &Method::GET, "/vehicles/7"),
            GateDecision::ShortCircuit(EmptyShape::Object)
        );
        assert_eq!(
            evaluate(true, &Method::POST, "/vehicles"),
            GateDecision::ShortCircuit(EmptyShape::Object)
        );
        assert_eq!(
            evaluate(true, &Method::GET, "/user"),
            GateDecision::ShortCircuit(EmptyShape::Object)
        );
    }

    #[test]
    fn login_and_register_skip_bearer() {
        assert!(!sends_bearer("/auth/login"));
        assert!(!sends_bearer("/auth/register"));
        assert!(sends_bearer("/auth/logout"));
        assert!(sends_bearer("/vehicles"));
    }

    #[test]
    fn child_paths() {
        assert_eq!(VEHICLES.child(12), "/vehicles/12");
        assert!(VEHICLES.matches(&VEHICLES.child("abc")));
    }
}
