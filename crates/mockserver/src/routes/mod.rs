//! JSON API dispatch.
//!
//! # Route Structure
//!
//! All paths are relative to the configured API prefix (default `/api/v1`).
//!
//! ```text
//! # Custom handlers (checked first, in table order)
//! POST   auth/login          - Login, returns user + token
//! POST   auth/register       - Register a user
//! GET    profile             - First user's name and id
//! GET    cart                - All cart items
//! POST   cart                - Add a cart item
//! PUT    cart/{id}           - Replace a cart item
//! *      cart                - 405
//! GET    users               - All users, ignoring query filters
//! PUT    users/{id}          - Replace a user
//! GET    orders              - All orders, or those of ?userId=
//! PUT    products/{id}       - Replace a product
//!
//! # Generic override (any known resource)
//! POST   {resource}          - Append
//! PUT    {resource}/{id}     - Replace
//! DELETE {resource}/{id}     - Remove, 204
//!
//! # Everything else
//! GET    {resource}[/{id}]   - Default router (listing, filtering, lookup)
//! ```
//!
//! Precedence is data: [`CUSTOM_ROUTES`] is scanned in order, then the
//! generic override predicate, then the default router. [`resolve`] is pure
//! so the ordering can be tested without a server.

pub mod auth;
pub mod cart;
pub mod generic;
pub mod listing;
pub mod orders;
pub mod products;
pub mod profile;
pub mod request;
pub mod users;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use tracing::{Span, instrument};

use crate::error::{AppError, Result};
use crate::state::AppState;
use generic::Operation;
use request::ApiRequest;

/// Method filter of a route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    /// Any method not claimed by an earlier entry for the same path.
    Any,
}

impl Verb {
    /// Whether this filter admits `method`.
    #[must_use]
    pub fn matches(self, method: &Method) -> bool {
        match self {
            Self::Get => method == Method::GET,
            Self::Post => method == Method::POST,
            Self::Put => method == Method::PUT,
            Self::Delete => method == Method::DELETE,
            Self::Any => true,
        }
    }
}

/// Custom handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Login,
    Register,
    Profile,
    ListCart,
    AddCartItem,
    UpdateCartItem,
    CartMethodNotAllowed,
    ListUsers,
    UpdateUser,
    ListOrders,
    UpdateProduct,
}

/// One row of the custom route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub verb: Verb,
    /// Path pattern; a `{id}` segment captures the record id.
    pub pattern: &'static str,
    pub handler: Handler,
}

const fn route(verb: Verb, pattern: &'static str, handler: Handler) -> RouteEntry {
    RouteEntry {
        verb,
        pattern,
        handler,
    }
}

/// Custom routes, in precedence order.
pub const CUSTOM_ROUTES: &[RouteEntry] = &[
    route(Verb::Post, "auth/login", Handler::Login),
    route(Verb::Post, "auth/register", Handler::Register),
    route(Verb::Get, "profile", Handler::Profile),
    route(Verb::Get, "cart", Handler::ListCart),
    route(Verb::Post, "cart", Handler::AddCartItem),
    route(Verb::Put, "cart/{id}", Handler::UpdateCartItem),
    route(Verb::Any, "cart", Handler::CartMethodNotAllowed),
    route(Verb::Get, "users", Handler::ListUsers),
    route(Verb::Put, "users/{id}", Handler::UpdateUser),
    route(Verb::Get, "orders", Handler::ListOrders),
    route(Verb::Put, "products/{id}", Handler::UpdateProduct),
];

/// Which stage answers a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A custom handler, with the `{id}` capture if its pattern has one.
    Custom {
        handler: Handler,
        id: Option<String>,
    },
    /// The generic create/update/delete override.
    Generic(Operation),
    /// The default router.
    Fallback,
}

/// Decide which stage answers a request.
///
/// `is_resource` tells whether a name is a known collection; only those are
/// intercepted by the generic override.
pub fn resolve<F>(method: &Method, segments: &[String], is_resource: F) -> Resolution
where
    F: Fn(&str) -> bool,
{
    for entry in CUSTOM_ROUTES {
        if !entry.verb.matches(method) {
            continue;
        }
        if let Some(id) = match_pattern(entry.pattern, segments) {
            return Resolution::Custom {
                handler: entry.handler,
                id,
            };
        }
    }

    if let Some(operation) = Operation::for_request(method, segments, is_resource) {
        return Resolution::Generic(operation);
    }

    Resolution::Fallback
}

/// Match segments against a pattern. `Some(capture)` on a match.
fn match_pattern(pattern: &str, segments: &[String]) -> Option<Option<String>> {
    let parts: Vec<&str> = pattern.split('/').collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut capture = None;
    for (part, segment) in parts.iter().zip(segments) {
        if *part == "{id}" {
            capture = Some(segment.clone());
        } else if part != segment {
            return None;
        }
    }
    Some(capture)
}

/// Axum entry point for every request no other route claims.
///
/// Store access takes a resource lock and rewrites the collection file, so
/// the request is answered on the blocking pool, inside the request span.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| handle(&state, method, &uri, body)))
        .await
        .unwrap_or_else(|e| Err(AppError::Internal(format!("request handler failed: {e}"))))
        .unwrap_or_else(IntoResponse::into_response)
}

#[instrument(skip(state, body), fields(path = %uri.path()))]
fn handle(state: &AppState, method: Method, uri: &Uri, body: Bytes) -> Result<Response> {
    let Some(request) = ApiRequest::parse(&state.config().api_prefix, method, uri, body)? else {
        return Err(AppError::NotFound("Not found".to_string()));
    };

    let resolution = resolve(&request.method, &request.segments, |name| {
        state.store().contains(name)
    });
    tracing::debug!(?resolution, "resolved request");

    match resolution {
        Resolution::Custom { handler, id } => run_custom(state, handler, id, &request),
        Resolution::Generic(operation) => generic::apply(state, &operation, &request),
        Resolution::Fallback => state.fallback().handle(state.store(), &request),
    }
}

fn run_custom(
    state: &AppState,
    handler: Handler,
    id: Option<String>,
    request: &ApiRequest,
) -> Result<Response> {
    let id = id.unwrap_or_default();
    match handler {
        Handler::Login => auth::login(state, request),
        Handler::Register => auth::register(state, request),
        Handler::Profile => profile::show(state),
        Handler::ListCart => Ok(cart::list(state)),
        Handler::AddCartItem => cart::add(state, request),
        Handler::UpdateCartItem => cart::update(state, &id, request),
        Handler::CartMethodNotAllowed => Err(AppError::MethodNotAllowed),
        Handler::ListUsers => Ok(users::list(state)),
        Handler::UpdateUser => users::update(state, &id, request),
        Handler::ListOrders => Ok(orders::list(state, request)),
        Handler::UpdateProduct => products::update(state, &id, request),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tempfile::TempDir;

    use super::*;
    use crate::config::MockServerConfig;

    fn segments(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn resolve_path(method: &Method, path: &str) -> Resolution {
        resolve(method, &segments(path), |name| {
            ["users", "cart", "orders", "products", "reviews"].contains(&name)
        })
    }

    fn custom(handler: Handler, id: Option<&str>) -> Resolution {
        Resolution::Custom {
            handler,
            id: id.map(str::to_owned),
        }
    }

    #[test]
    fn test_custom_routes() {
        assert_eq!(
            resolve_path(&Method::POST, "auth/login"),
            custom(Handler::Login, None)
        );
        assert_eq!(
            resolve_path(&Method::POST, "auth/register"),
            custom(Handler::Register, None)
        );
        assert_eq!(
            resolve_path(&Method::GET, "profile"),
            custom(Handler::Profile, None)
        );
        assert_eq!(
            resolve_path(&Method::PUT, "users/7"),
            custom(Handler::UpdateUser, Some("7"))
        );
        assert_eq!(
            resolve_path(&Method::PUT, "products/999"),
            custom(Handler::UpdateProduct, Some("999"))
        );
        assert_eq!(
            resolve_path(&Method::GET, "orders"),
            custom(Handler::ListOrders, None)
        );
    }

    #[test]
    fn test_cart_routes() {
        assert_eq!(
            resolve_path(&Method::GET, "cart"),
            custom(Handler::ListCart, None)
        );
        assert_eq!(
            resolve_path(&Method::POST, "cart"),
            custom(Handler::AddCartItem, None)
        );
        assert_eq!(
            resolve_path(&Method::PUT, "cart/3"),
            custom(Handler::UpdateCartItem, Some("3"))
        );
        assert_eq!(
            resolve_path(&Method::PATCH, "cart"),
            custom(Handler::CartMethodNotAllowed, None)
        );
        assert_eq!(
            resolve_path(&Method::DELETE, "cart"),
            custom(Handler::CartMethodNotAllowed, None)
        );
    }

    #[test]
    fn test_delete_cart_item_is_generic() {
        assert_eq!(
            resolve_path(&Method::DELETE, "cart/3"),
            Resolution::Generic(Operation::Delete {
                resource: "cart".to_owned(),
                id: "3".to_owned(),
            })
        );
    }

    #[test]
    fn test_generic_override_for_known_resources() {
        assert_eq!(
            resolve_path(&Method::POST, "products"),
            Resolution::Generic(Operation::Create {
                resource: "products".to_owned()
            })
        );
        assert_eq!(
            resolve_path(&Method::PUT, "orders/12"),
            Resolution::Generic(Operation::Update {
                resource: "orders".to_owned(),
                id: "12".to_owned(),
            })
        );
        assert_eq!(
            resolve_path(&Method::DELETE, "reviews/1"),
            Resolution::Generic(Operation::Delete {
                resource: "reviews".to_owned(),
                id: "1".to_owned(),
            })
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(resolve_path(&Method::GET, "products"), Resolution::Fallback);
        assert_eq!(resolve_path(&Method::GET, "products/1"), Resolution::Fallback);
        assert_eq!(resolve_path(&Method::GET, "users/1"), Resolution::Fallback);
        assert_eq!(resolve_path(&Method::POST, "wishlist"), Resolution::Fallback);
        assert_eq!(resolve_path(&Method::PATCH, "products/1"), Resolution::Fallback);
        assert_eq!(resolve_path(&Method::GET, ""), Resolution::Fallback);
    }

    #[test]
    fn test_custom_routes_precede_generic() {
        // POST users would be a generic append if registration were not
        // matched first by path; make sure only the exact path is custom.
        assert_eq!(
            resolve_path(&Method::POST, "users"),
            Resolution::Generic(Operation::Create {
                resource: "users".to_owned()
            })
        );
        assert!(matches!(
            resolve_path(&Method::PUT, "users/1"),
            Resolution::Custom { .. }
        ));
    }

    #[test]
    fn test_match_pattern() {
        assert_eq!(match_pattern("cart", &segments("cart")), Some(None));
        assert_eq!(
            match_pattern("cart/{id}", &segments("cart/9")),
            Some(Some("9".to_owned()))
        );
        assert_eq!(match_pattern("cart/{id}", &segments("cart")), None);
        assert_eq!(match_pattern("cart", &segments("cart/9")), None);
        assert_eq!(match_pattern("auth/login", &segments("auth/logout")), None);
    }

    fn state_in(dir: &TempDir) -> AppState {
        let data_dir = dir.path().display().to_string();
        let config = MockServerConfig::from_lookup(|key| {
            (key == "MOCKSERVER_DATA_DIR").then(|| data_dir.clone())
        })
        .unwrap();
        AppState::new(config).unwrap()
    }

    async fn call(state: &AppState, method: Method, path: &str, body: &'static str) -> Response {
        let uri: Uri = path.parse().unwrap();
        dispatch(State(state.clone()), method, uri, Bytes::from_static(body.as_bytes())).await
    }

    #[tokio::test]
    async fn test_dispatch_persists_from_blocking_pool() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let created = call(&state, Method::POST, "/api/v1/products", r#"{"name": "Runner"}"#).await;
        assert_eq!(created.status(), StatusCode::OK);
        assert_eq!(state.store().load("products").len(), 1);

        let missing = call(&state, Method::PUT, "/api/v1/products/99", "{}").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let outside = call(&state, Method::GET, "/elsewhere", "").await;
        assert_eq!(outside.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_concurrent_appends() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let calls = (0..16).map(|_| {
            let state = state.clone();
            tokio::spawn(async move { call(&state, Method::POST, "/api/v1/orders", "{}").await })
        });
        for handle in calls.collect::<Vec<_>>() {
            assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
        }

        let stored = state.store().load("orders");
        let ids: std::collections::HashSet<_> =
            stored.iter().filter_map(|r| r.get_str("id")).collect();
        assert_eq!(stored.len(), 16);
        assert_eq!(ids.len(), 16);
    }
}
