#![allow(dead_code)]

use switchyard::{
    Engine, Method, Outcome, Request, Response, RouteDescriptor, RoutingTable,
    testing::CallLog,
};

// ============================================================================
// Table helpers
// ============================================================================

/// Build a table from `routes` in registration order.
pub fn table(routes: Vec<RouteDescriptor>) -> RoutingTable {
    routes
        .into_iter()
        .fold(RoutingTable::builder(), |builder, route| builder.route(route))
        .build()
}

/// Template of the route `table` picks for a GET of `target`.
pub fn matched_template(table: &RoutingTable, target: &str) -> Option<String> {
    table
        .find(&Request::get(target))
        .expect("table builds")
        .map(|m| m.entry().template().to_string())
}

// ============================================================================
// Engine helpers
// ============================================================================

/// Send `method target` through `engine`; returns how it ended and the response.
pub async fn send(engine: &Engine, method: Method, target: &str) -> (Option<Outcome>, Response) {
    let response = Response::new();
    let outcome = engine
        .dispatch(Request::new(method, target), response.clone())
        .await
        .expect("dispatch succeeds");
    (outcome, response)
}

/// GET `target` and return the response body, or `None` when nothing matched.
pub async fn body_of(engine: &Engine, target: &str) -> Option<String> {
    let (outcome, response) = send(engine, Method::Get, target).await;
    outcome.map(|_| response.body_text())
}

/// A route whose handler records `name` when it runs.
pub fn logged(template: &str, name: &str, log: &CallLog) -> RouteDescriptor {
    switchyard::testing::recording_route(template, name, log)
}
