use switchyard::{
    Engine, ParamKind, Request, RouteConfigError, RouteDescriptor, RoutesConfig, RoutingTable,
    ScalarKind, Shape,
    routing::{CompiledCriteria, ParsedTemplate, SymbolTable},
    testing::CallLog,
};

mod common;
use common::{body_of, logged, matched_template, table};

// ============================================================================
// Specificity ordering
// ============================================================================

#[test]
fn test_fixed_route_wins_regardless_of_registration_order() {
    let log = CallLog::new();
    for (first, second) in [("/a/b/c", "/a/{[a-z]+}/c"), ("/a/{[a-z]+}/c", "/a/b/c")] {
        let table = table(vec![logged(first, "first", &log), logged(second, "second", &log)]);
        assert_eq!(matched_template(&table, "/a/b/c").as_deref(), Some("/a/b/c"));
        assert_eq!(matched_template(&table, "/a/q/c").as_deref(), Some("/a/{[a-z]+}/c"));
    }
}

#[test]
fn test_more_query_criteria_win_among_patterned_routes() {
    let log = CallLog::new();
    let table = table(vec![
        logged("/search/*", "plain", &log),
        logged("/search/*?page={[0-9]+}&sort=*", "sorted", &log),
        logged("/search/*?page={[0-9]+}", "paged", &log),
    ]);
    assert_eq!(
        matched_template(&table, "/search/x?page=2&sort=asc").as_deref(),
        Some("/search/*?page={[0-9]+}&sort=*")
    );
    assert_eq!(
        matched_template(&table, "/search/x?page=2").as_deref(),
        Some("/search/*?page={[0-9]+}")
    );
    assert_eq!(matched_template(&table, "/search/x").as_deref(), Some("/search/*"));
}

#[test]
fn test_ties_keep_registration_order() {
    let log = CallLog::new();
    let table = table(vec![logged("/t/{.*}", "one", &log), logged("/t/*", "two", &log)]);
    assert_eq!(matched_template(&table, "/t/x").as_deref(), Some("/t/{.*}"));
}

#[test]
fn test_query_count_does_not_reorder_fixed_routes() {
    let log = CallLog::new();
    let table = table(vec![
        logged("/a", "plain", &log),
        logged("/a?x=1", "queried", &log),
        logged("/a/*?x=1&y=2", "patterned", &log),
    ]);
    assert_eq!(matched_template(&table, "/a?x=1").as_deref(), Some("/a"));
    assert_eq!(matched_template(&table, "/a/b?x=1&y=2").as_deref(), Some("/a/*?x=1&y=2"));
}

// ============================================================================
// Path matching
// ============================================================================

#[test]
fn test_segment_count_must_match_without_multi_wildcard() {
    let log = CallLog::new();
    let table = table(vec![logged("/a/*/c", "r", &log)]);
    assert!(matched_template(&table, "/a/b/c").is_some());
    assert!(matched_template(&table, "/a/b").is_none());
    assert!(matched_template(&table, "/a/b/c/d").is_none());
    assert!(matched_template(&table, "/a/b/x").is_none());
}

#[test]
fn test_multi_wildcard_tries_every_split_point() {
    let log = CallLog::new();
    let table = table(vec![logged("/a/**/{[0-9]+}", "r", &log)]);
    assert!(matched_template(&table, "/a/b/c/1").is_some());
    assert!(matched_template(&table, "/a/1").is_some());
    assert!(matched_template(&table, "/a/b/c/d").is_none());
}

#[test]
fn test_multi_wildcard_consumes_zero_or_more_segments() {
    let log = CallLog::new();
    let table = table(vec![
        logged("/files/**/meta", "meta", &log),
        logged("/files/**", "files", &log),
    ]);
    for path in ["/files", "/files/a", "/files/a/b"] {
        assert_eq!(matched_template(&table, path).as_deref(), Some("/files/**"), "{path}");
    }
    for path in ["/files/a/b/meta", "/files/meta"] {
        assert_eq!(matched_template(&table, path).as_deref(), Some("/files/**/meta"), "{path}");
    }
}

#[test]
fn test_duplicate_multi_wildcard_is_rejected() {
    let log = CallLog::new();
    let table = table(vec![logged("/a/**/b/**", "r", &log)]);
    assert!(matches!(
        table.build(),
        Err(RouteConfigError::DuplicateMultiWildcard(_))
    ));
}

#[test]
fn test_case_insensitive_applies_to_literals_only() {
    let log = CallLog::new();
    let table = RoutingTable::builder()
        .config(RoutesConfig::new().case_insensitive(true))
        .route(logged("/Docs/{[a-z]+}", "docs", &log))
        .build();
    assert!(matched_template(&table, "/docs/intro").is_some());
    assert!(matched_template(&table, "/DOCS/intro").is_some());
    assert!(matched_template(&table, "/docs/INTRO").is_none());
}

// ============================================================================
// Template compilation
// ============================================================================

#[test]
fn test_compiling_twice_yields_identical_criteria() {
    let params = [
        ParamKind::Value {
            scalar: ScalarKind::String,
            shape: Shape::Required,
        },
        ParamKind::Value {
            scalar: ScalarKind::Int,
            shape: Shape::Required,
        },
    ];
    let symbols = SymbolTable::default();
    let template = "/r/{(.*)\\.pdf}/**/x?n={}";
    let compile = || {
        let parsed = ParsedTemplate::parse(template).unwrap();
        CompiledCriteria::compile(&parsed, &params, &symbols).unwrap()
    };
    let (a, b) = (compile(), compile());
    assert_eq!(a.all_fixed(), b.all_fixed());
    assert_eq!(a.has_pattern(), b.has_pattern());
    assert_eq!(a.has_multi_segment(), b.has_multi_segment());
    let groups = |c: &CompiledCriteria| -> Vec<usize> {
        c.path()
            .iter()
            .map(|p| p.group_count())
            .chain(c.query().iter().map(|q| q.group_count()))
            .collect()
    };
    assert_eq!(groups(&a), groups(&b));
    assert_eq!(groups(&a), [0, 1, 0, 0, 0]);
}

#[test]
fn test_malformed_templates_fail_the_build() {
    for template in ["/a?b", "/a/{x", "/a?b={x"] {
        let table = table(vec![RouteDescriptor::new(template, || async {})]);
        assert!(
            matches!(table.build(), Err(RouteConfigError::Template(_))),
            "{template}"
        );
    }
}

#[test]
fn test_unknown_symbol_fails_the_build() {
    let table = table(vec![RouteDescriptor::new("/u/:user", || async {})]);
    assert!(matches!(
        table.build(),
        Err(RouteConfigError::UnknownSymbol { ref symbol, .. }) if symbol == "user"
    ));
}

#[test]
fn test_invalid_regex_fails_the_build() {
    let table = table(vec![RouteDescriptor::new("/u/{(}", || async {})]);
    assert!(matches!(table.build(), Err(RouteConfigError::InvalidRegex { .. })));
}

#[test]
fn test_unmappable_handler_type_fails_the_build() {
    let table = table(vec![RouteDescriptor::new("/c/{}", |_c: char| async {})]);
    assert!(matches!(table.build(), Err(RouteConfigError::UnmappableType { .. })));
}

// ============================================================================
// Symbols
// ============================================================================

#[tokio::test]
async fn test_symbols_resolve_to_their_patterns() {
    let table = RoutingTable::builder()
        .define_symbol("slug", "[a-z][a-z0-9-]*")
        .unwrap()
        .define_symbol_for::<i64>("id")
        .unwrap()
        .route(RouteDescriptor::new("/posts/:slug/:id", |slug: String, id: i64| async move {
            format!("{slug}#{id}")
        }))
        .build();
    let engine = Engine::new(table);
    assert_eq!(body_of(&engine, "/posts/hello-world/7").await.as_deref(), Some("hello-world#7"));
    assert_eq!(body_of(&engine, "/posts/Hello/7").await, None);
    assert_eq!(body_of(&engine, "/posts/hello/x").await, None);
}

#[test]
fn test_invalid_symbol_pattern_is_rejected() {
    assert!(RoutingTable::builder().define_symbol("bad", "(").is_err());
}

// ============================================================================
// Gates
// ============================================================================

#[test]
fn test_method_and_media_type_gate_the_match() {
    use switchyard::{Method, MethodSet};

    let log = CallLog::new();
    let table = table(vec![
        logged("/upload", "json", &log)
            .methods(MethodSet::POST | MethodSet::PUT)
            .accept("application/(json|.*\\+json)"),
    ]);
    let find = |request: Request| table.find(&request).unwrap().is_some();

    assert!(find(Request::new(Method::Post, "/upload").with_media_type("application/json")));
    assert!(find(Request::new(Method::Put, "/upload").with_media_type("application/ld+json")));
    assert!(!find(Request::new(Method::Get, "/upload").with_media_type("application/json")));
    assert!(!find(Request::new(Method::Post, "/upload").with_media_type("text/plain")));
}

#[tokio::test]
async fn test_root_path_scopes_every_route() {
    let log = CallLog::new();
    let table = RoutingTable::builder()
        .config(RoutesConfig::new().root_path("/api/v1/"))
        .route(logged("/users", "users", &log))
        .build();
    let engine = Engine::new(table);
    assert_eq!(body_of(&engine, "/api/v1/users").await.as_deref(), Some("users"));
    assert_eq!(body_of(&engine, "/users").await, None);
    assert_eq!(body_of(&engine, "/api/v2/users").await, None);
}
