use axum::extract::FromRequestParts;
use cobalto_table::routes::{RouteAction, Routes, fill_path, with_query};
use cobalto_table::TableRequest;
use serde_json::{Map, Value, json};

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("Expected object"),
    }
}

#[test]
fn test_fill_path_replaces_parameters() {
    let values = row(json!({"id": 7, "slug": "hello world/2"}));
    assert_eq!(fill_path("/users/:id/edit", &values), "/users/7/edit");
    assert_eq!(fill_path("/posts/:slug", &values), "/posts/hello%20world%2F2");
}

#[test]
fn test_fill_path_keeps_unknown_parameters() {
    let values = row(json!({"id": 7}));
    assert_eq!(fill_path("/teams/:team/users/:id", &values), "/teams/:team/users/7");
}

#[test]
fn test_with_query() {
    let params = vec![
        ("search".to_string(), "a b&c".to_string()),
        ("page".to_string(), "2".to_string()),
    ];
    assert_eq!(with_query("/users", &params).unwrap(), "/users?search=a+b%26c&page=2");
    assert_eq!(with_query("/users?x=1", &params[1..]).unwrap(), "/users?x=1&page=2");
    assert_eq!(with_query("/users", &[]).unwrap(), "/users");
}

#[test]
fn test_routes_bindings() {
    let routes = Routes::new()
        .bind(RouteAction::Index, "/users")
        .bind(RouteAction::Create, "/users/create");
    assert_eq!(routes.index(), Some("/users"));
    assert_eq!(routes.get(RouteAction::Create), Some("/users/create"));
    assert!(!routes.has_row_actions());

    let routes = routes.bind(RouteAction::Destroy, "/users/:id");
    assert!(routes.has_row_actions());

    let values = row(json!({"id": 3, "name": "Bob"}));
    assert_eq!(
        routes.url_for_row(RouteAction::Destroy, &values),
        Some("/users/3".to_string())
    );
    assert_eq!(routes.url_for_row(RouteAction::Show, &values), None);
}

#[test]
fn test_route_action_names() {
    assert_eq!(RouteAction::Index.as_str(), "index");
    assert_eq!(RouteAction::Show.as_str(), "show");
    assert!(RouteAction::Edit.is_row_action());
    assert!(!RouteAction::Create.is_row_action());
}

#[test]
fn test_request_from_query() {
    let request = TableRequest::from_query("?rows=5&search=al%20ice&sort_by=name");
    assert_eq!(request.get("rows"), Some("5"));
    assert_eq!(request.get("search"), Some("al ice"));
    assert_eq!(request.get("sort_by"), Some("name"));
    assert_eq!(request.get("page"), None);
    assert_eq!(request.params().len(), 3);
}

#[test]
fn test_request_from_uri_and_builder() {
    let request = TableRequest::from_uri("/users?page=3");
    assert_eq!(request.get("page"), Some("3"));
    assert!(TableRequest::from_uri("/users").params().is_empty());

    let built = TableRequest::new().with("rows", 10).with("sort_dir", "desc");
    assert_eq!(built.get("rows"), Some("10"));
    assert_eq!(
        built,
        [("rows", "10"), ("sort_dir", "desc")]
            .into_iter()
            .collect::<TableRequest>()
    );
}

#[tokio::test]
async fn test_request_extractor_reads_query() {
    let (mut parts, _) = axum::http::Request::builder()
        .uri("/users?rows=15&sort_dir=desc")
        .body(())
        .unwrap()
        .into_parts();

    let request = TableRequest::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(request.get("rows"), Some("15"));
    assert_eq!(request.get("sort_dir"), Some("desc"));
}

#[tokio::test]
async fn test_request_extractor_without_query() {
    let (mut parts, _) = axum::http::Request::builder()
        .uri("/users")
        .body(())
        .unwrap()
        .into_parts();

    let request = TableRequest::from_request_parts(&mut parts, &()).await.unwrap();
    assert!(request.params().is_empty());
}
