//! End-to-end tests against a live listener.

use axum::response::{IntoResponse, Response};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use route_mux::config::{RouteConfig, RouterConfig};
use route_mux::http::HttpServer;
use route_mux::routing::{Ctx, Dispatcher, HandlerError};

mod common;

async fn echo_args(ctx: Ctx) -> Result<Response, HandlerError> {
    let mut pairs: Vec<_> = ctx.args.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    Ok(pairs.join("&").into_response())
}

fn text(body: &'static str) -> impl Fn(Ctx) -> std::future::Ready<Result<Response, HandlerError>> {
    move |_ctx| std::future::ready(Ok(body.into_response()))
}

#[tokio::test]
async fn test_facets_over_http() {
    let dispatcher = Arc::new(Dispatcher::new());

    let mut article = dispatcher.route();
    article.get().path(["article", r"{id:^\d+$}"]).unwrap().ext(["", "html"]).unwrap();
    article.commit(echo_args);

    let mut search = dispatcher.route();
    search
        .path(["search"])
        .unwrap()
        .query(["q", r"{q:^\w+$}", "page", r"{page:^\d+$}"])
        .unwrap();
    search.commit(echo_args);

    let mut accept = dispatcher.route();
    accept
        .path(["negotiate"])
        .unwrap()
        .header(["Accept", "{html}", "Accept", r"{\*/\*}"])
        .unwrap();
    accept.commit(text("negotiated"));

    let mut local = dispatcher.route();
    local
        .path(["local"])
        .unwrap()
        .host([r"{h:^127\.0\.0\.1(:\d+)?$}"])
        .unwrap();
    local.commit(text("local"));

    let server = common::spawn_server(HttpServer::with_dispatcher(
        &RouterConfig::default(),
        dispatcher,
    ))
    .await;
    let client = common::client();

    let get = |path: &str| client.get(server.url(path)).send();

    let res = get("/article/42.html").await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "id=42");

    assert_eq!(get("/article/42").await.unwrap().status(), 200);
    assert_eq!(get("/article/42.pdf").await.unwrap().status(), 404);
    assert_eq!(get("/article/abc").await.unwrap().status(), 404);
    let res = client.post(server.url("/article/42")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = get("/search?q=rust&page=2").await.unwrap();
    assert_eq!(res.text().await.unwrap(), "page=2&q=rust");
    assert_eq!(get("/search?q=rust").await.unwrap().status(), 404);
    assert_eq!(get("/search?q=rust&page=two").await.unwrap().status(), 404);

    for accept in ["*/*", "text/html;text/css"] {
        let res = client
            .get(server.url("/negotiate"))
            .header("Accept", accept)
            .send()
            .await
            .unwrap();
        assert_eq!(res.text().await.unwrap(), "negotiated", "accept {accept}");
    }
    let res = client
        .get(server.url("/negotiate"))
        .header("Accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    assert_eq!(get("/local").await.unwrap().text().await.unwrap(), "local");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_handler_error_is_isolated() {
    let errors = Arc::new(AtomicUsize::new(0));
    let counter = errors.clone();
    let dispatcher = Dispatcher::new().with_error_handler(move |_err| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut fail = dispatcher.route();
    fail.path(["fail"]).unwrap();
    fail.commit(|_ctx: Ctx| async move { Err::<Response, _>(HandlerError::msg("broken")) });

    let mut ok = dispatcher.route();
    ok.path(["ok"]).unwrap();
    ok.commit(text("fine"));

    let server = common::spawn_server(HttpServer::with_dispatcher(
        &RouterConfig::default(),
        Arc::new(dispatcher),
    ))
    .await;
    let client = common::client();

    let (failed, fine) = tokio::join!(
        client.get(server.url("/fail")).send(),
        client.get(server.url("/ok")).send(),
    );
    assert_eq!(failed.unwrap().status(), 500);
    assert_eq!(fine.unwrap().text().await.unwrap(), "fine");
    assert_eq!(errors.load(Ordering::SeqCst), 1);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_hot_reload_swaps_routes() {
    let mut v1 = RouteConfig {
        name: "v1".into(),
        path: vec!["version".into()],
        ..Default::default()
    };
    v1.response.body = "one".into();

    let config = RouterConfig {
        routes: vec![v1.clone()],
        ..Default::default()
    };
    let server = common::spawn_server(HttpServer::new(config).unwrap()).await;
    let client = common::client();

    let body = client.get(server.url("/version")).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, "one");

    // A config that fails to compile leaves the current routes in place.
    let broken = RouteConfig {
        name: "broken".into(),
        path: vec!["{(}".into()],
        ..Default::default()
    };
    server
        .config_updates
        .send(RouterConfig {
            routes: vec![broken],
            ..Default::default()
        })
        .unwrap();

    let mut v2 = v1.clone();
    v2.name = "v2".into();
    v2.response.body = "two".into();
    server
        .config_updates
        .send(RouterConfig {
            routes: vec![v2],
            ..Default::default()
        })
        .unwrap();

    let mut body = String::new();
    for _ in 0..50 {
        body = client.get(server.url("/version")).send().await.unwrap().text().await.unwrap();
        if body == "two" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(body, "two");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let server = common::spawn_server(HttpServer::new(RouterConfig::default()).unwrap()).await;
    let client = common::client();
    assert_eq!(client.get(server.url("/")).send().await.unwrap().status(), 404);

    server.shutdown.trigger();

    let mut refused = false;
    for _ in 0..50 {
        if client.get(server.url("/")).send().await.is_err() {
            refused = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(refused, "server still accepting after shutdown");
}
