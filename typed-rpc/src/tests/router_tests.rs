//! Router and dispatch tests
//!
//! A well-formed path reaches exactly one procedure; malformed or unknown
//! paths fail before any middleware or handler runs.

use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::support::{GetAll, Recorder, context, user_app};
use crate::{
    AppRouter, Endpoint, EndpointPath, HttpMethod, NoInput, Router, RouterOutput, RpcErrorCode,
    procedure,
};

/// An app with `names.len()` procedures under one router; each answers with its own name.
fn named_app(names: &[String]) -> AppRouter<Recorder> {
    let mut router = Router::new();
    for name in names {
        let answer = name.clone();
        router = router.post(
            name.clone(),
            procedure::<Recorder>()
                .input::<NoInput>()
                .resolve(move |ctx, _input| {
                    let answer = answer.clone();
                    async move {
                        ctx.handler_calls.fetch_add(1, Ordering::SeqCst);
                        Ok(RouterOutput::ok(answer))
                    }
                }),
        );
    }
    AppRouter::new().router("r", router)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// `r.p` invokes exactly the procedure registered as `p`
    #[test]
    fn prop_dispatch_reaches_named_procedure(
        names in prop::collection::hash_set("[a-z][a-zA-Z0-9]{0,8}", 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let target = pick.get(&names).clone();
        let app = named_app(&names);
        let recorder = Arc::new(Recorder::default());

        let output = runtime()
            .block_on(app.dispatch(context(&recorder), &format!("r.{}", target), HttpMethod::Post, json!({})))
            .expect("dispatch should succeed");

        prop_assert_eq!(output.data, Some(json!(target)));
        prop_assert_eq!(recorder.handler_calls(), 1);
    }

    /// Every listed endpoint is reachable, whatever names were registered
    #[test]
    fn prop_listed_endpoints_dispatch(names in prop::collection::hash_set("[a-z./ -]{0,5}", 1..6)) {
        let names: Vec<String> = names.into_iter().collect();
        let app = named_app(&names);

        for path in app.endpoints() {
            let recorder = Arc::new(Recorder::default());
            let output = runtime()
                .block_on(app.dispatch(context(&recorder), &path, HttpMethod::Post, json!({})));
            prop_assert!(output.is_ok(), "{} is listed but does not dispatch", path);
            prop_assert_eq!(recorder.handler_calls(), 1);
        }
    }

    /// Dotted and slashed forms of a path are the same endpoint
    #[test]
    fn prop_path_forms_normalise(segments in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 2..5)) {
        let dotted = EndpointPath::parse(&segments.join(".")).unwrap();
        let slashed = EndpointPath::parse(&segments.join("/")).unwrap();
        prop_assert_eq!(&dotted, &slashed);
        prop_assert_eq!(dotted.dotted(), segments.join("."));
        prop_assert_eq!(dotted.slashed(), segments.join("/"));
    }

    /// An unknown router segment is a bad endpoint and runs nothing
    #[test]
    fn prop_missing_intermediate_is_bad_endpoint(router in "[a-z]{1,8}", name in "[a-z]{1,8}") {
        prop_assume!(router != "user");
        let recorder = Arc::new(Recorder::default());
        let error = runtime()
            .block_on(user_app().dispatch(context(&recorder), &format!("{}/{}", router, name), HttpMethod::Get, json!({})))
            .expect_err("unknown router must fail");

        prop_assert_eq!(error.code, RpcErrorCode::BadEndpoint);
        prop_assert_eq!(error.status(), 400);
        prop_assert_eq!(recorder.handler_calls(), 0);
    }
}

#[tokio::test]
async fn test_get_all_scenario() {
    let recorder = Arc::new(Recorder::default());
    let output = user_app()
        .dispatch(context(&recorder), "user/getAll", HttpMethod::Get, json!({}))
        .await
        .unwrap();

    assert_eq!(output.status, 200);
    assert_eq!(output.data, Some(json!({ "id": "123", "name": "hanna" })));
    assert_eq!(output.message.as_deref(), Some("OK"));
}

#[tokio::test]
async fn test_missing_final_segment_is_not_found() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user.missing", HttpMethod::Get, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::EndpointNotFound);
    assert_eq!(error.status(), 404);
    assert_eq!(error.message, "Endpoint not found.");
    assert_eq!(recorder.handler_calls(), 0);
}

#[tokio::test]
async fn test_single_segment_is_bad_endpoint() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user", HttpMethod::Get, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::BadEndpoint);
    assert_eq!(error.message, "Bad endpoint request.");
}

#[tokio::test]
async fn test_router_as_final_segment_is_not_found() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user.admin", HttpMethod::Get, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::EndpointNotFound);
}

#[tokio::test]
async fn test_procedure_as_intermediate_is_bad_endpoint() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user.getAll.more", HttpMethod::Get, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::BadEndpoint);
    assert_eq!(recorder.handler_calls(), 0);
}

#[tokio::test]
async fn test_nested_router_dispatch() {
    let recorder = Arc::new(Recorder::default());
    let output = user_app()
        .dispatch(context(&recorder), "user/admin/list", HttpMethod::Get, json!(null))
        .await
        .unwrap();

    assert_eq!(output.data, Some(json!(["root"])));
}

#[tokio::test]
async fn test_method_mismatch_is_not_found() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user.getAll", HttpMethod::Post, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::EndpointNotFound);
    assert_eq!(recorder.handler_calls(), 0);
}

#[tokio::test]
async fn test_resolution_is_case_sensitive() {
    let recorder = Arc::new(Recorder::default());
    let error = user_app()
        .dispatch(context(&recorder), "user.getall", HttpMethod::Get, json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.code, RpcErrorCode::EndpointNotFound);
}

#[test]
fn test_endpoints_are_flattened_and_sorted() {
    assert_eq!(
        user_app().endpoints(),
        vec!["user.admin.list", "user.fail", "user.getAll", "user.getUnique"]
    );
}

#[test]
fn test_manifest_describes_procedures() {
    let manifest = user_app().manifest();
    let get_all = manifest
        .iter()
        .find(|info| info.path == GetAll::PATH)
        .expect("getAll should be listed");

    assert_eq!(get_all.method, GetAll::METHOD);
    assert!(get_all.input.ends_with("NoInput"));
    assert!(get_all.output.as_deref().unwrap().ends_with("User"));

    let json = serde_json::to_value(get_all).unwrap();
    assert_eq!(json["method"], "get");
    assert_eq!(json["path"], "user.getAll");
}

#[test]
fn test_endpoint_registration_uses_declared_name_and_method() {
    assert_eq!(GetAll::name(), "getAll");
    assert_eq!(GetAll::url_path(), "user/getAll");

    let router = Router::<Recorder>::new().endpoint::<GetAll>(
        procedure()
            .input::<NoInput>()
            .resolve(|_ctx, _input| async move {
                Ok(RouterOutput::ok(super::support::User::new("1", "a")))
            }),
    );
    let app = AppRouter::new().router("user", router);
    let manifest = app.manifest();

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].path, "user.getAll");
    assert_eq!(manifest[0].method, HttpMethod::Get);
}

#[test]
fn test_duplicate_registration_replaces() {
    let first = procedure::<Recorder>()
        .input::<NoInput>()
        .resolve(|_ctx, _input| async move { Ok(RouterOutput::ok(1)) });
    let second = procedure::<Recorder>()
        .input::<NoInput>()
        .resolve(|_ctx, _input| async move { Ok(RouterOutput::ok(2)) });

    let router = Router::new().post("same", first).get("same", second);
    assert_eq!(router.len(), 1);

    let app = AppRouter::new().router("r", router);
    assert_eq!(app.manifest()[0].method, HttpMethod::Get);
}

#[test]
fn test_names_with_separators_are_not_registered() {
    let names: Vec<String> = ["a.b", "a/b", "", "with space", "ok"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let app = named_app(&names);

    assert_eq!(app.endpoints(), vec!["r.ok"]);
}

#[test]
fn test_invalid_router_name_is_not_registered() {
    let list = procedure::<Recorder>()
        .input::<NoInput>()
        .resolve(|_ctx, _input| async move { Ok(RouterOutput::ok(json!([]))) });
    let app = AppRouter::new()
        .router("user.admin", Router::new().get("list", list))
        .router("", Router::new());

    assert!(app.endpoints().is_empty());
}

#[tokio::test]
async fn test_dotted_name_is_unreachable_and_unlisted() {
    let app = named_app(&["a.b".to_string()]);
    let recorder = Arc::new(Recorder::default());
    let error = app
        .dispatch(context(&recorder), "r.a.b", HttpMethod::Post, json!({}))
        .await
        .unwrap_err();

    assert!(app.endpoints().is_empty());
    assert_eq!(error.code, RpcErrorCode::BadEndpoint);
    assert_eq!(recorder.handler_calls(), 0);
}
