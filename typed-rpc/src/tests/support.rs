//! Shared fixtures: a counting context and a small user router.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::{
    AppRouter, Context, Endpoint, HttpMethod, NoInput, RequestMeta, Router, RouterOutput,
    Validate, ValidationResult, ValidationRules, procedure,
};

/// Records what ran during a call.
#[derive(Default)]
pub struct Recorder {
    pub handler_calls: AtomicUsize,
    pub log: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }

    pub async fn entries(&self) -> Vec<String> {
        self.log.lock().await.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdInput {
    pub id: String,
}

impl Validate for IdInput {
    fn validate(&self) -> ValidationResult {
        ValidationRules::new().required("id", &self.id).build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Validate for User {
    fn validate(&self) -> ValidationResult {
        ValidationRules::new()
            .required("id", &self.id)
            .required("name", &self.name)
            .build()
    }
}

pub struct GetAll;

impl Endpoint for GetAll {
    const PATH: &'static str = "user.getAll";
    const METHOD: HttpMethod = HttpMethod::Get;
    type Input = NoInput;
    type Output = User;
}

pub struct GetUnique;

impl Endpoint for GetUnique {
    const PATH: &'static str = "user.getUnique";
    const METHOD: HttpMethod = HttpMethod::Post;
    type Input = IdInput;
    type Output = User;
}

pub fn context(recorder: &Arc<Recorder>) -> Context<Recorder> {
    Context::new(recorder.clone(), RequestMeta::default())
}

/// `user.getAll` (GET), `user.getUnique` (POST), `user.fail` (POST, status 500)
/// and `user.admin.list` (GET, nested).
pub fn user_app() -> AppRouter<Recorder> {
    let get_all = procedure::<Recorder>()
        .input::<NoInput>()
        .output::<User>()
        .resolve(|ctx, _input| async move {
            ctx.handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouterOutput::ok(User::new("123", "hanna")).with_message("OK"))
        });

    let get_unique = procedure::<Recorder>()
        .input::<IdInput>()
        .output::<User>()
        .resolve(|ctx, input| async move {
            ctx.handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouterOutput::ok(User::new(&input.id, "Billy")))
        });

    let fail = procedure::<Recorder>()
        .input::<NoInput>()
        .resolve(|ctx, _input| async move {
            ctx.handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouterOutput::<User>::error(500, "Something broke"))
        });

    let admin = Router::new().get(
        "list",
        procedure::<Recorder>()
            .input::<NoInput>()
            .resolve(|_ctx, _input| async move { Ok(RouterOutput::ok(vec!["root".to_string()])) }),
    );

    AppRouter::new().router(
        "user",
        Router::new()
            .endpoint::<GetAll>(get_all)
            .endpoint::<GetUnique>(get_unique)
            .post("fail", fail)
            .nest("admin", admin),
    )
}
