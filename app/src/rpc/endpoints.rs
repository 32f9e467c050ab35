//! Endpoint declarations shared by the routers and the client.

use typed_rpc::{Endpoint, HttpMethod, NoInput};

use super::types::*;

/// `user.getUnique`
pub struct UserGetUnique;

impl Endpoint for UserGetUnique {
    const PATH: &'static str = "user.getUnique";
    const METHOD: HttpMethod = HttpMethod::Get;
    type Input = UserGetInput;
    type Output = UserData;
}

/// `user.getAll`
pub struct UserGetAll;

impl Endpoint for UserGetAll {
    const PATH: &'static str = "user.getAll";
    const METHOD: HttpMethod = HttpMethod::Get;
    type Input = NoInput;
    type Output = UserData;
}

/// `auth.authenticate`
pub struct AuthAuthenticate;

impl Endpoint for AuthAuthenticate {
    const PATH: &'static str = "auth.authenticate";
    const METHOD: HttpMethod = HttpMethod::Post;
    type Input = AuthenticateInput;
    type Output = AuthenticateData;
}

/// `example.example`
pub struct ExampleExample;

impl Endpoint for ExampleExample {
    const PATH: &'static str = "example.example";
    const METHOD: HttpMethod = HttpMethod::Post;
    type Input = ExampleInput;
    type Output = ExampleData;
}
