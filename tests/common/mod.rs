// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use carihesap::api::{ApiClient, ApiRequest, Transport};
use carihesap::error::{ApiError, ApiResult};
use serde_json::Value;

enum Reply {
    Ok(Value),
    Fail(u16, String),
}

/// Scripted transport. Replies are queued per `"METHOD /path"`; the last
/// reply of a route keeps being served. Every request is recorded.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<String, VecDeque<Reply>>>,
    requests: RefCell<Vec<ApiRequest>>,
    pub token: Option<String>,
}

fn key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_uppercase(), path)
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: &str, path: &str, body: Value) -> Self {
        self.routes
            .borrow_mut()
            .entry(key(method, path))
            .or_default()
            .push_back(Reply::Ok(body));
        self
    }

    pub fn fail(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .borrow_mut()
            .entry(key(method, path))
            .or_default()
            .push_back(Reply::Fail(status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }

    pub fn last(&self) -> Option<ApiRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, req: ApiRequest) -> ApiResult<Value> {
        let k = key(req.method.as_str(), &req.path);
        self.requests.borrow_mut().push(req);
        let mut routes = self.routes.borrow_mut();
        let queue = routes
            .get_mut(&k)
            .ok_or_else(|| ApiError::from_body(404, r#"{"msg":"no route"}"#))?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            None
        };
        let reply = match &reply {
            Some(r) => r,
            None => queue
                .front()
                .ok_or_else(|| ApiError::from_body(404, r#"{"msg":"no route"}"#))?,
        };
        match reply {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Fail(status, body) => Err(ApiError::from_body(*status, body)),
        }
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

pub fn client(t: FakeTransport) -> ApiClient<FakeTransport> {
    ApiClient::new(t)
}

/// Sub-matches for `args`, e.g. `sub(&["invoice", "pay", "--id", "1"])`
/// returns the matches of `pay`.
pub fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["carihesap"];
    argv.extend_from_slice(args);
    let mut m = carihesap::cli::build_cli().get_matches_from(argv);
    loop {
        match m.remove_subcommand() {
            Some((_, next)) => m = next,
            None => return m,
        }
    }
}

/// Matches one level below the top command, for handlers that dispatch on
/// their own subcommand.
pub fn area_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["carihesap"];
    argv.extend_from_slice(args);
    let mut m = carihesap::cli::build_cli().get_matches_from(argv);
    m.remove_subcommand().map(|(_, sub)| sub).unwrap()
}
