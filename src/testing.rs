//! In-memory doubles for the transport and the prompt.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::commands::Api;
use crate::handler::{BindOutcome, CommandError, CommandHandler};
use crate::prompt::{Prompt, PromptError};
use crate::resources::Resources;
use crate::transport::{Response, Transport, TransportError};

pub const HOST: &str = "https://gitlab.example.com";
pub const PROJECT: &str = "https://gitlab.example.com/api/v4/projects/42";

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

struct Route {
    method: &'static str,
    url: String,
    response: Result<Response, u16>,
}

/// Answers requests from a fixed routing table; unknown routes get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<Request>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &'static str, url: &str, body: Value) -> &Self {
        self.respond_with_headers(method, url, body, &[])
    }

    pub fn respond_with_headers(
        &self,
        method: &'static str,
        url: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> &Self {
        let headers: HashMap<String, String> = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.routes.borrow_mut().push(Route {
            method,
            url: url.to_string(),
            response: Ok(Response {
                status: 200,
                headers,
                body,
            }),
        });
        self
    }

    /// A GET route for one page of a paginated collection.
    pub fn respond_page(
        &self,
        url: &str,
        body: Value,
        page: u32,
        total_pages: u32,
        total: u64,
    ) -> &Self {
        let (page, total_pages, total) =
            (page.to_string(), total_pages.to_string(), total.to_string());
        self.respond_with_headers(
            "GET",
            url,
            body,
            &[
                ("x-page", &page),
                ("x-total-pages", &total_pages),
                ("x-total", &total),
            ],
        )
    }

    pub fn fail(&self, method: &'static str, url: &str, status: u16) -> &Self {
        self.routes.borrow_mut().push(Route {
            method,
            url: url.to_string(),
            response: Err(status),
        });
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    /// Requests other than GET, in order.
    pub fn mutations(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|request| request.method != "GET")
            .collect()
    }

    fn handle(
        &self,
        method: &'static str,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        self.requests.borrow_mut().push(Request {
            method,
            url: url.to_string(),
            form: form
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });

        let routes = self.routes.borrow();
        let route = routes
            .iter()
            .find(|route| route.method == method && route.url == url);
        match route.map(|route| &route.response) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(status)) => Err(TransportError::Status {
                method,
                url: url.to_string(),
                status: *status,
                message: "simulated failure".to_string(),
            }),
            None => Err(TransportError::Status {
                method,
                url: url.to_string(),
                status: 404,
                message: "no such route".to_string(),
            }),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<Response, TransportError> {
        self.handle("GET", url, &[])
    }

    fn put(&self, url: &str) -> Result<Response, TransportError> {
        self.handle("PUT", url, &[])
    }

    fn post(&self, url: &str, form: &[(&str, &str)]) -> Result<Response, TransportError> {
        self.handle("POST", url, form)
    }
}

/// Builds an [`Api`] for project 42 on top of `fake`.
pub fn api(fake: &Rc<FakeTransport>) -> Api {
    Api::new(fake.clone(), Resources::from_parts(HOST, "v4", "42"))
}

/// Replays canned answers; runs dry like end-of-input.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    questions: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            questions: Rc::default(),
        }
    }

    /// Shared log of the questions asked so far.
    pub fn questions(&self) -> Rc<RefCell<Vec<String>>> {
        self.questions.clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Result<Option<String>, PromptError> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Runs `f` against an in-memory output sink and returns what it wrote.
pub fn capture<E>(
    f: impl FnOnce(&mut dyn std::io::Write) -> Result<(), E>,
) -> (Result<(), E>, String) {
    let mut out = Vec::new();
    let result = f(&mut out);
    (result, String::from_utf8_lossy(&out).into_owned())
}

/// Binds `args` against `handler` and executes it, capturing the output.
pub fn execute(
    handler: &mut dyn CommandHandler,
    args: &[&str],
) -> (Result<(), CommandError>, String) {
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let BindOutcome::Bound(bindings) = handler.bind(&args) else {
        panic!("{args:?} did not bind for {}", handler.command());
    };
    capture(|out| handler.execute(&bindings, out))
}
