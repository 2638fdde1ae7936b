//! The demo `Echo` interface served by `minidubbo provider`.

use minidubbo_client::remote_interface;
use minidubbo_server::{ServiceError, ServiceTable};
use std::sync::Arc;

/// Interface name the demo provider registers under
pub const ECHO_INTERFACE: &str = "Echo";

/// Implementation behind the `Echo` interface.
#[derive(Debug, Default)]
pub struct Echo;

impl Echo {
    pub fn say(&self, message: String) -> Result<String, ServiceError> {
        Ok(message)
    }

    pub fn upper(&self, message: String) -> Result<String, ServiceError> {
        Ok(message.to_uppercase())
    }

    pub fn concat(&self, left: String, right: String) -> Result<String, ServiceError> {
        Ok(left + &right)
    }

    /// Always fails with `reason`; handy for exercising remote failures.
    pub fn fail(&self, reason: String) -> Result<String, ServiceError> {
        Err(ServiceError::failed(reason))
    }
}

/// Service table exposing [`Echo`] as the `Echo` interface.
pub fn echo_service_table() -> minidubbo_server::Result<ServiceTable> {
    let echo = Arc::new(Echo);
    let (say, upper, concat, fail) = (echo.clone(), echo.clone(), echo.clone(), echo);

    ServiceTable::builder()
        .service(ECHO_INTERFACE, move |svc| {
            svc.method("say", move |(message,): (String,)| say.say(message))
                .method("upper", move |(message,): (String,)| upper.upper(message))
                .method("concat", move |(left, right): (String, String)| concat.concat(left, right))
                .method("fail", move |(reason,): (String,)| fail.fail(reason))
        })
        .build()
}

remote_interface! {
    /// Typed client for the demo `Echo` interface.
    pub struct EchoClient as "Echo" {
        fn say(message: String) -> String;
        fn upper(message: String) -> String;
        fn concat(left: String, right: String) -> String;
        fn fail(reason: String) -> String;
    }
}
