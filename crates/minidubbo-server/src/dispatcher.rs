use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use minidubbo_common::{RemoteError, RemoteErrorKind, Request, Response};

use crate::config::DispatchMode;
use crate::service::{HandlerFailure, ServiceTable};

/// Turns each decoded request into exactly one response.
///
/// Lookup failures, argument decoding failures, handler errors and handler
/// panics all become [`Response::error`] values; nothing escapes to the
/// connection.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<ServiceTable>,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(table: Arc<ServiceTable>) -> Self {
        Self {
            table,
            mode: DispatchMode::Inline,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn table(&self) -> &ServiceTable {
        &self.table
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Resolves and runs the target method on the current thread.
    pub fn dispatch(&self, request: &Request) -> Response {
        let entry = match self.table.resolve(
            &request.interface_name,
            &request.method_name,
            &request.parameter_types,
        ) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(
                    request_id = request.id,
                    signature = %request.signature(),
                    "{}",
                    error
                );
                return Response::error(request.id, error);
            }
        };

        tracing::debug!(request_id = request.id, signature = %request.signature(), "Dispatching");

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| (entry.handler)(&request.parameters)));

        let error = match outcome {
            Ok(Ok(result)) => return Response::success(request.id, result),
            Ok(Err(HandlerFailure::BadArguments(message))) => {
                RemoteError::new(RemoteErrorKind::BadRequest, message)
            }
            Ok(Err(HandlerFailure::Service(e))) => {
                RemoteError::new(RemoteErrorKind::Invocation, e.to_string())
            }
            Ok(Err(HandlerFailure::Encode(message))) => RemoteError::new(
                RemoteErrorKind::Invocation,
                format!("failed to encode result: {}", message),
            ),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    request_id = request.id,
                    signature = %request.signature(),
                    "Method panicked: {}",
                    message
                );
                RemoteError::new(RemoteErrorKind::Panicked, message)
            }
        };

        tracing::debug!(request_id = request.id, "Invocation failed: {}", error);
        Response::error(request.id, error)
    }

    /// Dispatches according to the configured [`DispatchMode`].
    pub async fn handle(&self, request: Request) -> Response {
        match self.mode {
            DispatchMode::Inline => self.dispatch(&request),
            DispatchMode::Blocking => {
                let request_id = request.id;
                let dispatcher = self.clone();
                match tokio::task::spawn_blocking(move || dispatcher.dispatch(&request)).await {
                    Ok(response) => response,
                    Err(e) => Response::error(
                        request_id,
                        RemoteError::new(
                            RemoteErrorKind::Panicked,
                            format!("worker task failed: {}", e),
                        ),
                    ),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "method panicked".to_string()
    }
}
