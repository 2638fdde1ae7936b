//! The service table.
//!
//! Every exposed method is bound to a typed handler when the table is built.
//! A handler is keyed by `(interface, method, parameter types)`, where the
//! parameter types are the element type names of its argument tuple, so
//! overloads that differ only in argument types are distinct entries.
//! The table is immutable once built.

use std::collections::HashMap;
use std::sync::Arc;

use minidubbo_common::{Params, Payload, RemoteError, RemoteErrorKind, TypeDescriptor};
use minidubbo_registry::coordination::validate_interface_name;
use serde::Serialize;

use crate::error::{Result, ServerError, ServiceError};

/// Why a bound handler did not produce a result.
pub(crate) enum HandlerFailure {
    /// Arguments did not decode into the handler's parameter types
    BadArguments(String),
    /// The implementation returned an error
    Service(ServiceError),
    /// The return value could not be encoded
    Encode(String),
}

type Handler =
    Arc<dyn Fn(&[Payload]) -> std::result::Result<Payload, HandlerFailure> + Send + Sync>;

pub(crate) struct MethodEntry {
    pub(crate) parameter_types: Vec<TypeDescriptor>,
    pub(crate) handler: Handler,
}

impl MethodEntry {
    fn signature(&self, interface: &str, method: &str) -> String {
        format!("{}.{}({})", interface, method, self.parameter_types.join(", "))
    }
}

/// Interface name to bound methods, built once at startup.
///
/// # Example
///
/// ```
/// use minidubbo_server::{ServiceError, ServiceTable};
///
/// let table = ServiceTable::builder()
///     .service("Echo", |svc| {
///         svc.method("say", |(message,): (String,)| Ok::<_, ServiceError>(message))
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(table.interfaces(), vec!["Echo"]);
/// ```
pub struct ServiceTable {
    services: HashMap<String, HashMap<String, Vec<MethodEntry>>>,
}

impl ServiceTable {
    pub fn builder() -> ServiceTableBuilder {
        ServiceTableBuilder::default()
    }

    /// Registered interface names, sorted.
    pub fn interfaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.services.contains_key(interface)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Every bound signature of `interface`, sorted.
    pub fn signatures(&self, interface: &str) -> Vec<String> {
        let mut signatures: Vec<String> = self
            .services
            .get(interface)
            .into_iter()
            .flat_map(|methods| {
                methods.iter().flat_map(move |(name, entries)| {
                    entries.iter().map(move |entry| entry.signature(interface, name))
                })
            })
            .collect();
        signatures.sort();
        signatures
    }

    pub(crate) fn resolve(
        &self,
        interface: &str,
        method: &str,
        parameter_types: &[TypeDescriptor],
    ) -> std::result::Result<&MethodEntry, RemoteError> {
        let methods = self.services.get(interface).ok_or_else(|| {
            RemoteError::new(
                RemoteErrorKind::ServiceNotFound,
                format!("no service registered for interface {}", interface),
            )
        })?;

        let entries = methods.get(method).ok_or_else(|| {
            RemoteError::new(
                RemoteErrorKind::MethodNotFound,
                format!("interface {} has no method {}", interface, method),
            )
        })?;

        entries
            .iter()
            .find(|entry| entry.parameter_types == parameter_types)
            .ok_or_else(|| {
                let available: Vec<String> = entries
                    .iter()
                    .map(|entry| entry.signature(interface, method))
                    .collect();
                RemoteError::new(
                    RemoteErrorKind::MethodNotFound,
                    format!(
                        "no overload {}.{}({}); available: {}",
                        interface,
                        method,
                        parameter_types.join(", "),
                        available.join("; ")
                    ),
                )
            })
    }
}

/// Builder for [`ServiceTable`].
#[derive(Default)]
pub struct ServiceTableBuilder {
    services: Vec<(String, ServiceBuilder)>,
}

impl ServiceTableBuilder {
    /// Adds the methods configured by `configure` under `interface`.
    ///
    /// Calling this twice for the same interface merges the methods.
    pub fn service<F>(mut self, interface: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(ServiceBuilder) -> ServiceBuilder,
    {
        self.services
            .push((interface.into(), configure(ServiceBuilder::default())));
        self
    }

    /// Validates interface names and rejects duplicate signatures.
    pub fn build(self) -> Result<ServiceTable> {
        let mut services: HashMap<String, HashMap<String, Vec<MethodEntry>>> = HashMap::new();

        for (interface, builder) in self.services {
            validate_interface_name(&interface)?;
            let methods = services.entry(interface.clone()).or_default();

            for (name, entry) in builder.methods {
                let entries = methods.entry(name.clone()).or_default();
                if entries
                    .iter()
                    .any(|existing| existing.parameter_types == entry.parameter_types)
                {
                    return Err(ServerError::DuplicateMethod(entry.signature(&interface, &name)));
                }
                tracing::debug!(signature = %entry.signature(&interface, &name), "Bound method");
                entries.push(entry);
            }
        }

        Ok(ServiceTable { services })
    }
}

/// Methods of one interface.
#[derive(Default)]
pub struct ServiceBuilder {
    methods: Vec<(String, MethodEntry)>,
}

impl ServiceBuilder {
    /// Binds `name` to `handler`.
    ///
    /// The handler takes its arguments as one tuple `P`; the element types of
    /// `P` form the method's parameter signature.
    pub fn method<P, R, F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        P: Params,
        R: Serialize + 'static,
        F: Fn(P) -> std::result::Result<R, ServiceError> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |payloads: &[Payload]| {
            let params =
                P::decode(payloads).map_err(|e| HandlerFailure::BadArguments(e.to_string()))?;
            let value = handler(params).map_err(HandlerFailure::Service)?;
            Payload::encode(&value).map_err(|e| HandlerFailure::Encode(e.to_string()))
        });

        self.methods.push((
            name.into(),
            MethodEntry {
                parameter_types: P::descriptors(),
                handler,
            },
        ));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ServiceTable {
        ServiceTable::builder()
            .service("Math", |svc| {
                svc.method("add", |(a, b): (i32, i32)| Ok(a + b))
                    .method("add", |(a, b): (i64, i64)| Ok(a + b))
                    .method("negate", |(a,): (i32,)| Ok(-a))
            })
            .service("Echo", |svc| svc.method("say", |(m,): (String,)| Ok(m)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_interfaces_are_sorted() {
        let table = table();
        assert_eq!(table.interfaces(), vec!["Echo", "Math"]);
        assert_eq!(table.len(), 2);
        assert!(table.contains("Math"));
        assert!(!table.contains("Missing"));
    }

    #[test]
    fn test_overloads_resolve_by_parameter_types() {
        let table = table();
        let i64_add = table
            .resolve("Math", "add", &<(i64, i64)>::descriptors())
            .ok()
            .unwrap();
        assert_eq!(i64_add.parameter_types, vec!["i64", "i64"]);

        let payloads = (2i64, 40i64).encode().unwrap();
        let result = (i64_add.handler)(&payloads).ok().unwrap();
        assert_eq!(result.decode::<i64>().unwrap(), 42);
    }

    #[test]
    fn test_resolution_failures() {
        let table = table();

        let err = table.resolve("Nope", "add", &[]).err().unwrap();
        assert_eq!(err.kind, RemoteErrorKind::ServiceNotFound);

        let err = table.resolve("Math", "sub", &[]).err().unwrap();
        assert_eq!(err.kind, RemoteErrorKind::MethodNotFound);

        let err = table
            .resolve("Math", "add", &<(u8, u8)>::descriptors())
            .err()
            .unwrap();
        assert_eq!(err.kind, RemoteErrorKind::MethodNotFound);
        assert!(err.message.contains("Math.add(i32, i32)"));
    }

    #[test]
    fn test_signatures() {
        assert_eq!(
            table().signatures("Math"),
            vec!["Math.add(i32, i32)", "Math.add(i64, i64)", "Math.negate(i32)"]
        );
    }

    #[test]
    fn test_duplicate_signature_is_rejected() {
        let result = ServiceTable::builder()
            .service("Echo", |svc| svc.method("say", |(m,): (String,)| Ok(m)))
            .service("Echo", |svc| svc.method("say", |(m,): (String,)| Ok(m.to_uppercase())))
            .build();
        assert!(matches!(
            result,
            Err(ServerError::DuplicateMethod(sig)) if sig == "Echo.say(alloc::string::String)"
        ));
    }

    #[test]
    fn test_invalid_interface_name_is_rejected() {
        let result = ServiceTable::builder()
            .service("bad/name", |svc| svc.method("ping", |(): ()| Ok(())))
            .build();
        assert!(matches!(result, Err(ServerError::Registry(_))));
    }
}
