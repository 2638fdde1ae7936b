pub mod address;
pub mod error;
pub mod requests;
pub mod responses;


pub use address::Address;
pub use error::{MinidubboError, Result};
pub use requests::{Request, RequestId, TypeDescriptor};
pub use responses::{RemoteError, RemoteErrorKind, Response};
