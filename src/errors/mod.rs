pub mod proxy_error;

pub use proxy_error::{Dependency, ProxyError, ProxyResult};
