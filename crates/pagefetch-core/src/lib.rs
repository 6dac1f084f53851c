pub mod config;
pub mod logging;

pub mod charset;
pub mod error;
pub mod fetcher;
pub mod phase;
pub mod proxy;
pub mod request;
pub mod resolver;
pub mod response;

mod decompress;
mod transfer;

pub use charset::Charset;
pub use error::{ErrorKind, FetchError};
pub use fetcher::{Fetcher, FetcherBuilder};
pub use proxy::Proxy;
pub use request::FetchRequest;
pub use resolver::EncodingResolver;
pub use response::FetchResult;
