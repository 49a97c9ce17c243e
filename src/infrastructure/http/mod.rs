pub mod client;
pub mod pagination;
pub mod transport;

pub use client::ApiClient;
pub use pagination::{Paginator, MAX_PAGES};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
