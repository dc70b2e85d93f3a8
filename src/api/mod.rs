pub mod client;
pub mod mock;
pub mod transport;

pub use client::{
    ApiClient, DataSource, JobStatus, QueryFile, Session, TranslatedModel, TranslationJob,
};
pub use mock::{MockTransport, RecordedRequest};
pub use transport::{api_url, ApiTransport, AuthScheme, HttpTransport};
