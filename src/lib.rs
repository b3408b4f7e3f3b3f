//! Loads Kibana's sample data set through a thin reqwest wrapper, with an
//! in-memory mock transport for deterministic tests.

pub mod adapter;
pub mod logger;
pub mod mock;
pub mod sample_data;

pub use reqwest::Method;

pub use adapter::{
    BasicAuth, Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture,
    RestRequest, RestResponse, RestResult, RestTransport,
};
pub use mock::{
    MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot,
    MockTransportState,
};
pub use sample_data::{
    LoadError, SampleDataLoader, SampleDataOutcome, SampleDataSummary, SampleDataTarget,
    load_sample_data, sample_data_request, sample_data_url,
};
