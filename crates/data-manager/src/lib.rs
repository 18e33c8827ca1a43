//! Data Manager crate for Viz House
//! Fetches newline-delimited JSON query results over HTTP, decodes them
//! incrementally, and turns the flat records into chart-ready series.

pub mod coerce;
pub mod fetcher;
pub mod line_decoder;
pub mod ndjson_stream;
pub mod transform;

pub use fetcher::{QuerySource, RemoteFetcher, ENDPOINT_VERSION_HEADER};
pub use line_decoder::LineDecoder;
pub use ndjson_stream::{collect_records, NdjsonStream};
pub use transform::{pie_values, transform_query_results};
