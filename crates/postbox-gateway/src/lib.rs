//! Message relay between the HTTP front end and the ingestion server.
//!
//! The front end pushes each form submission over a short-lived TCP
//! connection using the flat `key=value&key=value` wire format. The
//! ingestion server accepts those connections one at a time, stamps each
//! message with the local time and hands it to a `RecordSink`.

pub mod ingest;
pub mod protocol;
pub mod relay;
