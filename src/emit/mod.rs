//! Result emission
//!
//! - `sink_backend` - `ResultSink` trait, payload rendering, error type
//! - `stream_sink` - Pretty JSON to stdout or any writer
//! - `file_sink` - Pretty JSON to a local file
//! - `remote_sink` - POST to the submission endpoint
//! - `emitter` - Routes one payload to every configured sink

pub mod emitter;
pub mod file_sink;
pub mod remote_sink;
pub mod sink_backend;
pub mod stream_sink;

pub use emitter::ResultEmitter;
pub use file_sink::FileSink;
pub use remote_sink::RemoteSink;
pub use sink_backend::{ResultPayload, ResultSink, SinkError};
pub use stream_sink::StreamSink;
