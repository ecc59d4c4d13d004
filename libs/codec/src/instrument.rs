//! Operation hooks around encode and decode
//!
//! [`Instrumented`] wraps any codec and reports every call to an
//! [`OperationHook`] with its elapsed time and outcome. [`TracingHook`] logs
//! through `tracing`; [`NopHook`] discards everything.

use crate::codec::{Codec, FormatId};
use crate::error::CodecResult;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vessel_types::{Container, ErrorCode, StoragePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Encode,
    Decode,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Encoded output size or decoded input size
    Success { bytes: usize },
    Failure(ErrorCode),
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Observer for codec calls
pub trait OperationHook: Send + Sync + Debug {
    fn on_operation(&self, op: Operation, format: FormatId, elapsed: Duration, outcome: Outcome);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NopHook;

impl OperationHook for NopHook {
    fn on_operation(&self, _op: Operation, _format: FormatId, _elapsed: Duration, _outcome: Outcome) {}
}

/// Logs successes at debug and failures at warn
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl OperationHook for TracingHook {
    fn on_operation(&self, op: Operation, format: FormatId, elapsed: Duration, outcome: Outcome) {
        let elapsed_us = elapsed.as_micros() as u64;
        match outcome {
            Outcome::Success { bytes } => {
                debug!(op = op.name(), format = %format, bytes, elapsed_us, "codec operation")
            }
            Outcome::Failure(code) => {
                warn!(op = op.name(), format = %format, code = code.code(), elapsed_us, "codec operation failed")
            }
        }
    }
}

/// Codec wrapper reporting every call to a hook
#[derive(Debug, Clone)]
pub struct Instrumented<C, H = TracingHook> {
    inner: C,
    hook: H,
}

impl<C: Codec> Instrumented<C, TracingHook> {
    pub fn new(inner: C) -> Self {
        Self::with_hook(inner, TracingHook)
    }
}

impl<C: Codec, H: OperationHook> Instrumented<C, H> {
    pub fn with_hook(inner: C, hook: H) -> Self {
        Self { inner, hook }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn report<T>(&self, op: Operation, started: Instant, result: &CodecResult<T>, bytes: usize) {
        let outcome = match result {
            Ok(_) => Outcome::Success { bytes },
            Err(err) => Outcome::Failure(err.code),
        };
        self.hook
            .on_operation(op, self.inner.format_id(), started.elapsed(), outcome);
    }
}

impl<C: Codec, H: OperationHook> Codec for Instrumented<C, H> {
    fn format_id(&self) -> FormatId {
        self.inner.format_id()
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        let started = Instant::now();
        let result = self.inner.encode(container);
        let bytes = result.as_ref().map_or(0, Vec::len);
        self.report(Operation::Encode, started, &result, bytes);
        result
    }

    fn decode_as<S: StoragePolicy>(&self, bytes: &[u8]) -> CodecResult<Container<S>> {
        let started = Instant::now();
        let result = self.inner.decode_as::<S>(bytes);
        self.report(Operation::Decode, started, &result, bytes.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameCodec;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Mutex<Vec<(Operation, FormatId, Outcome)>>,
    }

    impl OperationHook for Recorder {
        fn on_operation(&self, op: Operation, format: FormatId, _elapsed: Duration, outcome: Outcome) {
            self.calls.lock().push((op, format, outcome));
        }
    }

    #[test]
    fn test_hook_sees_every_call() {
        let codec = Instrumented::with_hook(FrameCodec::new(), Recorder::default());
        let container: Container = Container::new();
        container.set("k", 1i32);

        let bytes = codec.encode(&container).unwrap();
        codec.decode(&bytes).unwrap();
        codec.decode(b"not a frame").unwrap_err();

        let calls = codec.hook().calls.lock();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            (Operation::Encode, FormatId::Frame, Outcome::Success { bytes: bytes.len() })
        );
        assert_eq!(calls[1].0, Operation::Decode);
        assert!(calls[1].2.is_success());
        assert_eq!(calls[2].2, Outcome::Failure(ErrorCode::InvalidFormat));
    }

    #[test]
    fn test_wrapper_is_transparent() {
        let plain = FrameCodec::new();
        let wrapped = Instrumented::new(FrameCodec::new());
        let container: Container = Container::new();
        container.set("name", "x");
        assert_eq!(wrapped.encode(&container).unwrap(), plain.encode(&container).unwrap());
        assert_eq!(wrapped.name(), "frame");
    }
}
