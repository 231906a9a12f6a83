//! Line decoding for client connections.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tracing::warn;

/// Newline-delimited UTF-8 lines with a length cap.
///
/// An overlong line is discarded up to its newline and reading carries on.
/// `FramedRead` ends the stream after any decoder error, so the overflow
/// never leaves this codec. Invalid UTF-8 and I/O failures still do.
#[derive(Debug)]
pub(super) struct ClientCodec {
    inner: LinesCodec,
}

impl ClientCodec {
    pub(super) fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }
}

impl Decoder for ClientCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode(buf) {
                // The inner codec is now discarding, so the retry makes progress.
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = self.inner.max_length(), "Discarding overlong line");
                }
                other => return other,
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode_eof(buf) {
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = self.inner.max_length(), "Discarding overlong line");
                }
                other => return other,
            }
        }
    }
}
