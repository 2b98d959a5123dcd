//! Wire decoding for the newline-delimited `data: `-prefixed stream framing.

use std::collections::VecDeque;

use futures::Stream;
use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::chunk::StreamChunk;
use crate::errors::TransportError;
use crate::transport::ByteStream;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Byte-buffered line splitter.
///
/// Bytes are buffered until a full line is available, so a multi-byte UTF-8
/// character straddling two reads stays intact; the buffer must live for the
/// whole attempt and is never reset mid-stream.
#[derive(Default)]
pub(crate) struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    /// Consumes one read's worth of bytes and returns the bodies of all
    /// complete `data:` lines it completed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut records = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=idx).collect();
            if let Some(record) = parse_data_line(&line[..line.len() - 1]) {
                records.push(record);
            }
        }
        records
    }
}

fn parse_data_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_end_matches('\r');
    let rest = line.strip_prefix(DATA_PREFIX)?;
    Some(rest.trim_start().to_string())
}

/// Turns an open byte stream into a lazy, single-pass sequence of
/// [`StreamChunk`] records.
///
/// Ends at the `[DONE]` sentinel or natural stream closure, whichever comes
/// first. Lines that fail to parse are skipped silently (they may be records
/// split across reads); only transport read failures are surfaced.
pub(crate) fn chunk_stream(
    bytes: ByteStream,
) -> impl Stream<Item = Result<StreamChunk, TransportError>> + Send {
    struct State {
        bytes: ByteStream,
        decoder: LineDecoder,
        pending: VecDeque<StreamChunk>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes,
            decoder: LineDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(chunk) = state.pending.pop_front() {
                    return Ok(Some((chunk, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes.next().await {
                    Some(Ok(data)) => {
                        for record in state.decoder.push_chunk(&data) {
                            if record.trim() == DONE_SENTINEL {
                                state.done = true;
                                break;
                            }
                            match serde_json::from_str::<StreamChunk>(&record) {
                                Ok(chunk) => state.pending.push_back(chunk),
                                Err(err) => {
                                    debug!(%err, "skipping unparseable stream record");
                                }
                            }
                        }
                    }
                    Some(Err(err)) => return Err(err),
                    None => state.done = true,
                }
            }
        },
    )
}
