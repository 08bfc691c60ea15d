use std::io::BufRead;

use crate::error::{CommitError, Result};

/// One decoded object from a newline-delimited stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: String,
    pub done: bool,
}

/// Read a streaming response line-by-line, handing each non-empty fragment to
/// `on_chunk` as soon as it is decoded. Stops at the first chunk marked done, or at
/// end of input. Returns the concatenation of every delivered fragment.
pub fn read_stream_to_string<R, P, C>(reader: R, mut parse_line: P, mut on_chunk: C) -> Result<String>
where
    R: BufRead,
    P: FnMut(&str) -> Result<StreamChunk>,
    C: FnMut(&str),
{
    let mut out = String::new();

    for line in reader.lines() {
        let line = line.map_err(|e| CommitError::Inference(format!("failed to read stream: {e}")))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let chunk = parse_line(line)?;
        if !chunk.text.is_empty() {
            out.push_str(&chunk.text);
            on_chunk(&chunk.text);
        }
        if chunk.done {
            break;
        }
    }

    Ok(out)
}
