//! Async adapter feeding a byte stream through the [`LineDecoder`]

use crate::line_decoder::LineDecoder;
use futures::stream::Stream;
use futures::StreamExt;
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use viz_house_shared::{ChartsError, ChartsResult, Record};

/// Stream of decoded JSON values over a stream of byte chunks.
///
/// Chunks are pulled from the inner stream only when no decoded value is
/// waiting. The stream ends after the first error, whether it came from the
/// transport or from a malformed line.
pub struct NdjsonStream<S> {
    inner: S,
    decoder: LineDecoder,
    error: Option<ChartsError>,
    /// Inner stream is exhausted or failed; nothing more will be polled
    done: bool,
    chunks_received: usize,
    bytes_received: usize,
}

impl<S> NdjsonStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: LineDecoder::new(),
            error: None,
            done: false,
            chunks_received: 0,
            bytes_received: 0,
        }
    }

    pub fn bytes_received(&self) -> usize {
        self.bytes_received
    }

    pub fn chunks_received(&self) -> usize {
        self.chunks_received
    }
}

impl<S, B, E> Stream for NdjsonStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    type Item = ChartsResult<Value>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(value) = this.decoder.next_value() {
                return Poll::Ready(Some(Ok(value)));
            }
            if let Some(err) = this.error.take() {
                return Poll::Ready(Some(Err(err)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match futures::ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    let bytes = chunk.as_ref();
                    this.chunks_received += 1;
                    this.bytes_received += bytes.len();

                    if let Err(err) = this.decoder.feed(bytes) {
                        this.error = Some(err);
                        this.done = true;
                    }
                }
                Some(Err(err)) => {
                    this.error = Some(ChartsError::Network {
                        message: err.to_string(),
                    });
                    this.done = true;
                }
                None => {
                    if let Err(err) = this.decoder.finish() {
                        this.error = Some(err);
                    }
                    this.done = true;
                }
            }
        }
    }
}

/// Drain a decoded stream into an ordered list of records.
///
/// Every value must be a JSON object; anything else aborts collection.
pub async fn collect_records<S>(mut stream: S) -> ChartsResult<Vec<Record>>
where
    S: Stream<Item = ChartsResult<Value>> + Unpin,
{
    let mut records = Vec::new();

    while let Some(value) = stream.next().await {
        match value? {
            Value::Object(record) => records.push(record),
            other => {
                return Err(ChartsError::Decode {
                    message: format!(
                        "row {} is not a JSON object: {}",
                        records.len() + 1,
                        json_kind(&other)
                    ),
                    line: None,
                })
            }
        }
    }

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<&'static [u8], String>> + Unpin {
        stream::iter(parts.iter().copied().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_stream_yields_values_in_order() {
        let decoded: Vec<_> = NdjsonStream::new(chunks(&["{\"n\":1}\n{\"n\"", ":2}\r\n{\"n\":3}"]))
            .collect()
            .await;

        let values: Vec<Value> = decoded.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
    }

    #[tokio::test]
    async fn test_stream_stops_after_malformed_line() {
        let decoded: Vec<_> = NdjsonStream::new(chunks(&["1\nNOT_JSON\n2\n", "3\n"]))
            .collect()
            .await;

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], Ok(json!(1)));
        assert!(matches!(decoded[1], Err(ChartsError::Decode { line: Some(2), .. })));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_network_error() {
        let inner = stream::iter(vec![
            Ok::<&'static [u8], String>(b"1\n"),
            Err("connection reset".to_string()),
        ]);

        let decoded: Vec<_> = NdjsonStream::new(inner).collect().await;
        assert_eq!(decoded[0], Ok(json!(1)));
        assert_eq!(
            decoded[1],
            Err(ChartsError::Network {
                message: "connection reset".to_string()
            })
        );
        assert_eq!(decoded.len(), 2);
    }

    #[tokio::test]
    async fn test_collect_records() {
        let stream = NdjsonStream::new(chunks(&["{\"a\":1}\n\n{\"a\":2}\n"]));
        let records = collect_records(stream).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["a"], json!(2));
    }

    #[tokio::test]
    async fn test_collect_rejects_non_object_rows() {
        let stream = NdjsonStream::new(chunks(&["{\"a\":1}\n[1,2]\n"]));
        let err = collect_records(stream).await.unwrap_err();
        assert!(err.to_string().contains("row 2 is not a JSON object: array"));
    }

    #[tokio::test]
    async fn test_empty_body_collects_nothing() {
        let mut stream = NdjsonStream::new(chunks(&[]));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.chunks_received(), 0);
        assert_eq!(stream.bytes_received(), 0);
    }
}
