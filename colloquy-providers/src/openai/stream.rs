//! Streaming implementation for OpenAI

use crate::constants::OPENAI_PROVIDER;
use crate::error::{malformed_response, HttpError};
use crate::http::ResponseStream;
use crate::openai::parser::{OpenAIParser, DONE_MARKER};
use crate::traits::StreamEventParser;
use colloquy_core::{Error, StreamItem};
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

type SseEvents = Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<HttpError>>> + Send>>;

/// OpenAI streaming response
///
/// Decodes Server-Sent Events from the response body and yields the chunks
/// of each event's data. Ends on `data: [DONE]`, when the body closes, or
/// after the first error. Dropping it closes the connection.
pub struct OpenAIStream {
    inner: Option<SseEvents>,
    parser: OpenAIParser,
    increments: usize,
    completed: bool,
}

impl OpenAIStream {
    /// Create a new OpenAI stream over a response body
    pub fn new(body: ResponseStream) -> Self {
        Self {
            inner: Some(Box::pin(body.eventsource())),
            parser: OpenAIParser,
            increments: 0,
            completed: false,
        }
    }

    /// Number of increments yielded so far
    pub fn increments(&self) -> usize {
        self.increments
    }

    /// Whether the provider signalled the end of the stream
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            debug!(
                provider = OPENAI_PROVIDER,
                increments = self.increments,
                completed = self.completed,
                "Released chat completion stream"
            );
        }
    }

    /// Handle one event's data; `Some` means the poll has an answer
    fn next_from_event(&mut self, data: &str) -> Option<Option<StreamItem>> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }
        if data == DONE_MARKER {
            self.completed = true;
            self.release();
            return Some(None);
        }

        match self.parser.parse_event(data) {
            Ok(Some(chunks)) => {
                self.increments += 1;
                trace!(choices = chunks.len(), increment = self.increments, "Stream increment");
                Some(Some(Ok(chunks)))
            }
            Ok(None) => None,
            Err(err) => {
                self.release();
                Some(Some(Err(err)))
            }
        }
    }
}

fn stream_failure(err: EventStreamError<HttpError>) -> Error {
    match err {
        EventStreamError::Transport(err) => err.into_inference(OPENAI_PROVIDER),
        other => malformed_response(OPENAI_PROVIDER, format!("Bad event stream: {}", other)),
    }
}

impl Stream for OpenAIStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };

            let polled = inner.as_mut().poll_next(cx);
            match polled {
                Poll::Ready(Some(Ok(event))) => {
                    if let Some(answer) = this.next_from_event(&event.data) {
                        return Poll::Ready(answer);
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    this.release();
                    return Poll::Ready(Some(Err(stream_failure(err))));
                }
                Poll::Ready(None) => {
                    this.release();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for OpenAIStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use tokio_test::{assert_pending, assert_ready, task};

    fn body(chunks: Vec<&'static str>, then_hang: bool) -> ResponseStream {
        let chunks = stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, HttpError>(Bytes::from_static(c.as_bytes()))),
        );
        if then_hang {
            Box::pin(futures::StreamExt::chain(chunks, stream::pending()))
        } else {
            Box::pin(chunks)
        }
    }

    #[test]
    fn test_pending_until_a_full_event_arrives() {
        let mut stream = task::spawn(OpenAIStream::new(body(
            vec!["data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"hi\"}}]}\n"],
            true,
        )));

        assert_pending!(stream.poll_next());
        assert_eq!(stream.increments(), 0);
    }

    #[test]
    fn test_done_marker_ends_stream_and_releases() {
        let mut stream = task::spawn(OpenAIStream::new(body(
            vec![
                "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"hi\"}}]}\n\n",
                "data: [DONE]\n\n",
            ],
            true,
        )));

        let first = assert_ready!(stream.poll_next()).unwrap().unwrap();
        assert_eq!(first[0].content.as_deref(), Some("hi"));
        assert!(assert_ready!(stream.poll_next()).is_none());
        assert!(stream.is_completed());
        assert!(stream.inner.is_none());

        // Exhausted streams stay exhausted
        assert!(assert_ready!(stream.poll_next()).is_none());
    }

    #[test]
    fn test_data_split_over_lines_is_one_event() {
        let mut stream = task::spawn(OpenAIStream::new(body(
            vec![
                "data: {\"model\":\"gpt-4o\",\n",
                "data: \"choices\":[{\"index\":0,\"delta\":{\"content\":\"joined\"}}]}\n\n",
                "data: [DONE]\n\n",
            ],
            false,
        )));

        let item = assert_ready!(stream.poll_next()).unwrap().unwrap();
        assert_eq!(item[0].content.as_deref(), Some("joined"));
        assert_eq!(item[0].model_id.as_deref(), Some("gpt-4o"));
        assert!(assert_ready!(stream.poll_next()).is_none());
        assert!(stream.is_completed());
    }

    #[test]
    fn test_events_without_data_are_ignored() {
        let mut stream = task::spawn(OpenAIStream::new(body(
            vec![
                ": keep-alive\n\n",
                "event: ping\nid: 3\nretry: 1000\n\n",
                "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\n\n",
            ],
            false,
        )));

        let item = assert_ready!(stream.poll_next()).unwrap().unwrap();
        assert_eq!(item[0].content.as_deref(), Some("x"));
        assert!(assert_ready!(stream.poll_next()).is_none());
        assert!(!stream.is_completed());
    }
}
