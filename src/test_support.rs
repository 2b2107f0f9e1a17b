//! Shared helpers for unit tests: multipart bodies and collaborator doubles.

use crate::gemini::{GenerationError, TextGenerator};
use crate::pdf::{ExtractionError, TextExtractor};
use axum::body::Body;
use axum::http::{header, Request};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BOUNDARY: &str = "----parecer-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Treats the buffer as UTF-8 text. Buffers starting with `%BROKEN` fail.
#[derive(Default)]
pub struct StubExtractor {
    calls: AtomicUsize,
}

impl StubExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for StubExtractor {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if data.starts_with(b"%BROKEN") {
            return Err(ExtractionError::Load("not a PDF".to_string()));
        }
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

/// Records every prompt and answers with a fixed reply or a fixed failure.
pub struct StubGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(GenerationError::new)
    }
}
