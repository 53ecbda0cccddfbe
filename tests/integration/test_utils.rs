//! Shared test utilities for integration tests

use docregen::generation::{GenerationClient, ResilientGenerator, ResultCache, RetryPolicy};
use docregen::provider::{ChatMessage, CompletionOptions, ScriptedProvider};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Generator over a scripted provider with a fresh cache.
pub fn generator(provider: Arc<ScriptedProvider>, retries: u32, timeout: Duration) -> Arc<ResilientGenerator> {
    Arc::new(ResilientGenerator::new(
        GenerationClient::new(provider, CompletionOptions::default()),
        Arc::new(ResultCache::new()),
        RetryPolicy::new(retries, Duration::from_secs(1)),
        timeout,
        Duration::from_secs(30),
    ))
}

/// The user message of a recorded provider call.
pub fn user_text(messages: &[ChatMessage]) -> &str {
    messages.last().map(|message| message.content.as_str()).unwrap_or("")
}

/// A solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160])));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).to_string()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Plain-text debug subscriber writing into `buffer`.
pub fn capturing_subscriber(buffer: &LogBuffer) -> impl tracing::Subscriber + Send + Sync {
    let buffer = buffer.clone();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || buffer.clone())
        .finish()
}
