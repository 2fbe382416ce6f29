//! Speech recognition over HTTP.
//!
//! * [`SpeechClient`]: builds the recognition request with
//!   [`RequestBuilder`](crate::request::RequestBuilder) and parses the reply.
//! * [`Transport`] / [`ReqwestTransport`]: executes finalized requests.
//! * [`RecognitionResult`]: the flat JSON response.
//! * [`encode_pcm16`]: wraps 16 kHz mono samples in a WAV container.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speech_recognizer::config::AppConfig;
//! use speech_recognizer::speech::{encode_pcm16, ReqwestTransport, SpeechClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = SpeechClient::from_config(&config.speech, ReqwestTransport::new())
//!         .expect("set AZURE_API_KEY");
//!
//!     let wav = encode_pcm16(&vec![0.0; 16_000], 16_000).unwrap();
//!     let result = client.recognize(wav).await.unwrap();
//!     println!("{}", result.display_text);
//! }
//! ```

pub mod client;
pub mod result;
pub mod transport;
pub mod wav;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{SpeechClient, SpeechError, RECOGNITION_PATH, SUBSCRIPTION_KEY_HEADER};
pub use result::RecognitionResult;
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use wav::{encode_pcm16, WavError};
