mod client;
mod dispatcher;
mod mock;

pub use client::{BackendClient, Classifier, DetectError};
pub use dispatcher::Dispatcher;
pub use mock::{synthetic_detection, vocabulary, LETTER_VOCABULARY, WORD_VOCABULARY};
