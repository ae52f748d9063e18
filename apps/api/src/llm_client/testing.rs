//! In-process `LanguageModel` double for handler and workflow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{CompletionRequest, LanguageModel, LlmError};

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

pub struct ScriptedModel {
    respond: Responder,
    completion_calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
    transcript: String,
    speech: Option<Vec<u8>>,
}

impl ScriptedModel {
    pub fn new(
        respond: impl Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            completion_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            transcript: String::new(),
            speech: Some(b"ID3-synthesized".to_vec()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing(status: u16, message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| {
            Err(LlmError::Api {
                status,
                message: message.clone(),
            })
        })
    }

    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    pub fn without_speech(mut self) -> Self {
        self.speech = None;
        self
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.respond)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }

    async fn transcribe(&self, _audio: Bytes, _file_name: &str) -> Result<String, LlmError> {
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, _text: &str) -> Result<Bytes, LlmError> {
        match &self.speech {
            Some(audio) => Ok(Bytes::from(audio.clone())),
            None => Err(LlmError::Api {
                status: 500,
                message: "speech unavailable".to_string(),
            }),
        }
    }
}
