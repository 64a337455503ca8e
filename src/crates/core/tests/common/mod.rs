#![allow(dead_code)]

use async_trait::async_trait;
use mapchat_core::infrastructure::ai::{
    ChatModel, ModelReply, ToolInvocation, TranscriptEntry, TurnRequest,
};
use mapchat_core::MapChatResult;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type Responder = Box<dyn Fn(usize, &[TranscriptEntry]) -> MapChatResult<ModelReply> + Send + Sync>;

/// `ChatModel` whose replies come from a closure of (round index, transcript so far).
pub struct ScriptedModel {
    responder: Responder,
    rounds: AtomicUsize,
    transcripts: Mutex<Vec<Vec<TranscriptEntry>>>,
    system_instructions: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &[TranscriptEntry]) -> MapChatResult<ModelReply> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            rounds: AtomicUsize::new(0),
            transcripts: Mutex::new(Vec::new()),
            system_instructions: Mutex::new(Vec::new()),
        }
    }

    /// Replies in order; once exhausted, an empty text reply.
    pub fn scripted(replies: Vec<ModelReply>) -> Self {
        Self::new(move |round, _| Ok(replies.get(round).cloned().unwrap_or_default()))
    }

    pub fn rounds(&self) -> usize {
        self.rounds.load(Ordering::SeqCst)
    }

    pub fn transcripts(&self) -> Vec<Vec<TranscriptEntry>> {
        self.transcripts.lock().unwrap().clone()
    }

    pub fn system_instructions(&self) -> Vec<String> {
        self.system_instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send_turn(&self, request: TurnRequest<'_>) -> MapChatResult<ModelReply> {
        let round = self.rounds.fetch_add(1, Ordering::SeqCst);
        self.transcripts
            .lock()
            .unwrap()
            .push(request.transcript.to_vec());
        self.system_instructions
            .lock()
            .unwrap()
            .push(request.system_instruction.to_string());
        (self.responder)(round, request.transcript)
    }
}

pub fn call(name: &str, args: Value) -> ToolInvocation {
    ToolInvocation::new(name, args.as_object().cloned().unwrap_or_default())
}

pub fn calls(calls: Vec<ToolInvocation>) -> ModelReply {
    ModelReply::tool_calls(calls)
}

/// Tool responses sent back in the most recent round of `transcript`.
pub fn last_tool_results(transcript: &[TranscriptEntry]) -> Vec<Value> {
    transcript
        .iter()
        .rev()
        .find_map(|entry| match entry {
            TranscriptEntry::ToolResults(results) => {
                Some(results.iter().map(|r| r.response.clone()).collect())
            }
            _ => None,
        })
        .unwrap_or_default()
}

/// Serve canned HTTP responses, one per accepted connection, and return the raw requests.
pub async fn serve(responses: Vec<(&'static str, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status_line, body) in responses {
            let (mut socket, _) = listener.accept().await.expect("accept connection");
            requests.push(read_request(&mut socket).await);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
        }
        requests
    });

    (format!("http://{}", addr), server)
}

/// Read headers plus a `Content-Length` body so the socket is drained before replying.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}
