use mapchat_ai_adapters::{Content, GeminiClient, GeminiError, GenerateContentRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response and hand back the raw request text.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let raw_request = read_request(&mut socket).await;

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

        raw_request
    });

    (format!("http://{}/v1beta", addr), server)
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

fn request() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user_text("Where is the Eiffel Tower?")],
        system_instruction: None,
        tools: vec![],
    }
}

#[tokio::test]
async fn returns_function_calls_from_local_server() {
    let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"functionCall":{"name":"geocode","args":{"query":"Eiffel Tower"}}}]},"finishReason":"STOP"}]}"#;
    let (base_url, server) = serve_once("200 OK", body).await;

    let client = GeminiClient::new(reqwest::Client::new(), base_url, "gemini-test", "secret-key");
    let response = client
        .generate_content(&request())
        .await
        .expect("generate succeeds");

    let calls = response
        .first_content()
        .map(|c| c.function_calls())
        .unwrap_or_default();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args["query"], "Eiffel Tower");

    let raw_request = server.await.expect("server task completes");
    assert!(raw_request.starts_with("POST /v1beta/models/gemini-test:generateContent"));
    assert!(raw_request.to_lowercase().contains("x-goog-api-key: secret-key"));
}

#[tokio::test]
async fn unauthorized_response_is_auth_error() {
    let body = r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#;
    let (base_url, server) = serve_once("403 Forbidden", body).await;

    let client = GeminiClient::new(reqwest::Client::new(), base_url, "gemini-test", "bad-key");
    let err = client.generate_content(&request()).await.unwrap_err();

    assert!(err.is_auth());
    server.await.expect("server task completes");
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (base_url, server) = serve_once("200 OK", "{not json").await;

    let client = GeminiClient::new(reqwest::Client::new(), base_url, "gemini-test", "key");
    let err = client.generate_content(&request()).await.unwrap_err();

    assert!(matches!(err, GeminiError::Decode(_)));
    server.await.expect("server task completes");
}
