use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum ServerMode {
    /// 200 with body and ETag, or 304 when `If-None-Match` equals the ETag.
    Serve { body: String, etag: Option<String> },
    Status(u16),
}

/// Minimal HTTP/1.1 server answering every request from a fixed mode.
pub struct MockTdsServer {
    addr: SocketAddr,
    seen_if_none_match: Arc<Mutex<Vec<Option<String>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTdsServer {
    pub async fn start(mode: ServerMode) -> std::io::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_task = Arc::clone(&seen);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((mut stream, _)) = accepted else { continue };
                        let request = read_head(&mut stream).await;
                        let if_none_match = header(&request, "if-none-match");
                        seen_task.lock().unwrap().push(if_none_match.clone());
                        let response = respond(&mode, if_none_match.as_deref());
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                }
            }
        });

        Ok(Self {
            addr,
            seen_if_none_match: seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}/tds.json", self.addr)
    }

    pub fn seen_if_none_match(&self) -> Vec<Option<String>> {
        self.seen_if_none_match.lock().unwrap().clone()
    }
}

impl Drop for MockTdsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn header(request: &str, name: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

fn respond(mode: &ServerMode, if_none_match: Option<&str>) -> String {
    match mode {
        ServerMode::Serve { body, etag } => {
            if etag.is_some() && etag.as_deref() == if_none_match {
                return "HTTP/1.1 304 Not Modified\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string();
            }
            let etag_header = etag
                .as_ref()
                .map(|e| format!("ETag: {e}\r\n"))
                .unwrap_or_default();
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                etag_header,
                body.len(),
                body
            )
        }
        ServerMode::Status(code) => format!(
            "HTTP/1.1 {code} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        ),
    }
}
