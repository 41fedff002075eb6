use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

pub(crate) fn run_multi_thread_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

pub(crate) async fn recv_within<T>(rx: &mut mpsc::Receiver<T>) -> AppResult<T> {
    match tokio::time::timeout(RECV_TIMEOUT, rx.recv()).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(AppError::validation("Channel closed before a value arrived")),
        Err(_) => Err(AppError::validation("Timed out waiting for a value")),
    }
}

/// Minimal HTTP/1.1 responder: 200 `ok` unless the path carries the
/// artificial failure marker, then 404.
pub(crate) struct StubServer {
    pub(crate) url: String,
    paths: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    task: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub(crate) async fn spawn() -> AppResult<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let paths = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = std::sync::Arc::clone(&paths);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let seen = std::sync::Arc::clone(&seen);
                tokio::spawn(serve_stub_connection(stream, seen));
            }
        });
        Ok(Self {
            url: format!("http://{}/", addr),
            paths,
            task,
        })
    }

    pub(crate) fn request_targets(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_stub_connection(
    mut stream: tokio::net::TcpStream,
    seen: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => buffer.extend_from_slice(chunk.get(..read).unwrap_or_default()),
        }
        if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buffer);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    let failing = target.contains(crate::pool::FAILURE_MARKER);
    seen.lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push(target);

    let response: &[u8] = if failing {
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    } else {
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
    };
    drop(stream.write_all(response).await);
    drop(stream.shutdown().await);
}
