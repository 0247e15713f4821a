//! Shared helpers for integration tests

use ledgerflow::ledger::{Entry, Page, PageInfo};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Build an entry with a derived id
#[allow(dead_code)]
pub fn entry(offset: u64, idx: usize, account: &str, amount: i64) -> Entry {
    Entry {
        id: format!("ln_{}_{}", offset, idx),
        amount,
        account_id: account.to_string(),
    }
}

#[allow(dead_code)]
pub fn page(offset: u64, data: Vec<Entry>, has_more: bool) -> Page {
    Page {
        data,
        page: PageInfo { offset, has_more },
    }
}

/// Read `offset=` from a request path such as `/data/lines?page_size=1&offset=4`
#[allow(dead_code)]
pub fn query_param<'a>(path: &'a str, name: &str) -> Option<&'a str> {
    let query = path.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

/// Minimal HTTP/1.1 responder on a random local port
///
/// `handler(method, path, body)` returns the status code and JSON body.
/// Every response closes its connection.
#[allow(dead_code)]
pub async fn spawn_responder<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &str, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];

                let header_end = loop {
                    let n = stream.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(end) = find_header_end(&buf) {
                        break end;
                    }
                };

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        if key.trim().eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);

                while buf.len() < header_end + content_length {
                    let n = stream.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
                let mut request_line = head.split_whitespace();
                let method = request_line.next().unwrap_or("").to_string();
                let path = request_line.next().unwrap_or("").to_string();

                let (status, response_body) = (handler.as_ref())(&method, &path, &body);
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    response_body.len(),
                    response_body
                );

                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}
