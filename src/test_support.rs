// test_support.rs - Local release host for installer tests
// Purpose: Minimal HTTP/1.1 server answering the release API and artifact downloads

use reqwest::Client;
use std::io::{Cursor, Write};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::tools::Tool;

pub const TAG: &str = "v1.0.0";

/// How artifact downloads are answered
#[derive(Clone, Copy)]
pub enum Artifacts {
    Missing,
    Corrupt,
    Release(&'static str),
}

/// Release zip holding the tool binary plus the bundled README/LICENSE
pub fn release_zip(tool: Tool, exe_body: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in [
        (tool.executable_name(), exe_body),
        ("README.md".to_string(), "# readme"),
        ("LICENSE.md".to_string(), "MIT"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Route `/repos/<owner>/<tool>/releases/latest` and `/<owner>/<tool>/releases/download/...`
fn respond(path: &str, artifacts: Artifacts) -> (u16, Vec<u8>) {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        ["repos", _, _, "releases", "latest"] => {
            (200, format!(r#"{{"tag_name":"{}"}}"#, TAG).into_bytes())
        }
        [_, name, "releases", "download", ..] => match (artifacts, Tool::from_name(name)) {
            (Artifacts::Missing, _) | (_, None) => (404, b"Not Found".to_vec()),
            (Artifacts::Corrupt, Some(_)) => (200, b"not a zip archive".to_vec()),
            (Artifacts::Release(body), Some(tool)) => (200, release_zip(tool, body)),
        },
        _ => (404, b"Not Found".to_vec()),
    }
}

/// Start the server on an ephemeral port and return its base URL
pub async fn serve(artifacts: Artifacts) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = respond(&path, artifacts);
                let reason = if status == 200 { "OK" } else { "Not Found" };
                let header = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    reason,
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    base
}

/// Config whose release endpoints point at a local server
pub fn config_for(home: &std::path::Path, base: &str) -> Config {
    let mut config = Config::from_home(home);
    config.api_base = base.to_string();
    config.download_base = base.to_string();
    config
}

/// Client that never routes loopback traffic through an environment proxy
pub fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}
