//! Shared helpers for integration tests.
#![allow(dead_code)]

use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use yc_to_sqlite::download::RecordSource;
use yc_to_sqlite::table::CompanyRecord;
use yc_to_sqlite::{FetchError, Stage, Ui};

// =============================================================================
// One-shot HTTP server
// =============================================================================

/// Serve a single request with the given status and body, then exit.
///
/// Returns the URL to request and the server thread.
pub fn serve_once(status: &'static str, body: impl Into<String>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().unwrap();
    let body = body.into();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        respond(stream, status, &body);
    });

    (format!("http://{}/companies/all.json", addr), handle)
}

fn respond(mut stream: TcpStream, status: &str, body: &str) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
    }

    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .unwrap();
    stream.flush().unwrap();
}

/// Accept one connection and never answer it.
///
/// The server thread holds the socket until the client gives up and closes
/// its end.
pub fn serve_hang() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
        }
    });

    format!("http://{}/companies/all.json", addr)
}

/// A URL nothing is listening on
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/companies/all.json", addr)
}

// =============================================================================
// Test doubles
// =============================================================================

/// Source that fails every call, standing in for a disabled network
pub struct OfflineSource;

impl RecordSource for OfflineSource {
    fn describe(&self) -> String {
        "offline".into()
    }

    fn fetch(&self) -> Result<Vec<CompanyRecord>, FetchError> {
        Err(FetchError::NotAnArray {
            url: "offline".into(),
        })
    }
}

/// Records every stage the pipeline reports
#[derive(Default)]
pub struct RecordingUi {
    pub stages: Vec<Stage>,
    pub logs: Vec<String>,
}

impl Ui for RecordingUi {
    fn set_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }
}

// =============================================================================
// Store helpers
// =============================================================================

/// Every row of `table` in insertion order
pub fn dump(conn: &Connection, table: &str) -> Vec<Vec<SqlValue>> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM \"{}\" ORDER BY rowid", table))
        .unwrap();
    let width = stmt.column_count();
    stmt.query_map([], |row| {
        (0..width)
            .map(|i| row.get::<_, SqlValue>(i))
            .collect::<rusqlite::Result<Vec<_>>>()
    })
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

pub fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let stmt = conn
        .prepare(&format!("SELECT * FROM \"{}\" LIMIT 0", table))
        .unwrap();
    stmt.column_names().into_iter().map(String::from).collect()
}
