// SPDX-License-Identifier: GPL-3.0-only

//! Unix-socket transport
//!
//! One JSON request per line, one JSON response per line, one thread per
//! connection. The transport does no volume logic of its own: it decodes
//! a [`Request`], converts the options map at the boundary, and lets the
//! driver's mutex serialize the actual work.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::driver::Driver;
use crate::error::Result;
use crate::protocol::{CreateOptions, Request, Response};

pub struct Server {
    driver: Arc<Driver>,
    socket: PathBuf,
}

impl Server {
    pub fn new(driver: Driver, socket: impl Into<PathBuf>) -> Self {
        Self {
            driver: Arc::new(driver),
            socket: socket.into(),
        }
    }

    /// Bind the socket and serve until the process is stopped.
    pub fn serve(&self) -> Result<()> {
        if self.socket.exists() {
            // a stale socket from a previous run would fail the bind
            std::fs::remove_file(&self.socket)?;
        }
        if let Some(parent) = self.socket.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket)?;
        tracing::info!(socket = %self.socket.display(), "listening on unix socket");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let driver = Arc::clone(&self.driver);
                    std::thread::spawn(move || {
                        if let Err(error) = handle_connection(stream, &driver) {
                            tracing::warn!(%error, "connection handling failed");
                        }
                    });
                }
                Err(error) => tracing::warn!(%error, "failed to accept connection"),
            }
        }

        Ok(())
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }
}

fn handle_connection(stream: UnixStream, driver: &Driver) -> std::io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(driver, request),
            Err(error) => Response::error(format!("malformed request: {error}")),
        };

        let mut payload = serde_json::to_string(&response)
            .unwrap_or_else(|error| format!(r#"{{"err":"encode failure: {error}"}}"#));
        payload.push('\n');
        writer.write_all(payload.as_bytes())?;
    }

    Ok(())
}

/// Map one request onto the driver; every failure becomes an error
/// response with the full cause chain in its message.
pub fn dispatch(driver: &Driver, request: Request) -> Response {
    match request {
        Request::Create { name, options } => {
            let options = CreateOptions::from_map(&options);
            match driver.create(&name, &options) {
                Ok(()) => Response::ok(),
                Err(error) => Response::error(error),
            }
        }
        Request::Get { name } => match driver.get(&name) {
            Ok(volume) => Response {
                volume: Some(volume),
                ..Default::default()
            },
            Err(error) => Response::error(error),
        },
        Request::List => match driver.list() {
            Ok(volumes) => Response {
                volumes: Some(volumes),
                ..Default::default()
            },
            Err(error) => Response::error(error),
        },
        Request::Remove { name } => match driver.remove(&name) {
            Ok(()) => Response::ok(),
            Err(error) => Response::error(error),
        },
        Request::Path { name } => match driver.path(&name) {
            Ok(mountpoint) => Response {
                mountpoint: Some(mountpoint),
                ..Default::default()
            },
            Err(error) => Response::error(error),
        },
        Request::Mount { name, id: _ } => match driver.mount(&name) {
            Ok(mountpoint) => Response {
                mountpoint: Some(mountpoint.to_string_lossy().into_owned()),
                ..Default::default()
            },
            Err(error) => Response::error(error),
        },
        Request::Unmount { name, id: _ } => match driver.unmount(&name) {
            Ok(()) => Response::ok(),
            Err(error) => Response::error(error),
        },
        Request::Capabilities => Response {
            capabilities: Some(driver.capabilities()),
            ..Default::default()
        },
    }
}
