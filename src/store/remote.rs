//! TCP client for a `kvsecrets-server`

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use super::ContainerStore;
use crate::config::ClientConfig;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};

struct Stream {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// Container store reached over the wire protocol
///
/// One connection, one request at a time. Every call is a blocking
/// round-trip bounded only by the socket timeouts; failures are returned
/// as-is and never retried.
pub struct RemoteStore {
    stream: Mutex<Stream>,
    server: String,
}

impl RemoteStore {
    /// Connect to the server named in `config`
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let addrs: Vec<SocketAddr> = config
            .server
            .to_socket_addrs()
            .map_err(|e| Error::Network(format!("cannot resolve {}: {}", config.server, e)))?
            .collect();

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms.max(1));
        let mut last_err = None;
        let mut connected = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    connected = Some(stream);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = connected.ok_or_else(|| {
            let reason = last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses".to_string());
            Error::Network(format!("failed to connect to {}: {}", config.server, reason))
        })?;

        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        tracing::debug!("Connected to {}", config.server);
        Ok(Self {
            stream: Mutex::new(Stream {
                reader: BufReader::new(stream.try_clone()?),
                writer: BufWriter::new(stream),
            }),
            server: config.server.clone(),
        })
    }

    /// Health check
    pub fn ping(&self) -> Result<()> {
        let response = self.request(&Command::Ping)?;
        match response.payload.as_deref() {
            Some(b"PONG") => Ok(()),
            _ => Err(Error::Protocol("unexpected PING reply".to_string())),
        }
    }

    /// Server address this store talks to
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Send a command and map non-OK statuses to errors
    fn request(&self, command: &Command) -> Result<Response> {
        let mut stream = self.stream.lock();
        write_command(&mut stream.writer, command)?;
        let response = read_response(&mut stream.reader)?;

        match response.status {
            Status::Ok => Ok(response),
            Status::NotFound => Err(Error::ContainerMissing(response.payload_text())),
            Status::Conflict => Err(Error::AlreadyExists(response.payload_text())),
            Status::Error => Err(Error::Backend(response.payload_text())),
        }
    }

    fn request_body<T: DeserializeOwned>(&self, command: &Command) -> Result<T> {
        let response = self.request(command)?;
        let payload = response
            .payload
            .ok_or_else(|| Error::Protocol("missing response body".to_string()))?;
        Ok(bincode::deserialize(&payload)?)
    }
}

impl ContainerStore for RemoteStore {
    fn list(&self, namespace: &str) -> Result<Vec<Container>> {
        self.request_body(&Command::List {
            namespace: namespace.to_string(),
        })
    }

    fn create(&self, namespace: &str, container: Container) -> Result<Container> {
        self.request_body(&Command::Create {
            namespace: namespace.to_string(),
            container,
        })
    }

    fn update(&self, namespace: &str, container: Container) -> Result<Container> {
        self.request_body(&Command::Update {
            namespace: namespace.to_string(),
            container,
        })
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.request(&Command::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
        .map(|_| ())
    }
}
