//! Endpoint-service client — authentication and file transfer.
//!
//! Implements [`AuthPort`] and [`FileTransferPort`] over a plain TCP
//! connection; TLS termination is offloaded to the modem via the CA chain
//! provisioned at boot, so the application-side socket carries the
//! already-authenticated stream.  One request per connection
//! (`Connection: close`), matching the service's HTTP/1.1 surface.
//!
//! Both operations block without timeout — an unresponsive service hangs
//! the caller; the supervisory loop accepts this for the on-demand
//! download, and the auth bootstrapper retries around it.

use std::io::{Read, Write};
use std::net::TcpStream;

use core::fmt::Write as _;
use log::{debug, info};

use crate::app::ports::{AuthPort, ByteRange, FileTransferPort};
use crate::config::CREDENTIAL_CAPACITY;
use crate::error::{AuthError, TransferError};

/// Default service address, resolvable once the PDN context is up.
pub const DEFAULT_HOST: &str = "endpoint.cell-iot.net";
pub const DEFAULT_PORT: u16 = 8443;

type Cred = heapless::String<CREDENTIAL_CAPACITY>;

pub struct EndpointClient {
    host: heapless::String<64>,
    port: u16,
    user: Cred,
    pass: Cred,
    authed: bool,
}

impl EndpointClient {
    pub fn new(host: &str, port: u16) -> Self {
        let mut h = heapless::String::new();
        let _ = h.push_str(host);
        Self {
            host: h,
            port,
            user: Cred::new(),
            pass: Cred::new(),
            authed: false,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }

    /// Open a connection and issue one GET.  Returns the body reader after
    /// validating the status line and consuming the headers.
    fn get(
        &self,
        path: &str,
        range: Option<ByteRange>,
    ) -> Result<BodyReader, RequestError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .map_err(|_| RequestError::Connect)?;

        // Sized for the fixed parts plus two full-length credentials.
        let mut request: heapless::String<1024> = heapless::String::new();
        let _ = write!(request, "GET {path} HTTP/1.1\r\nHost: {}\r\n", self.host);
        if self.authed {
            let _ = write!(
                request,
                "X-Auth-User: {}\r\nX-Auth-Pass: {}\r\n",
                self.user, self.pass
            );
        }
        if let Some(r) = range {
            let _ = write!(request, "Range: bytes={}-{}\r\n", r.start, r.end);
        }
        let _ = write!(request, "Connection: close\r\n\r\n");

        stream
            .write_all(request.as_bytes())
            .map_err(|_| RequestError::Io)?;

        read_response_head(stream)
    }
}

/// Internal request failure, mapped per-port at the call sites.
enum RequestError {
    Connect,
    Io,
    Status,
}

// ───────────────────────────────────────────────────────────────
// AuthPort
// ───────────────────────────────────────────────────────────────

impl AuthPort for EndpointClient {
    fn request_auth(&mut self, user: &mut Cred, pass: &mut Cred) -> Result<(), AuthError> {
        let mut body = self
            .get("/v1/auth", None)
            .map_err(|_| AuthError::RequestFailed)?;

        // Body: username on the first line, password on the second.
        let mut buf = [0u8; 2 * CREDENTIAL_CAPACITY + 2];
        let n = body.read_to_end_bounded(&mut buf).map_err(|_| AuthError::RequestFailed)?;
        let text = core::str::from_utf8(&buf[..n]).map_err(|_| AuthError::RequestFailed)?;

        let mut lines = text.lines();
        let (u, p) = match (lines.next(), lines.next()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AuthError::RequestFailed),
        };

        user.clear();
        user.push_str(u).map_err(|_| AuthError::CredentialOverflow)?;
        pass.clear();
        pass.push_str(p).map_err(|_| AuthError::CredentialOverflow)?;
        debug!("endpoint: credentials received for '{u}'");
        Ok(())
    }

    fn set_auth_info(&mut self, user: &str, pass: &str) -> Result<(), AuthError> {
        self.user.clear();
        self.user
            .push_str(user)
            .map_err(|_| AuthError::CredentialOverflow)?;
        self.pass.clear();
        self.pass
            .push_str(pass)
            .map_err(|_| AuthError::CredentialOverflow)?;
        self.authed = true;
        info!("endpoint: auth info committed");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// FileTransferPort
// ───────────────────────────────────────────────────────────────

impl FileTransferPort for EndpointClient {
    fn download(
        &mut self,
        name: &str,
        range: Option<ByteRange>,
        max_chunk: usize,
        on_chunk: &mut dyn FnMut(&[u8]),
    ) -> Result<usize, TransferError> {
        let mut path: heapless::String<128> = heapless::String::new();
        let _ = write!(path, "/v1/files/{name}");

        let mut body = self.get(&path, range).map_err(|e| match e {
            RequestError::Connect => TransferError::ConnectFailed,
            RequestError::Io => TransferError::Aborted,
            RequestError::Status => TransferError::Rejected,
        })?;

        let mut chunk = vec![0u8; max_chunk];
        let mut total = 0usize;
        loop {
            let n = body.fill(&mut chunk).map_err(|_| TransferError::Aborted)?;
            if n == 0 {
                break;
            }
            on_chunk(&chunk[..n]);
            total += n;
            // A short fill means EOF; a full one may or may not be final.
            if n < max_chunk {
                break;
            }
        }
        debug!("endpoint: '{name}' transferred, {total} bytes");
        Ok(total)
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP plumbing
// ───────────────────────────────────────────────────────────────

/// Read the status line and headers; keep any body bytes that arrived in
/// the same reads.
fn read_response_head(mut stream: TcpStream) -> Result<BodyReader, RequestError> {
    let mut head = Vec::with_capacity(512);
    let mut byte = [0u8; 256];
    let body_start = loop {
        let n = stream.read(&mut byte).map_err(|_| RequestError::Io)?;
        if n == 0 {
            return Err(RequestError::Io);
        }
        head.extend_from_slice(&byte[..n]);
        if let Some(pos) = find_header_end(&head) {
            break pos;
        }
        if head.len() > 8 * 1024 {
            return Err(RequestError::Io);
        }
    };

    let header_text =
        core::str::from_utf8(&head[..body_start]).map_err(|_| RequestError::Io)?;
    let status_line = header_text.lines().next().ok_or(RequestError::Io)?;
    let code = status_line.split_whitespace().nth(1).ok_or(RequestError::Io)?;
    if code != "200" && code != "206" {
        debug!("endpoint: request rejected ({status_line})");
        return Err(RequestError::Status);
    }

    Ok(BodyReader {
        leftover: head.split_off(body_start + 4),
        stream,
    })
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Body bytes: the tail of the header reads, then the stream.
struct BodyReader {
    leftover: Vec<u8>,
    stream: TcpStream,
}

impl BodyReader {
    /// Fill `buf` completely unless EOF arrives first; returns bytes read.
    /// Full chunks stay full mid-stream even when the socket returns short
    /// reads — the short-chunk end-of-stream convention depends on it.
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        if !self.leftover.is_empty() {
            let n = self.leftover.len().min(buf.len());
            buf[..n].copy_from_slice(&self.leftover[..n]);
            self.leftover.drain(..n);
            filled = n;
        }
        while filled < buf.len() {
            let n = self.stream.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Read the whole body, failing if it exceeds `buf`.
    fn read_to_end_bounded(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.fill(buf)?;
        if n == buf.len() {
            // More than fits: drain one probe byte to distinguish.
            let mut probe = [0u8; 1];
            if self.stream.read(&mut probe)? != 0 {
                return Err(std::io::Error::other("body too large"));
            }
        }
        Ok(n)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (host; a canned HTTP server per case)
// ───────────────────────────────────────────────────────────────
