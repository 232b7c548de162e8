//! Banner grabbing for freshly opened TCP connections.
//!
//! Many services (SSH, FTP, SMTP) greet unprompted; HTTP-like services stay
//! silent until they see a request, so a minimal `HEAD` line is sent when the
//! greeting window passes without data.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Upper bound on the whole extraction, independent of the connect timeout.
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait for an unprompted greeting before probing.
const GREETING_WAIT: Duration = Duration::from_millis(300);

/// Maximum bytes read from the peer.
const MAX_BANNER_SIZE: usize = 1024;

/// Maximum banner length in characters after normalization.
pub const MAX_BANNER_LEN: usize = 100;

/// Probe sent to elicit a response from request/response services.
const HTTP_PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Read or elicit a short banner from an open connection.
///
/// Never fails: any timeout or I/O error yields an empty string.
pub async fn extract_banner<S>(stream: &mut S) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(BANNER_TIMEOUT, read_or_elicit(stream)).await {
        Ok(Some(data)) => normalize_banner(&decode_banner(&data)),
        _ => String::new(),
    }
}

async fn read_or_elicit<S>(stream: &mut S) -> Option<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(GREETING_WAIT, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => {
            buffer.truncate(n);
            return Some(buffer);
        }
        // Peer closed or the read failed outright: nothing to elicit.
        Ok(_) => return None,
        Err(_) => {}
    }

    stream.write_all(HTTP_PROBE).await.ok()?;
    let n = stream.read(&mut buffer).await.ok()?;
    if n == 0 {
        return None;
    }
    buffer.truncate(n);
    Some(buffer)
}

/// Decode raw banner bytes.
///
/// Invalid UTF-8 bytes, including a multi-byte sequence cut off by the read
/// buffer, are dropped and the valid text around them kept. Input with no
/// valid UTF-8 text at all is read as Latin-1, which maps every byte to a
/// character and so cannot fail.
pub fn decode_banner(data: &[u8]) -> String {
    let text: String = data.utf8_chunks().map(|chunk| chunk.valid()).collect();
    if text.is_empty() && !data.is_empty() {
        return data.iter().map(|&b| char::from(b)).collect();
    }
    text
}

/// Reduce decoded text to a single printable line of at most
/// [`MAX_BANNER_LEN`] characters.
pub fn normalize_banner(text: &str) -> String {
    let first_line = text.trim().lines().next().unwrap_or_default();
    let printable: String = first_line.chars().filter(|&c| is_printable(c)).collect();
    printable.trim().chars().take(MAX_BANNER_LEN).collect()
}

/// Printable text plus tab. Controls, invisible format characters,
/// separators other than space, and private-use code points are not.
fn is_printable(c: char) -> bool {
    if c == ' ' || c == '\t' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{E0001}'..='\u{E007F}'
            | '\u{F0000}'..='\u{10FFFF}'
    )
}
