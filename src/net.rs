//! TCP transport: one envelope per connection in each direction.
//!
//! Messages are newline-delimited JSON. A message that overruns
//! [`MAX_MESSAGE_BYTES`] is truncated at the cap, which downstream parsing
//! reports as invalid JSON. A peer that closes without sending a newline
//! still terminates the read at EOF.

pub mod client;
pub mod server;

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Upper bound on a single wire message.
pub const MAX_MESSAGE_BYTES: u64 = 64 * 1024;

/// Reads one newline-delimited message, or whatever arrived before EOF.
pub(crate) async fn read_message<R>(reader: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut reader = BufReader::new(reader).take(MAX_MESSAGE_BYTES);
    reader.read_until(b'\n', &mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
