use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the per-transfer read buffer. Should be > 1 KiB and < 10 MiB.
pub const TRANSFER_BUFFER_SIZE: usize = 2 * 1024 * 1024;

/// Transfers every byte from `src` to `dst`, then releases both ends.
///
/// The destination is shut down and the source dropped on every exit path. A
/// copy failure takes precedence over a close failure; a close failure after
/// a clean copy is surfaced, since an unclosed destination means the write
/// was never committed.
pub async fn transfer<R, W>(mut src: R, mut dst: W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let copied = copy_bytes(&mut src, &mut dst).await;
    let closed = dst.shutdown().await;
    drop(src);
    let total = copied?;
    closed?;
    Ok(total)
}

async fn copy_bytes<R, W>(src: &mut R, dst: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; TRANSFER_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = src.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        dst.write_all(&buffer[..read]).await?;
        total += read as u64;
    }
    Ok(total)
}
