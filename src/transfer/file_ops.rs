//! Module `file_ops`
//!
//! Streams file contents over a data channel in fixed-size windows.
//!
//! A file is consumed in `stride`-byte blocks and the first `window` bytes of
//! each block are written as one window. The default 4095/4096 layout drops
//! the last byte of every full block; `window == stride` sends the file
//! unchanged.

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Window layout for a chunked send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    window: usize,
    stride: usize,
}

impl WindowPlan {
    /// Creates a plan writing `window` bytes out of every `stride` bytes.
    ///
    /// `window` is clamped to `1..=stride`.
    pub fn new(window: usize, stride: usize) -> Self {
        let stride = stride.max(1);
        Self {
            window: window.clamp(1, stride),
            stride,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of payload bytes this plan delivers for a file of `len` bytes.
    pub fn delivered_len(&self, len: u64) -> u64 {
        let stride = self.stride as u64;
        let window = self.window as u64;
        let full_blocks = len / stride;
        let tail = len % stride;
        full_blocks * window + tail.min(window)
    }
}

/// Counters for one completed send.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    pub windows: usize,
    pub bytes_read: u64,
    pub bytes_sent: u64,
}

impl TransferStats {
    /// Bytes read from the source but never written.
    pub fn bytes_dropped(&self) -> u64 {
        self.bytes_read - self.bytes_sent
    }
}

/// Sends `source` to `sink` window by window and flushes the sink.
///
/// Only one stride-sized block is held in memory at a time.
pub async fn send_windows<R, W>(
    source: &mut R,
    sink: &mut W,
    plan: WindowPlan,
) -> std::io::Result<TransferStats>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut block = vec![0u8; plan.stride()];
    let mut stats = TransferStats::default();

    loop {
        let n = fill_block(source, &mut block).await?;
        if n == 0 {
            break;
        }

        let window = n.min(plan.window());
        sink.write_all(&block[..window]).await?;

        stats.windows += 1;
        stats.bytes_read += n as u64;
        stats.bytes_sent += window as u64;
        debug!("Window {} sent: {} of {} bytes", stats.windows, window, n);

        if n < block.len() {
            break;
        }
    }

    sink.flush().await?;
    Ok(stats)
}

/// Reads until `block` is full or the source is exhausted.
async fn fill_block<R>(source: &mut R, block: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < block.len() {
        match source.read(&mut block[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Sink that records the size of every write it receives.
    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<Vec<u8>>,
    }

    impl AsyncWrite for RecordingSink {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.writes.push(buf.to_vec());
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test]
    async fn exact_multiple_of_stride_drops_one_byte_per_block() {
        let data = pattern(8192);
        let mut sink = RecordingSink::default();

        let stats = send_windows(&mut Cursor::new(data.clone()), &mut sink, WindowPlan::new(4095, 4096))
            .await
            .unwrap();

        assert_eq!(stats.windows, 2);
        assert_eq!(sink.writes.len(), 2);
        assert!(sink.writes.iter().all(|w| w.len() == 4095));
        assert_eq!(stats.bytes_read, 8192);
        assert_eq!(stats.bytes_sent, 8190);
        assert_eq!(stats.bytes_dropped(), 2);
        assert_eq!(sink.writes[0], data[..4095]);
        assert_eq!(sink.writes[1], data[4096..8191]);
    }

    #[tokio::test]
    async fn short_file_is_sent_in_one_window() {
        let data = b"hello world".to_vec();
        let mut sink = Vec::new();

        let stats = send_windows(&mut Cursor::new(data.clone()), &mut sink, WindowPlan::new(4095, 4096))
            .await
            .unwrap();

        assert_eq!(stats.windows, 1);
        assert_eq!(sink, data);
    }

    #[tokio::test]
    async fn trailing_partial_block_is_sent_whole() {
        let data = pattern(4096 + 100);
        let mut sink = Vec::new();

        let stats = send_windows(&mut Cursor::new(data.clone()), &mut sink, WindowPlan::new(4095, 4096))
            .await
            .unwrap();

        assert_eq!(stats.windows, 2);
        assert_eq!(stats.bytes_sent, 4095 + 100);
        let mut expected = data[..4095].to_vec();
        expected.extend_from_slice(&data[4096..]);
        assert_eq!(sink, expected);
    }

    #[tokio::test]
    async fn equal_window_and_stride_is_lossless() {
        let data = pattern(10_000);
        let mut sink = Vec::new();

        let stats = send_windows(&mut Cursor::new(data.clone()), &mut sink, WindowPlan::new(4096, 4096))
            .await
            .unwrap();

        assert_eq!(stats.windows, 3);
        assert_eq!(stats.bytes_dropped(), 0);
        assert_eq!(sink, data);
    }

    #[tokio::test]
    async fn empty_source_sends_nothing() {
        let mut sink = RecordingSink::default();

        let stats = send_windows(&mut Cursor::new(Vec::new()), &mut sink, WindowPlan::new(4095, 4096))
            .await
            .unwrap();

        assert_eq!(stats, TransferStats::default());
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn delivered_len_matches_the_window_layout() {
        let plan = WindowPlan::new(4095, 4096);
        assert_eq!(plan.delivered_len(0), 0);
        assert_eq!(plan.delivered_len(11), 11);
        assert_eq!(plan.delivered_len(4095), 4095);
        assert_eq!(plan.delivered_len(4096), 4095);
        assert_eq!(plan.delivered_len(8192), 8190);
        assert_eq!(plan.delivered_len(8193), 8191);
    }

    #[test]
    fn window_is_clamped_to_stride() {
        let plan = WindowPlan::new(9000, 4096);
        assert_eq!(plan.window(), 4096);
        assert_eq!(WindowPlan::new(0, 16).window(), 1);
    }
}
