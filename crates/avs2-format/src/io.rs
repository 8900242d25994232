//! I/O 抽象层.
//!
//! 对标 FFmpeg 的 `AVIOContext`, 为解封装器提供统一的读取接口,
//! 支持文件与内存缓冲区两种后端.

use std::io::{self, Read, Seek};

use avs2_core::Avs2Result;

/// I/O 上下文
///
/// 封装底层 I/O 操作, 带读缓冲.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的输入来源.
pub trait IoBackend: Send {
    /// 读取数据到缓冲区
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 定位 (seek)
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
    /// 是否支持 seek
    fn is_seekable(&self) -> bool;
}

/// 默认缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> Avs2Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从内存数据创建
    pub fn from_memory(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Box::new(MemoryBackend::from_data(data.into())))
    }

    /// 填充读缓冲区, 返回新读入的字节数 (0 表示到达末尾)
    fn fill_buffer(&mut self) -> Avs2Result<usize> {
        self.buf_pos = 0;
        self.buf_len = self.inner.read(&mut self.buffer)?;
        Ok(self.buf_len)
    }

    /// 读取至多 `buf.len()` 字节, 只在末尾返回较短的结果
    ///
    /// 返回 0 表示已到达末尾.
    pub fn read_partial(&mut self, buf: &mut [u8]) -> Avs2Result<usize> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let buffered = self.buf_len - self.buf_pos;
            if buffered == 0 && self.fill_buffer()? == 0 {
                break;
            }
            let buffered = self.buf_len - self.buf_pos;
            let to_copy = buffered.min(buf.len() - total_read);
            buf[total_read..total_read + to_copy]
                .copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + to_copy]);
            self.buf_pos += to_copy;
            total_read += to_copy;
        }
        Ok(total_read)
    }

    /// 定位 (seek)
    ///
    /// 注意: seek 会清空读缓冲区.
    pub fn seek(&mut self, pos: io::SeekFrom) -> Avs2Result<u64> {
        self.buf_pos = 0;
        self.buf_len = 0;
        Ok(self.inner.seek(pos)?)
    }

    /// 获取当前位置
    ///
    /// 考虑读缓冲区中尚未消耗的数据量.
    pub fn position(&mut self) -> Avs2Result<u64> {
        let raw_pos = self.inner.position()?;
        let buffered = (self.buf_len - self.buf_pos) as u64;
        Ok(raw_pos - buffered)
    }

    /// 是否支持随机访问
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// 获取总大小
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理.
pub struct MemoryBackend {
    /// 数据缓冲区
    data: Vec<u8>,
    /// 当前位置
    pos: usize,
}

impl MemoryBackend {
    /// 从已有数据创建
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            io::SeekFrom::Start(offset) => offset as i64,
            io::SeekFrom::End(offset) => self.data.len() as i64 + offset,
            io::SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_partial_short_at_end() {
        let mut io = IoContext::from_memory(vec![1u8, 2, 3, 4, 5]);
        let mut buf = [0u8; 4];
        assert_eq!(io.read_partial(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(io.read_partial(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 5);
        assert_eq!(io.read_partial(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_position_accounts_for_buffer() {
        let mut io = IoContext::from_memory(vec![0u8; 100]);
        let mut buf = [0u8; 10];
        assert_eq!(io.read_partial(&mut buf).unwrap(), 10);
        assert_eq!(io.position().unwrap(), 10);
        io.seek(io::SeekFrom::Start(95)).unwrap();
        assert_eq!(io.read_partial(&mut buf).unwrap(), 5);
        assert_eq!(io.position().unwrap(), 100);
    }

    #[test]
    fn test_file_backend() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 3000]).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut io = IoContext::open_read(&path).unwrap();
        assert_eq!(io.size(), Some(3000));
        assert!(io.is_seekable());
        let mut buf = [0u8; 4096];
        assert_eq!(io.read_partial(&mut buf).unwrap(), 3000);
        assert!(buf[..3000].iter().all(|&b| b == 7));
        assert_eq!(io.read_partial(&mut buf).unwrap(), 0);
    }
}
