use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

/// Reliable, ordered byte stream over an already established connection.
pub trait Transport {
    /// 写出全部数据, 返回写出的字节数
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    /// 读取至多`max_len`字节, 返回空表示对端已关闭
    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>>;

    /// 关闭连接的读写两端
    fn shutdown(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        (**self).receive(max_len)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}

impl Transport for TcpStream {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_all(data)?;
        self.flush()?;
        Ok(data.len())
    }

    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max_len];
        loop {
            match self.read(buf.as_mut_slice()) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::Transport;
    use std::collections::VecDeque;
    use std::io;

    /// 按顺序返回预先写好的读取结果, 读完之后表现为对端关闭
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub(crate) incoming: VecDeque<io::Result<Vec<u8>>>,
        pub(crate) sent: Vec<Vec<u8>>,
        pub(crate) closed: bool,
    }

    impl ScriptedTransport {
        pub(crate) fn new<I: IntoIterator<Item = Vec<u8>>>(incoming: I) -> Self {
            Self {
                incoming: incoming.into_iter().map(Ok).collect(),
                sent: Vec::new(),
                closed: false,
            }
        }

        pub(crate) fn sent_str(&self, idx: usize) -> String {
            String::from_utf8_lossy(self.sent[idx].as_slice()).into_owned()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&mut self, data: &[u8]) -> io::Result<usize> {
            self.sent.push(data.to_vec());
            Ok(data.len())
        }

        fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
            match self.incoming.pop_front() {
                Some(Ok(mut data)) => {
                    if data.len() > max_len {
                        let rest = data.split_off(max_len);
                        self.incoming.push_front(Ok(rest));
                    }
                    Ok(data)
                }
                Some(Err(e)) => Err(e),
                None => Ok(Vec::new()),
            }
        }

        fn shutdown(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }
}
