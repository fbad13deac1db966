//! 割当クライアント.
//!
//! アロケータを所有していない側(ピア)が、チャンネル越しに
//! 識別子の割当・解放を依頼するためのシムを提供する.
use std::io::{Read, Write};

use crate::allocator::Pid;
use crate::protocol::{AllocateReply, Request};
use crate::Result;

/// 割当クライアント.
///
/// 全てのリクエストは一本のバイトストリームを共有しており、
/// 所有側では到着順に処理されるため、
/// 「解放してから割り当てる」といった同一チャンネル上の順序は保存される.
///
/// 解放に対する応答は存在しない(fire-and-forget)ので、
/// クライアントが応答待ちでブロックするのはALLOCATEの時だけである.
#[derive(Debug)]
pub struct AllocationClient<R, W> {
    reader: R,
    writer: W,
}
impl<R, W> AllocationClient<R, W>
where
    R: Read,
    W: Write,
{
    /// 新しい`AllocationClient`インスタンスを生成する.
    ///
    /// `reader`は所有側からの応答の到着する受信チャンネル、
    /// `writer`は所有側へリクエストを送る送信チャンネル.
    pub fn new(reader: R, writer: W) -> Self {
        AllocationClient { reader, writer }
    }

    /// 所有側に識別子の割当を依頼し、応答が届くまでブロックする.
    ///
    /// 割当に失敗した場合には`None`が返される.
    /// 「所有側の範囲が枯渇していた(`-1`応答)」のか
    /// 「チャンネルの読み書きに失敗した」のかは、この返り値からは区別できない.
    /// どちらであっても、このクライアントにできることは
    /// 「割当は失敗した」として扱うことだけだからである.
    pub fn request_allocate(&mut self) -> Option<Pid> {
        if Request::Allocate.write_to(&mut self.writer).is_err() {
            return None;
        }
        if self.writer.flush().is_err() {
            return None;
        }
        AllocateReply::read_from(&mut self.reader)
            .ok()
            .and_then(|reply| reply.0)
    }

    /// 所有側に識別子の解放を依頼する.
    ///
    /// 応答は期待されないため、書き込みが終わった時点で制御が戻る.
    ///
    /// # Errors
    ///
    /// チャンネルへの書き込みに失敗した場合には、種類が`ErrorKind::Other`のエラーが返される.
    pub fn request_release(&mut self, pid: Pid) -> Result<()> {
        track!(Request::Release(pid).write_to(&mut self.writer))?;
        track_io!(self.writer.flush())?;
        Ok(())
    }

    /// 所有側に終了を通知して、クライアントを破棄する.
    ///
    /// クライアントの破棄によって送信チャンネルの書き込み端も閉じられるため、
    /// 所有側のループはDONEの処理後、それ以上このピアを待たなくなる.
    ///
    /// # Errors
    ///
    /// チャンネルへの書き込みに失敗した場合には、種類が`ErrorKind::Other`のエラーが返される.
    pub fn signal_done(mut self) -> Result<()> {
        track!(Request::Done.write_to(&mut self.writer))?;
        track_io!(self.writer.flush())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use trackable::result::TestResult;

    use super::*;
    use crate::allocator::Pid;

    #[test]
    fn request_allocate_works() {
        let reply = 123i32.to_ne_bytes();
        let mut requests = Vec::new();
        let mut client = AllocationClient::new(&reply[..], &mut requests);
        assert_eq!(client.request_allocate(), Some(Pid::new(123)));
        assert_eq!(requests, [1]);
    }

    #[test]
    fn nopid_reply_resolves_to_none() {
        let reply = (-1i32).to_ne_bytes();
        let mut client = AllocationClient::new(&reply[..], Vec::new());
        assert_eq!(client.request_allocate(), None);
    }

    #[test]
    fn write_failure_resolves_to_none() {
        // リクエストを書き込めなかった場合、応答は読まれず、単なる割当失敗として扱われる
        let reply = 123i32.to_ne_bytes();
        let mut client = AllocationClient::new(&reply[..], BrokenChannel);
        assert_eq!(client.request_allocate(), None);
    }

    #[test]
    fn channel_failure_resolves_to_none() {
        // 応答が届く前にチャンネルが閉じられた場合も、単なる割当失敗として扱われる
        let reply: [u8; 0] = [];
        let mut client = AllocationClient::new(&reply[..], Vec::new());
        assert_eq!(client.request_allocate(), None);
    }

    #[test]
    fn release_and_done_write_no_reply_wait() -> TestResult {
        let reply: [u8; 0] = [];
        let mut requests = Vec::new();
        {
            let mut client = AllocationClient::new(&reply[..], &mut requests);
            track!(client.request_release(Pid::new(100)))?;
            track!(client.signal_done())?;
        }
        assert_eq!(requests[0], 2);
        assert_eq!(requests[1..5], 100i32.to_ne_bytes());
        assert_eq!(requests[5], 3);
        Ok(())
    }

    // 書き込み側だけが壊れたチャンネル
    struct BrokenChannel;
    impl Write for BrokenChannel {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "the owner is gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "the owner is gone"))
        }
    }
}
