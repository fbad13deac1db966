//! 割当サーバ.
//!
//! 一つの[`PidAllocator`]を所有し、ピアからのリクエストを
//! 到着順に一件ずつ処理するループを提供する.
//!
//! アロケータへの相互排他は、ロックではなく構造によって達成されている:
//! アロケータ状態に直接触るのはこのサーバ(を駆動する単一スレッド)のみであり、
//! ピアからのアクセスは全て単一のバイトストリーム上で直列化される.
//!
//! [`PidAllocator`]: ../allocator/struct.PidAllocator.html
use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};
use std::io::{Read, Write};

use crate::allocator::PidAllocator;
use crate::metrics::AllocationServerMetrics;
use crate::protocol::{AllocateReply, Request};
use crate::Result;

/// `AllocationServer`のビルダ.
#[derive(Debug, Clone)]
pub struct AllocationServerBuilder {
    metrics: MetricBuilder,
    logger: Logger,
}
impl AllocationServerBuilder {
    /// デフォルト設定で`AllocationServerBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        AllocationServerBuilder {
            metrics: MetricBuilder::new(),
            logger: Logger::root(Discard, o!()),
        }
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// サーバ用のloggerを登録する.
    ///
    /// デフォルト値は`Logger::root(Discard, o!())`.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// 指定されたアロケータとチャンネルを扱う`AllocationServer`を生成する.
    ///
    /// `reader`はピアからのリクエストの到着する受信チャンネル、
    /// `writer`はピアへ応答を返す送信チャンネル.
    /// どちらも、対向に繋がっているピアは一つだけ、ということが前提となっている.
    pub fn finish<R, W>(
        &self,
        allocator: PidAllocator,
        reader: R,
        writer: W,
    ) -> AllocationServer<R, W>
    where
        R: Read,
        W: Write,
    {
        AllocationServer {
            logger: self.logger.clone(),
            metrics: AllocationServerMetrics::new(&self.metrics),
            allocator,
            reader,
            writer,
        }
    }
}
impl Default for AllocationServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 割当サーバ.
///
/// リクエストの処理は、単一スレッド上でのブロッキングループとして行われる.
/// ループの終了条件は以下の通り:
///
/// - ピアがDONEを送ってきた(正常終了)
/// - チャンネルが閉じられた(ピアの消滅; これも正常終了として扱われる)
/// - リクエストの途中でチャンネルが異常になった(エラーとして呼び出し元に報告される)
#[derive(Debug)]
pub struct AllocationServer<R, W> {
    logger: Logger,
    metrics: AllocationServerMetrics,
    allocator: PidAllocator,
    reader: R,
    writer: W,
}
impl<R, W> AllocationServer<R, W>
where
    R: Read,
    W: Write,
{
    /// ピアからのリクエストを、終了条件が満たされるまで処理し続ける.
    ///
    /// # Errors
    ///
    /// リクエストの途中の短い読み込みや、応答の書き込み失敗が発生した場合には、
    /// 種類が`ErrorKind::Other`のエラーが返される.
    /// これはループの終了を呼び出し元へ報告するためのものであり、
    /// プロセスを停止させるべき致命的な異常を意味しない.
    pub fn serve(&mut self) -> Result<()> {
        while track!(self.run_once())? {}
        Ok(())
    }

    fn run_once(&mut self) -> Result<bool> {
        let request = match track!(Request::read_from(&mut self.reader))? {
            Some(request) => request,
            None => {
                info!(self.logger, "The request channel was closed by the peer");
                return Ok(false);
            }
        };
        match request {
            Request::Allocate => {
                self.metrics.allocate_requests.increment();
                let pid = self.allocator.allocate();
                if let Some(pid) = pid {
                    debug!(self.logger, "Allocated a PID for the peer"; "pid" => pid.as_i32());
                } else {
                    warn!(self.logger, "No PID is available for the peer");
                }
                track!(AllocateReply(pid).write_to(&mut self.writer))?;
                track_io!(self.writer.flush())?;
                Ok(true)
            }
            Request::Release(pid) => {
                self.metrics.release_requests.increment();
                debug!(self.logger, "The peer released a PID"; "pid" => pid.as_i32());
                self.allocator.release(pid);
                Ok(true)
            }
            Request::Done => {
                self.metrics.done_requests.increment();
                info!(self.logger, "The peer is done; stop serving");
                Ok(false)
            }
        }
    }

    /// 所有しているアロケータへの参照を返す.
    pub fn allocator(&self) -> &PidAllocator {
        &self.allocator
    }

    /// 所有しているアロケータへの可変参照を返す.
    ///
    /// 所有側のプロセスが、プロトコルを介さずに自分自身の割当・解放を行うためのもの.
    /// ループの実行中(i.e., `serve()`の呼び出し中)には使用できない、という点に注意.
    pub fn allocator_mut(&mut self) -> &mut PidAllocator {
        &mut self.allocator
    }

    /// サーバを破棄して、所有していたアロケータを取り出す.
    pub fn into_allocator(self) -> PidAllocator {
        self.allocator
    }

    /// サーバ用のメトリクスを返す.
    pub fn metrics(&self) -> &AllocationServerMetrics {
        &self.metrics
    }
}
