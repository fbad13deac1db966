//! PID Pool.
//!
//! `pidpool`は、固定の数値範囲からプロセスID風の小さな整数識別子を
//! 割当・回収するためのローカル用アロケータと、
//! それを二つのプロセス間で共有するためのリクエスト/レスポンス
//! プロトコルを提供するライブラリ.
//!
//! # 特徴
//!
//! - 閉区間`[lower, upper]`(デフォルトは`[100, 1000]`)を対象とした
//!   ビットマップ方式の[PidAllocator]を提供
//!   - 走査はラップアラウンド式で、常に最も手前の空きスロットを優先する
//!   - 範囲は構築時に固定され、動的な拡張は行わない
//! - バイトストリーム(パイプ等)を介して、別プロセスが
//!   割当・解放を依頼するための[protocol]を定義
//!   - アロケータ本体はロックを持たず、所有プロセスのみが直接触る
//!   - 他プロセスからのアクセスは全て単一のチャンネル上で直列化される
//! - 割当の失敗(枯渇)はエラーではなく、`None`(ワイヤ上は`-1`)で通知される
//!
//! # モジュールの依存関係
//!
//! ```text
//! server / client => protocol => allocator
//! ```
//!
//! - [server]モジュール:
//!   - 主に[AllocationServer]構造体を提供
//!   - 一つの[PidAllocator]を所有し、ピアからのリクエストを順番に処理する
//! - [client]モジュール:
//!   - 主に[AllocationClient]構造体を提供
//!   - リクエストの発行と、ALLOCATE応答のデコードを担当する
//! - [protocol]モジュール:
//!   - リクエスト/レスポンスのワイヤ表現(タグ付きユニオン)を定義
//!   - チャンネル境界で一度だけデコードを行い、以降は型付きの値として扱う
//! - [allocator]モジュール:
//!   - 主に[PidAllocator]構造体を提供
//!   - プロセスや入出力のことは一切関知しない純粋な割当エンジン
//!
//! [PidAllocator]: ./allocator/struct.PidAllocator.html
//! [AllocationServer]: ./server/struct.AllocationServer.html
//! [AllocationClient]: ./client/struct.AllocationClient.html
//! [server]: ./server/index.html
//! [client]: ./client/index.html
//! [protocol]: ./protocol/index.html
//! [allocator]: ./allocator/index.html
#![warn(missing_docs)]
extern crate byteorder;
extern crate prometrics;
#[macro_use]
extern crate trackable;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

macro_rules! track_io {
    ($expr:expr) => {
        $expr.map_err(|e: ::std::io::Error| track!(crate::Error::from(e)))
    };
}

pub mod allocator;
pub mod client;
pub mod metrics;
pub mod protocol;
pub mod server;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
