//! 割当プロトコルのワイヤ表現.
//!
//! ピア(割当を依頼する側)と所有側(アロケータを持つ側)を結ぶバイトストリーム上を
//! 流れるメッセージ群を定義している.
//!
//! メッセージはチャンネル境界でのみエンコード/デコードされ、
//! それより内側では常に型付きの値として扱われる.
//!
//! # ワイヤフォーマット
//!
//! ```text
//! ALLOCATEリクエスト: 0x01
//! ALLOCATE応答:       4バイト符号付き整数(ネイティブバイトオーダ). -1は割当失敗
//! RELEASEリクエスト:  0x02 + 4バイト符号付き整数(解放対象の識別子)
//! DONEリクエスト:     0x03
//! ```
//!
//! 識別子の整数表現がネイティブバイトオーダなのは、
//! このワイヤが同一ホスト内のプロセス間パイプを想定しているためである.
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::allocator::Pid;
use crate::Result;

const TAG_ALLOCATE: u8 = 1;
const TAG_RELEASE: u8 = 2;
const TAG_DONE: u8 = 3;

/// ALLOCATE応答で「割当失敗」を示す番兵値.
///
/// 枯渇と未初期化のどちらもこの値で表現され、ピアからは区別できない.
pub const NO_PID: i32 = -1;

/// ピアから所有側へ送られるリクエスト.
#[allow(missing_docs)]
#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Allocate,
    Release(Pid),
    Done,
}
impl Request {
    /// `writer`にリクエストを書き込む.
    pub(crate) fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        match *self {
            Request::Allocate => {
                track_io!(writer.write_u8(TAG_ALLOCATE))?;
            }
            Request::Release(pid) => {
                track_io!(writer.write_u8(TAG_RELEASE))?;
                track_io!(writer.write_i32::<NativeEndian>(pid.as_i32()))?;
            }
            Request::Done => {
                track_io!(writer.write_u8(TAG_DONE))?;
            }
        }
        Ok(())
    }

    /// `reader`からリクエストを一つ読み込む.
    ///
    /// チャンネルが閉じられていた(タグを一バイトも読めなかった)場合には`Ok(None)`が返される.
    ///
    /// 未知のタグは読み飛ばして次のタグの読み込みに進む.
    /// 将来のオペコード追加に対する前方互換のための、寛容なフレーミングである.
    ///
    /// # Errors
    ///
    /// RELEASEのペイロードが途中で途切れていた場合には、種類が`ErrorKind::Other`のエラーが返される.
    pub(crate) fn read_from<R: Read>(mut reader: R) -> Result<Option<Self>> {
        loop {
            let tag = match reader.read_u8() {
                Ok(tag) => tag,
                Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(track!(crate::Error::from(e))),
            };
            match tag {
                TAG_ALLOCATE => return Ok(Some(Request::Allocate)),
                TAG_RELEASE => {
                    let pid = track_io!(reader.read_i32::<NativeEndian>())?;
                    return Ok(Some(Request::Release(Pid::new(pid))));
                }
                TAG_DONE => return Ok(Some(Request::Done)),
                _ => {}
            }
        }
    }
}

/// ALLOCATEリクエストに対する所有側からの応答.
///
/// `None`は「空き識別子が無い(もしくはアロケータが未初期化である)」ことを表し、
/// ワイヤ上では[`NO_PID`](constant.NO_PID.html)にエンコードされる.
#[derive(Debug, PartialEq, Eq)]
pub struct AllocateReply(pub Option<Pid>);
impl AllocateReply {
    /// `writer`に応答を書き込む.
    pub(crate) fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let pid = self.0.map_or(NO_PID, Pid::as_i32);
        track_io!(writer.write_i32::<NativeEndian>(pid))?;
        Ok(())
    }

    /// `reader`から応答を読み込む.
    pub(crate) fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let pid = track_io!(reader.read_i32::<NativeEndian>())?;
        if pid == NO_PID {
            Ok(AllocateReply(None))
        } else {
            Ok(AllocateReply(Some(Pid::new(pid))))
        }
    }
}
