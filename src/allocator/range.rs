use crate::{ErrorKind, Result};

/// プロセスID風の整数識別子(32bit幅).
///
/// ワイヤ上では符号付き4バイト整数として表現される.
/// 負の値そのものは識別子として払い出されることは無く、
/// `-1`は「割当失敗」を示す番兵値として予約されている.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Pid(i32);
impl Pid {
    /// 新しい`Pid`インスタンスを生成する.
    ///
    /// 値の範囲検査はここでは行わない(範囲はアロケータ毎に異なるため).
    /// 対象のアロケータの範囲に含まれるかどうかは
    /// [`PidRange::contains`](struct.PidRange.html#method.contains)で判定できる.
    pub fn new(pid: i32) -> Self {
        Pid(pid)
    }

    /// 識別子の値を返す.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}
impl From<i32> for Pid {
    fn from(from: i32) -> Self {
        Pid(from)
    }
}

/// アロケータが管理する識別子の範囲(閉区間`[lower, upper]`).
///
/// 範囲は構築時に固定され、以後変更されることは無い.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidRange {
    lower: i32,
    upper: i32,
}
impl PidRange {
    /// デフォルト範囲の下限.
    pub const DEFAULT_LOWER: i32 = 100;

    /// デフォルト範囲の上限.
    pub const DEFAULT_UPPER: i32 = 1000;

    /// 指定された閉区間を表現する`PidRange`インスタンスを生成する.
    ///
    /// # Errors
    ///
    /// 以下の場合には、種類が`ErrorKind::InvalidInput`のエラーが返される:
    ///
    /// - `lower`が負数
    /// - `upper`が`lower`未満
    ///
    /// # Examples
    ///
    /// ```
    /// use pidpool::ErrorKind;
    /// use pidpool::allocator::PidRange;
    ///
    /// assert!(PidRange::new(1, 3).is_ok());
    ///
    /// assert_eq!(PidRange::new(-1, 3).err().map(|e| *e.kind()), Some(ErrorKind::InvalidInput));
    /// assert_eq!(PidRange::new(3, 1).err().map(|e| *e.kind()), Some(ErrorKind::InvalidInput));
    /// ```
    pub fn new(lower: i32, upper: i32) -> Result<Self> {
        track_assert!(lower >= 0, ErrorKind::InvalidInput; lower, upper);
        track_assert!(lower <= upper, ErrorKind::InvalidInput; lower, upper);
        Ok(PidRange { lower, upper })
    }

    /// 範囲の下限を返す.
    pub fn lower(self) -> i32 {
        self.lower
    }

    /// 範囲の上限を返す.
    pub fn upper(self) -> i32 {
        self.upper
    }

    /// 範囲に含まれる識別子の総数を返す.
    pub fn len(self) -> usize {
        (self.upper - self.lower) as usize + 1
    }

    /// `pid`がこの範囲に含まれているかどうかを判定する.
    pub fn contains(self, pid: Pid) -> bool {
        self.lower <= pid.as_i32() && pid.as_i32() <= self.upper
    }
}
impl Default for PidRange {
    /// デフォルトの範囲`[100, 1000]`を返す.
    fn default() -> Self {
        PidRange {
            lower: Self::DEFAULT_LOWER,
            upper: Self::DEFAULT_UPPER,
        }
    }
}
