//! PID Allocator.

use prometrics::metrics::MetricBuilder;

use super::occupancy::Occupancy;
use super::range::{Pid, PidRange};
use crate::metrics::PidAllocatorMetrics;
use crate::Result;

/// PID割当用のアロケータ.
///
/// 指定された閉区間`[lower, upper]`の中から、未使用の識別子の払い出しを担当する.
///
/// この実装自体は、完全にメモリ上のデータ構造であり、状態は永続化されない.
///
/// 構築直後はまだ利用可能ではなく、[`initialize`](#method.initialize)の呼び出しによって
/// 全スロットがFREEにリセットされてから、割当が可能になる.
///
/// # 割当戦略
///
/// このアロケータは、カーソル位置からのラップアラウンド走査を採用している.
///
/// 割当要求が発行された際には、まず`[cursor, upper]`が走査され、
/// 空きが見つからなければ折り返して`[lower, cursor)`が走査される.
/// 最初に見つかったFREEスロットが払い出され、カーソルはその一つ先に進められる.
///
/// 解放時には、解放対象がカーソルよりも手前であればカーソルが引き戻される.
/// これにより、次回の割当では前進を続けるよりも、
/// 直前に解放された小さな識別子の再利用が優先される(最前空き優先).
#[derive(Debug)]
pub struct PidAllocator {
    range: PidRange,
    occupancy: Occupancy,
    cursor: i32,
    ready: bool,
    metrics: PidAllocatorMetrics,
}
impl PidAllocator {
    /// アロケータを構築する.
    ///
    /// スロット領域はここで一度だけ確保される.
    /// 範囲の妥当性は`PidRange`の構築時に検査済みであるため、この関数は失敗しない.
    ///
    /// なお、構築直後のアロケータは未初期化状態であり、
    /// `initialize()`が呼ばれるまでは全ての割当要求が失敗する.
    pub fn new(range: PidRange) -> Self {
        Self::with_metrics(range, &MetricBuilder::new())
    }

    /// メトリクス用の共通設定を指定して、アロケータを構築する.
    pub fn with_metrics(range: PidRange, metrics: &MetricBuilder) -> Self {
        PidAllocator {
            range,
            occupancy: Occupancy::new(range.len()),
            cursor: range.lower(),
            ready: false,
            metrics: PidAllocatorMetrics::new(metrics, range),
        }
    }

    /// アロケータを初期化する.
    ///
    /// 全スロットがFREEに戻され、カーソルは範囲の下限に設定される.
    ///
    /// 初期化済みのアロケータに対して再度呼び出した場合には、
    /// 割当状況が全て破棄される(テスト用のリセット以外での使用は想定していない).
    ///
    /// # Errors
    ///
    /// 現在の実装では失敗することは無いが、
    /// 失敗した場合には未初期化状態のまま、ということが契約となっている.
    pub fn initialize(&mut self) -> Result<()> {
        self.occupancy.reset();
        self.cursor = self.range.lower();
        self.ready = true;
        Ok(())
    }

    /// 未使用の識別子を一つ払い出す.
    ///
    /// 空きが存在しない(枯渇している)場合には`None`が返される.
    /// 枯渇はエラーではなく、利用者が解放を待つか諦めるべき状況を表している.
    ///
    /// まだ`initialize()`が呼ばれていない場合にも`None`が返される.
    /// この二つの状況は返り値からは区別できない(ワイヤ上ではどちらも`-1`).
    ///
    /// 最悪の場合は範囲全体の線形走査となるが、
    /// 範囲は小さく割当はホットパスではないため許容している.
    pub fn allocate(&mut self) -> Option<Pid> {
        if !self.ready {
            self.metrics.nopid_failures.increment();
            return None;
        }
        let lower = self.range.lower();
        let upper = self.range.upper();
        let start = self.cursor;
        for pid in (start..=upper).chain(lower..start) {
            let index = (pid - lower) as usize;
            if self.occupancy.is_free(index) {
                self.occupancy.set_in_use(index);
                self.cursor = if pid + 1 > upper { lower } else { pid + 1 };
                self.metrics.allocated_pids.increment();
                return Some(Pid::new(pid));
            }
        }
        self.metrics.nopid_failures.increment();
        None
    }

    /// 割当済みの識別子を解放する.
    ///
    /// 未初期化の場合や、`pid`が範囲外の場合、既にFREEの場合には、
    /// エラーにはせず何も行わない.
    /// (ピアから不正な識別子が送られてきても、所有側を落とさないための措置)
    ///
    /// 解放した識別子がカーソルよりも手前であれば、カーソルをそこまで引き戻す.
    /// 次回の割当が、解放されたばかりの小さな識別子を優先して再利用するようにするためである.
    pub fn release(&mut self, pid: Pid) {
        if !self.ready || !self.range.contains(pid) {
            return;
        }
        let index = (pid.as_i32() - self.range.lower()) as usize;
        if !self.occupancy.is_free(index) {
            self.occupancy.set_free(index);
            self.metrics.released_pids.increment();
        }
        // 解放済みスロットへの二重解放でも、カーソルの引き戻しは行われる
        if pid.as_i32() < self.cursor {
            self.cursor = pid.as_i32();
        }
    }

    /// `pid`が現在IN_USEかどうかを判定する.
    ///
    /// 未初期化の場合や範囲外の識別子に対しては、常に`false`が返される.
    pub fn is_allocated(&self, pid: Pid) -> bool {
        if !self.ready || !self.range.contains(pid) {
            return false;
        }
        !self.occupancy.is_free((pid.as_i32() - self.range.lower()) as usize)
    }

    /// `pid`がこのアロケータの範囲に含まれているかどうかを判定する.
    pub fn in_range(&self, pid: Pid) -> bool {
        self.range.contains(pid)
    }

    /// 初期化済みかどうかを返す.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// このアロケータが管理している範囲を返す.
    pub fn range(&self) -> PidRange {
        self.range
    }

    /// アロケータ用のメトリクスを返す.
    pub fn metrics(&self) -> &PidAllocatorMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use crate::allocator::{Pid, PidAllocator, PidRange};

    #[test]
    fn it_works() -> TestResult {
        let mut allocator = allocator(1, 3);
        track!(allocator.initialize())?;

        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        assert_eq!(allocator.allocate(), Some(Pid::new(2)));
        assert_eq!(allocator.allocate(), Some(Pid::new(3)));
        assert_eq!(allocator.allocate(), None); // 枯渇

        let m = allocator.metrics();
        assert_eq!(m.allocated_pids(), 3);
        assert_eq!(m.released_pids(), 0);
        assert_eq!(m.nopid_failures(), 1);
        assert_eq!(m.capacity(), 3);
        Ok(())
    }

    #[test]
    fn allocations_stay_in_range() -> TestResult {
        let mut allocator = allocator(100, 110);
        track!(allocator.initialize())?;
        while let Some(pid) = allocator.allocate() {
            assert!(100 <= pid.as_i32() && pid.as_i32() <= 110);
        }
        assert_eq!(allocator.metrics().allocated_pids(), 11);
        Ok(())
    }

    #[test]
    fn no_double_allocation() -> TestResult {
        let mut allocator = allocator(1, 8);
        track!(allocator.initialize())?;
        let mut issued = Vec::new();
        while let Some(pid) = allocator.allocate() {
            assert!(!issued.contains(&pid));
            assert!(allocator.is_allocated(pid));
            issued.push(pid);
        }
        Ok(())
    }

    #[test]
    fn earliest_free_bias() -> TestResult {
        let mut allocator = allocator(1, 3);
        track!(allocator.initialize())?;
        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        assert_eq!(allocator.allocate(), Some(Pid::new(2)));
        assert_eq!(allocator.allocate(), Some(Pid::new(3)));

        // 真ん中を解放すると、次の割当はカーソルを引き戻して同じ識別子を返す
        allocator.release(Pid::new(2));
        assert!(!allocator.is_allocated(Pid::new(2)));
        assert_eq!(allocator.allocate(), Some(Pid::new(2)));
        Ok(())
    }

    #[test]
    fn release_then_reuse() -> TestResult {
        let mut allocator = allocator(100, 1000);
        track!(allocator.initialize())?;
        let pid = allocator.allocate().unwrap();
        allocator.release(pid);
        assert_eq!(allocator.allocate(), Some(pid));
        Ok(())
    }

    #[test]
    fn uninitialized_guard() {
        let mut allocator = allocator(1, 3);
        assert!(!allocator.is_ready());
        assert_eq!(allocator.allocate(), None);

        // 未初期化の解放は黙って無視され、観測可能な状態も変わらない
        allocator.release(Pid::new(2));
        assert!(!allocator.is_allocated(Pid::new(2)));
        assert!(!allocator.is_ready());
        assert_eq!(allocator.metrics().released_pids(), 0);
    }

    #[test]
    fn out_of_range_release_is_noop() -> TestResult {
        let mut allocator = allocator(1, 3);
        track!(allocator.initialize())?;
        let pid = allocator.allocate().unwrap();

        allocator.release(Pid::new(0));
        allocator.release(Pid::new(4));
        allocator.release(Pid::new(-1));
        assert!(allocator.is_allocated(pid));
        assert_eq!(allocator.metrics().released_pids(), 0);
        Ok(())
    }

    #[test]
    fn double_release_is_counted_once() -> TestResult {
        let mut allocator = allocator(1, 3);
        track!(allocator.initialize())?;
        let pid = allocator.allocate().unwrap();

        allocator.release(pid);
        allocator.release(pid); // 二重解放はno-op
        assert!(!allocator.is_allocated(pid));
        assert_eq!(allocator.metrics().released_pids(), 1);

        // no-opであっても、次の割当が手前から再開する点は変わらない
        assert_eq!(allocator.allocate(), Some(pid));
        Ok(())
    }

    #[test]
    fn reinitialize_wipes_state() -> TestResult {
        let mut allocator = allocator(1, 3);
        track!(allocator.initialize())?;
        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        assert_eq!(allocator.allocate(), Some(Pid::new(2)));

        track!(allocator.initialize())?;
        assert!(!allocator.is_allocated(Pid::new(1)));
        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        Ok(())
    }

    #[test]
    fn independent_domains() -> TestResult {
        // 同じ数値範囲を持つ二つのインスタンスは、互いに独立した割当ドメインとなる
        let mut a = allocator(100, 1000);
        let mut b = allocator(100, 1000);
        track!(a.initialize())?;
        track!(b.initialize())?;
        assert_eq!(a.allocate(), Some(Pid::new(100)));
        assert_eq!(b.allocate(), Some(Pid::new(100)));
        assert!(a.is_allocated(Pid::new(100)));
        b.release(Pid::new(100));
        assert!(a.is_allocated(Pid::new(100)));
        Ok(())
    }

    #[test]
    fn cursor_wraps_after_upper() -> TestResult {
        let mut allocator = allocator(1, 2);
        track!(allocator.initialize())?;
        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        assert_eq!(allocator.allocate(), Some(Pid::new(2)));

        // 上限を払い出した後のカーソルは下限に折り返している
        allocator.release(Pid::new(2));
        allocator.release(Pid::new(1));
        assert_eq!(allocator.allocate(), Some(Pid::new(1)));
        Ok(())
    }

    fn allocator(lower: i32, upper: i32) -> PidAllocator {
        PidAllocator::new(PidRange::new(lower, upper).unwrap())
    }
}
