//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, MetricBuilder};

use crate::allocator::PidRange;

/// PIDアロケータのメトリクス.
#[derive(Debug, Clone)]
pub struct PidAllocatorMetrics {
    pub(crate) allocated_pids: Counter,
    pub(crate) released_pids: Counter,
    pub(crate) nopid_failures: Counter,
    pub(crate) capacity: u64,
}
impl PidAllocatorMetrics {
    /// 識別子の割当回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_allocator_allocated_pids_total <COUNTER>
    /// ```
    pub fn allocated_pids(&self) -> u64 {
        self.allocated_pids.value() as u64
    }

    /// 識別子の解放回数.
    ///
    /// IN_USEのスロットが実際にFREEへ戻された回数のみがカウントされる.
    /// 未初期化時・範囲外・解放済みスロットへの二重解放(いずれもno-op)は含まれない.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_allocator_released_pids_total <COUNTER>
    /// ```
    pub fn released_pids(&self) -> u64 {
        self.released_pids.value() as u64
    }

    /// 空き識別子不足による割当失敗回数.
    ///
    /// 未初期化のアロケータへの割当要求もここに含まれる
    /// (割当の返り値と同様に、この二つは区別されない).
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_allocator_nopid_failures_total <COUNTER>
    /// ```
    pub fn nopid_failures(&self) -> u64 {
        self.nopid_failures.value() as u64
    }

    /// アロケータが管理している識別子の総数.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub(crate) fn new(builder: &MetricBuilder, range: PidRange) -> Self {
        let mut builder = builder.clone();
        builder.namespace("pidpool").subsystem("allocator");
        PidAllocatorMetrics {
            allocated_pids: builder
                .counter("allocated_pids_total")
                .help("Number of allocated PIDs")
                .finish()
                .expect("Never fails"),
            released_pids: builder
                .counter("released_pids_total")
                .help("Number of released PIDs")
                .finish()
                .expect("Never fails"),
            nopid_failures: builder
                .counter("nopid_failures_total")
                .help("Number of allocation failures caused by no available PID")
                .finish()
                .expect("Never fails"),
            capacity: range.len() as u64,
        }
    }
}

/// 割当サーバのメトリクス.
#[derive(Debug, Clone)]
pub struct AllocationServerMetrics {
    pub(crate) allocate_requests: Counter,
    pub(crate) release_requests: Counter,
    pub(crate) done_requests: Counter,
}
impl AllocationServerMetrics {
    /// ピアから受理したALLOCATEリクエストの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_server_requests_total { type="allocate" } <COUNTER>
    /// ```
    pub fn allocate_requests(&self) -> u64 {
        self.allocate_requests.value() as u64
    }

    /// ピアから受理したRELEASEリクエストの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_server_requests_total { type="release" } <COUNTER>
    /// ```
    pub fn release_requests(&self) -> u64 {
        self.release_requests.value() as u64
    }

    /// ピアから受理したDONEリクエストの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// pidpool_server_requests_total { type="done" } <COUNTER>
    /// ```
    pub fn done_requests(&self) -> u64 {
        self.done_requests.value() as u64
    }

    pub(crate) fn new(builder: &MetricBuilder) -> Self {
        let mut builder = builder.clone();
        builder.namespace("pidpool").subsystem("server");
        AllocationServerMetrics {
            allocate_requests: builder
                .counter("requests_total")
                .help("Number of requests received from the peer")
                .label("type", "allocate")
                .finish()
                .expect("Never fails"),
            release_requests: builder
                .counter("requests_total")
                .help("Number of requests received from the peer")
                .label("type", "release")
                .finish()
                .expect("Never fails"),
            done_requests: builder
                .counter("requests_total")
                .help("Number of requests received from the peer")
                .label("type", "done")
                .finish()
                .expect("Never fails"),
        }
    }
}
