//! PID割当用のアロケータ.
//!
//! アロケータは、閉区間`[lower, upper]`の整数識別子群を管理し、
//! 空いている識別子の払い出し(割当)と、使用済み識別子の回収(解放)の責務を負っている。
//!
//! アロケータが担当するのは識別子の計算処理のみで、
//! プロセスやチャンネルのことをこの中で関知することは無い.
pub use self::pid_allocator::PidAllocator;
pub use self::range::{Pid, PidRange};

mod occupancy;
mod pid_allocator;
mod range;
