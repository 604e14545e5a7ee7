//! タスクライフサイクル状態と最新テレメトリ
//!
//! 制御タスクと外部呼び出し側の間で共有されるフラグを管理します。
//! リアルタイム経路をブロックしないよう、Mutexではなくアトミックのみを
//! 使用します（タスクは running を書き、stop_requested を読む。呼び出し側は
//! その逆）。

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// 直近の制御サイクルのテレメトリ
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrakeStatus {
    /// 最後にサンプリングした速度 [eRPM]
    pub erpm: f32,
    /// 最後に指令した電流 [A]
    pub current: f32,
}

/// 制御タスクのライフサイクルフラグ（Idle → Running → Stopping → Idle）
pub struct ControllerState {
    running: AtomicBool,
    stop_requested: AtomicBool,
    status_erpm: AtomicU32,
    status_current: AtomicU32,
}

impl ControllerState {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            status_erpm: AtomicU32::new(0),
            status_current: AtomicU32::new(0),
        }
    }

    /// Idle → Running 遷移を試みる（多重スタートガード）
    ///
    /// 成功時は前回の停止要求もクリアする。すでに Running なら false。
    pub fn try_claim(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.stop_requested.store(false, Ordering::Release);
        true
    }

    /// タスクへ停止を要求する（呼び出し側のみが書く）
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// 停止要求が立っているか（タスクがサイクル末尾で1回だけ確認する）
    pub fn stop_pending(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Running → Idle 遷移（タスク終了直前にタスク自身が呼ぶ）
    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// サイクルごとのテレメトリ更新（ロックフリー、取りこぼし許容）
    pub fn publish_status(&self, erpm: f32, current: f32) {
        self.status_erpm.store(erpm.to_bits(), Ordering::Relaxed);
        self.status_current
            .store(current.to_bits(), Ordering::Relaxed);
    }

    pub fn status(&self) -> BrakeStatus {
        BrakeStatus {
            erpm: f32::from_bits(self.status_erpm.load(Ordering::Relaxed)),
            current: f32::from_bits(self.status_current.load(Ordering::Relaxed)),
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}
