//! 回生ブレーキアプリの制御サーフェース
//!
//! ファームウェアのアプリ選択レイヤーから呼ばれる `start` / `stop` /
//! `configure` を提供します。パラメータは `configure` で検証・保存され、
//! 次回の `start` 時にタスクへ適用されます（実行中の差し替えは非対応）。

use core::cell::Cell;

use embassy_executor::{SpawnError, Spawner};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};

use crate::config::{
    DEFAULT_CURRENT_AT_THRESHOLD, DEFAULT_ERPM_THRESHOLD, DEFAULT_RUNAWAY_CAP_ERPM,
    DEFAULT_START_RATIO, DEFAULT_UPDATE_RATE_HZ, STOP_POLL_INTERVAL_MS,
};
use crate::fmt::*;
use crate::motor::MotorInterface;
use crate::params::{ParamError, ParameterSource, RampParameters};
use crate::state::{BrakeStatus, ControllerState};
use crate::tasks::regen_brake_task;
use crate::watchdog::Watchdog;

/// `start` 失敗の理由
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// タスクはすでに実行中（多重スタートガード）
    AlreadyRunning,
    /// 保存されたパラメータが不正
    InvalidParameters(ParamError),
    /// エグゼキュータへのスポーンに失敗
    Spawn(SpawnError),
}

impl From<ParamError> for StartError {
    fn from(err: ParamError) -> Self {
        StartError::InvalidParameters(err)
    }
}

/// 回生ブレーキアプリ
///
/// `static` として置き、`start(&'static self, ...)` でタスクを起動する。
/// 固定パラメータ起動ではアプリ自身が `ParameterSource` となり、起動時に
/// スナップショットした設定値を毎サイクル返す。
pub struct RegenBrakeApp {
    state: ControllerState,
    /// `configure` で保存される設定値（次回 start で反映）
    params: Mutex<CriticalSectionRawMutex, Cell<RampParameters>>,
    /// 実行中タスクが参照するスナップショット
    active: Mutex<CriticalSectionRawMutex, Cell<RampParameters>>,
    update_rate_hz: u32,
    runaway_cap: Option<f32>,
}

impl RegenBrakeApp {
    /// デフォルト設定（1kHz、暴走キャップあり）のアプリを作る
    pub const fn new() -> Self {
        Self::with_config(DEFAULT_UPDATE_RATE_HZ, Some(DEFAULT_RUNAWAY_CAP_ERPM))
    }

    /// ループ周波数と暴走キャップポリシーを指定してアプリを作る
    pub const fn with_config(update_rate_hz: u32, runaway_cap: Option<f32>) -> Self {
        let defaults = RampParameters {
            erpm_threshold: DEFAULT_ERPM_THRESHOLD,
            current_at_threshold: DEFAULT_CURRENT_AT_THRESHOLD,
            start_ratio: DEFAULT_START_RATIO,
        };
        Self {
            state: ControllerState::new(),
            params: Mutex::new(Cell::new(defaults)),
            active: Mutex::new(Cell::new(defaults)),
            update_rate_hz,
            runaway_cap,
        }
    }

    /// パラメータを検証して保存する（次回 `start` で適用）
    pub fn configure(&self, params: RampParameters) -> Result<(), ParamError> {
        params.validate()?;
        self.params.lock(|cell| cell.set(params));
        Ok(())
    }

    /// 保存済みパラメータで周期タスクを起動する
    ///
    /// すでに実行中なら `StartError::AlreadyRunning`。成功するとタスクが
    /// 速度ソースの消費と電流指令を開始する。
    pub fn start(
        &'static self,
        spawner: Spawner,
        motor: &'static dyn MotorInterface,
        watchdog: &'static dyn Watchdog,
    ) -> Result<(), StartError> {
        let params = self.params.lock(|cell| cell.get());
        params.validate()?;
        self.active.lock(|cell| cell.set(params));
        self.spawn(spawner, self, motor, watchdog)
    }

    /// ライブパラメータソース（ポット入力など）で周期タスクを起動する
    pub fn start_with_source(
        &'static self,
        spawner: Spawner,
        source: &'static dyn ParameterSource,
        motor: &'static dyn MotorInterface,
        watchdog: &'static dyn Watchdog,
    ) -> Result<(), StartError> {
        self.spawn(spawner, source, motor, watchdog)
    }

    fn spawn(
        &'static self,
        spawner: Spawner,
        source: &'static dyn ParameterSource,
        motor: &'static dyn MotorInterface,
        watchdog: &'static dyn Watchdog,
    ) -> Result<(), StartError> {
        if !self.state.try_claim() {
            return Err(StartError::AlreadyRunning);
        }

        info!("Regen brake app starting");
        match spawner.spawn(regen_brake_task(self, source, motor, watchdog)) {
            Ok(()) => Ok(()),
            Err(err) => {
                // スポーン失敗時はタスクが走らないので自分で Idle に戻す
                self.state.mark_stopped();
                error!("Regen brake task spawn failed");
                Err(StartError::Spawn(err))
            }
        }
    }

    /// 停止を要求し、タスクの終了確認までポーリングで待つ
    ///
    /// 戻った時点で以降の電流指令は発行されない。最終サイクルの指令は
    /// 完了させるため、最悪待ち時間は約1制御周期。未起動なら何もしない。
    pub async fn stop(&self) {
        if !self.state.is_running() {
            return;
        }

        self.state.request_stop();
        while self.state.is_running() {
            Timer::after(Duration::from_millis(STOP_POLL_INTERVAL_MS)).await;
        }
        info!("Regen brake app stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// 直近サイクルのテレメトリ
    pub fn status(&self) -> BrakeStatus {
        self.state.status()
    }

    pub(crate) fn state(&self) -> &ControllerState {
        &self.state
    }

    pub(crate) fn update_rate_hz(&self) -> u32 {
        self.update_rate_hz
    }

    pub(crate) fn runaway_cap(&self) -> Option<f32> {
        self.runaway_cap
    }
}

impl Default for RegenBrakeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for RegenBrakeApp {
    fn sample(&self) -> RampParameters {
        self.active.lock(|cell| cell.get())
    }
}
