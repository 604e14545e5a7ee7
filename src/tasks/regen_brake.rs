//! 回生ブレーキタスク
//!
//! 速度をサンプリングし、ランプで導出した制動電流を毎サイクル指令する
//! 周期タスクです。停止フラグの確認はサイクル末尾で1回だけ行うため、
//! 停止要求時も実行中の電流指令はそのサイクル分だけ完了します
//! （サイクル途中でトルクが突然抜けることはありません）。

use embassy_time::{Duration, Timer, TICK_HZ};

use crate::fmt::*;
use crate::motor::MotorInterface;
use crate::params::ParameterSource;
use crate::ramp::RampBrake;
use crate::state::ControllerState;
use crate::watchdog::Watchdog;

/// 制御周期をスケジューラティックに換算する
///
/// ティック周波数より高いレートを要求された場合でも、他のタスクを
/// 飢餓させないよう最低1ティックはスリープする。
pub(crate) fn cycle_period(update_rate_hz: u32) -> Duration {
    let rate = update_rate_hz.max(1) as u64;
    let mut ticks = TICK_HZ / rate;
    if ticks == 0 {
        ticks = 1;
    }
    Duration::from_ticks(ticks)
}

/// 回生ブレーキ制御ループ
///
/// 毎サイクル: パラメータ取得 → 速度読み取り → 制動電流計算 → 電流指令 →
/// スリープ → 停止確認 → ウォッチドッグリセット。
///
/// 事前条件: `state.try_claim()` が成功していること（`RegenBrakeApp` 経由の
/// 起動では満たされる）。停止要求を観測すると `running` を下ろして戻る。
/// 終了パスではウォッチドッグをリセットしない。
pub async fn brake_loop<P, M, W>(
    state: &ControllerState,
    source: &P,
    motor: &M,
    watchdog: &W,
    update_rate_hz: u32,
    runaway_cap: Option<f32>,
) where
    P: ParameterSource + ?Sized,
    M: MotorInterface + ?Sized,
    W: Watchdog + ?Sized,
{
    info!("Regen brake task started");

    let period = cycle_period(update_rate_hz);

    loop {
        let params = source.sample();
        let brake = RampBrake::new(params, runaway_cap);

        let erpm = motor.rpm();
        let current = brake.braking_current(erpm);
        motor.set_current(current);
        state.publish_status(erpm, current);

        Timer::after(period).await;

        if state.stop_pending() {
            state.mark_stopped();
            info!("Regen brake task stopped");
            return;
        }

        watchdog.reset();
    }
}

/// `RegenBrakeApp::start` から生成されるタスク本体
#[embassy_executor::task]
pub async fn regen_brake_task(
    app: &'static crate::app::RegenBrakeApp,
    source: &'static dyn ParameterSource,
    motor: &'static dyn MotorInterface,
    watchdog: &'static dyn Watchdog,
) {
    brake_loop(
        app.state(),
        source,
        motor,
        watchdog,
        app.update_rate_hz(),
        app.runaway_cap(),
    )
    .await;
}
