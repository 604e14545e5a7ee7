//! 回生ブレーキ制御のデフォルトパラメータ

/// 目標発電回転数 [eRPM]（両回転方向に適用、常に正）（デフォルト値）
pub const DEFAULT_ERPM_THRESHOLD: f32 = 5000.0;

/// 目標回転数到達時の制動電流 [A]（常に正）（デフォルト値）
pub const DEFAULT_CURRENT_AT_THRESHOLD: f32 = 0.2;

/// 制動開始回転数の比率（0.90 なら 0.90 * しきい値 eRPM から制動開始し、
/// しきい値 eRPM で設定電流に到達する）（デフォルト値）
pub const DEFAULT_START_RATIO: f32 = 0.90;

/// 制御ループ周波数 [Hz]（デフォルト値）
pub const DEFAULT_UPDATE_RATE_HZ: u32 = 1000;

/// 暴走速度キャップ [eRPM]（これを超えた速度は rel = 1.0 に飽和させ、
/// 制動電流が設定値を超えないようにする）（デフォルト値）
pub const DEFAULT_RUNAWAY_CAP_ERPM: f32 = 10_000.0;

/// ライブパラメータソースに許容する start_ratio の上限
/// （1.0 で正規化がゼロ除算になるため、手前でクランプする）
pub const MAX_START_RATIO: f32 = 0.99;

/// `stop()` が停止確認をポーリングする間隔 [ms]
pub const STOP_POLL_INTERVAL_MS: u64 = 1;
