// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "schemadoc";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".schemadoc.yaml";

/// 既定のスキーマスナップショットファイル名
pub const SCHEMA_FILE: &str = "schema.json";

/// ログ出力を制御する環境変数
pub const LOG_ENV: &str = "SCHEMADOC_LOG";

/// `LOG_ENV` が未設定のときに参照する標準の環境変数
pub const FALLBACK_LOG_ENV: &str = "RUST_LOG";
