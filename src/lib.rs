// Schemadocライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインモデル（スキーマグラフ、名前解決、リレーションのリンク、エラー、設定）
// - services: 追加データのマージ、ソート、検証、シリアライズ

pub mod cli;
pub mod core;
pub mod services;
