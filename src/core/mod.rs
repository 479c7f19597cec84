// Core Domain
// スキーマグラフのモデル、名前解決、リレーションのリンク、エラー型と設定

pub mod additional_data;
pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
