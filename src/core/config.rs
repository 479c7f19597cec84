// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の読み込みと検証、
// 設定ファイル基準での相対パス解決を行います。

use crate::core::error::IoError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// プロジェクト設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// イントロスペクション結果のスキーマスナップショット（JSON）
    #[serde(default = "default_schema_path")]
    pub schema: PathBuf,

    /// マージする追加データファイル（記述順に適用）
    #[serde(default)]
    pub additional_data: Vec<PathBuf>,

    /// 出力先（未指定の場合は標準出力）
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// 追加データのマージを全件成功時のみ反映するか
    #[serde(default = "default_atomic")]
    pub atomic: bool,
}

fn default_schema_path() -> PathBuf {
    PathBuf::from(crate::core::naming::SCHEMA_FILE)
}

fn default_atomic() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: default_schema_path(),
            additional_data: Vec::new(),
            output: None,
            atomic: default_atomic(),
        }
    }
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 設定ファイルを読み込む
    ///
    /// 相対パスは設定ファイルのディレクトリを基準に解決されます。
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let config: Config = content.parse()?;
        config.validate()?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_paths(base_dir))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.schema.as_os_str().is_empty() {
            return Err(anyhow!("Schema path is not specified"));
        }

        if let Some(empty) = self
            .additional_data
            .iter()
            .position(|p| p.as_os_str().is_empty())
        {
            return Err(anyhow!("additional_data[{}] is an empty path", empty));
        }

        Ok(())
    }

    /// 相対パスを指定ディレクトリ基準に変換
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        let resolve = |p: PathBuf| {
            if p.is_absolute() {
                p
            } else {
                base_dir.join(p)
            }
        };

        self.schema = resolve(self.schema);
        self.additional_data = self.additional_data.into_iter().map(resolve).collect();
        self.output = self.output.map(resolve);
        self
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}
