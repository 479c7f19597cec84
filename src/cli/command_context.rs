// コマンド共通コンテキスト
//
// 設定ファイル読み込みとスキーマ構築パイプラインの重複をCLI層で集約する。

use crate::core::config::Config;
use crate::core::schema::Schema;
use crate::services::additional_data::AdditionalDataService;
use crate::services::schema_serializer::SchemaSerializerService;
use crate::services::schema_sorter::SchemaSorterService;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// 設定を読み込んでコンテキストを作成
    ///
    /// `config_path` が指定された場合はそのファイルが必須です。
    /// 指定がない場合はプロジェクトルートの既定ファイルを読み、なければ既定値を使います。
    pub fn load(project_path: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {:?}", path));
                }
                Config::from_file(path).with_context(|| "Failed to read config file")?
            }
            None => {
                let default_path = project_path.join(Config::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Config::from_file(&default_path)
                        .with_context(|| "Failed to read config file")?
                } else {
                    debug!("No config file found, using defaults");
                    Config::default().resolve_paths(&project_path)
                }
            }
        };

        Ok(Self {
            project_path,
            config,
        })
    }

    /// コマンドラインで指定されたパスをプロジェクトルート基準で解決
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_path.join(path)
        }
    }

    /// スキーマスナップショットのパス（引数優先）
    pub fn schema_path(&self, overridden: Option<&Path>) -> PathBuf {
        overridden.map_or_else(|| self.config.schema.clone(), |p| self.resolve(p))
    }

    /// 追加データファイルのリスト（引数が1つでもあれば設定を置き換える）
    pub fn additional_data_paths(&self, overridden: &[PathBuf]) -> Vec<PathBuf> {
        if overridden.is_empty() {
            self.config.additional_data.clone()
        } else {
            overridden.iter().map(|p| self.resolve(p)).collect()
        }
    }

    /// スナップショットを読み込み、追加データをマージしてソートしたスキーマを返す
    pub fn build_schema(&self, schema_path: &Path, additional: &[PathBuf]) -> Result<Schema> {
        let mut schema = SchemaSerializerService::new().from_file(schema_path)?;

        let merger = AdditionalDataService::new();
        for path in additional {
            if self.config.atomic {
                merger.load_additional_data_atomic(&mut schema, path)?;
            } else {
                merger.load_additional_data(&mut schema, path)?;
            }
            info!(path = %path.display(), "Applied additional data");
        }

        SchemaSorterService::new().sort(&mut schema)?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext::load(temp_dir.path().to_path_buf(), None).unwrap();

        assert_eq!(context.config.schema, temp_dir.path().join("schema.json"));
        assert!(context.additional_data_paths(&[]).is_empty());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        assert!(CommandContext::load(temp_dir.path().to_path_buf(), Some(&missing)).is_err());
    }

    #[test]
    fn test_overrides_replace_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(Config::DEFAULT_CONFIG_PATH),
            "schema: db.json\nadditional_data: [a.yml]\n",
        )
        .unwrap();
        let context = CommandContext::load(temp_dir.path().to_path_buf(), None).unwrap();

        assert_eq!(context.schema_path(None), temp_dir.path().join("db.json"));
        assert_eq!(
            context.schema_path(Some(Path::new("other.json"))),
            temp_dir.path().join("other.json")
        );
        assert_eq!(
            context.additional_data_paths(&[PathBuf::from("b.yml")]),
            vec![temp_dir.path().join("b.yml")]
        );
    }
}
