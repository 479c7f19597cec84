// スキーマシリアライザーサービス
//
// スキーマスナップショットとJSON文字列/ファイルを相互変換するサービス。
// カラムの逆参照は出力せず、読み込み時に relations から再構築します。

use crate::core::error::IoError;
use crate::core::schema::Schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// スキーマシリアライザーサービス
#[derive(Debug, Clone)]
pub struct SchemaSerializerService;

impl SchemaSerializerService {
    /// 新しいSchemaSerializerServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// SchemaをJSON文字列にシリアライズ
    pub fn serialize_to_string(&self, schema: &Schema) -> Result<String> {
        let json = serde_json::to_string_pretty(schema)?;
        Ok(json)
    }

    /// SchemaをJSONファイルに出力
    pub fn serialize_to_file(&self, schema: &Schema, file_path: &Path) -> Result<()> {
        let json = self.serialize_to_string(schema)?;
        fs::write(file_path, json).map_err(|e| IoError::FileWrite {
            path: file_path.display().to_string(),
            cause: e.to_string(),
        })?;
        debug!(path = %file_path.display(), "Wrote schema snapshot");
        Ok(())
    }

    /// JSON文字列からSchemaを読み込み、カラムの逆参照を再構築
    pub fn from_json_str(&self, json: &str) -> Result<Schema> {
        let mut schema: Schema =
            serde_json::from_str(json).with_context(|| "Failed to parse schema JSON")?;
        schema
            .rebuild_back_references()
            .with_context(|| "Failed to link schema relations")?;
        Ok(schema)
    }

    /// JSONファイルからSchemaを読み込む
    pub fn from_file(&self, file_path: &Path) -> Result<Schema> {
        if !file_path.exists() {
            return Err(IoError::FileNotFound {
                path: file_path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(file_path).map_err(|e| IoError::FileRead {
            path: file_path.display().to_string(),
            cause: e.to_string(),
        })?;

        self.from_json_str(&content)
            .with_context(|| format!("Failed to load schema: {:?}", file_path))
    }
}

impl Default for SchemaSerializerService {
    fn default() -> Self {
        Self::new()
    }
}
