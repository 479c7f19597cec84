// docコマンドハンドラー
//
// スキーマスナップショットに追加データをマージし、ソート済みJSONを出力します。

use crate::cli::command_context::CommandContext;
use crate::services::schema_serializer::SchemaSerializerService;
use crate::services::schema_validator::SchemaValidatorService;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::warn;

/// docコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DocCommand {
    /// 実行コンテキスト
    pub context: CommandContext,
    /// スキーマスナップショット（指定されない場合は設定ファイルから取得）
    pub schema: Option<PathBuf>,
    /// 追加データファイル（指定されない場合は設定ファイルから取得）
    pub additional: Vec<PathBuf>,
    /// 出力先（指定されない場合は設定ファイル、それもなければ標準出力）
    pub output: Option<PathBuf>,
}

/// docコマンドハンドラー
#[derive(Debug, Clone)]
pub struct DocCommandHandler {}

impl DocCommandHandler {
    /// 新しいDocCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// docコマンドを実行
    ///
    /// # Returns
    ///
    /// 出力先がない場合はJSON文字列、ある場合は完了メッセージ
    pub fn execute(&self, command: &DocCommand) -> Result<String> {
        let context = &command.context;
        let schema_path = context.schema_path(command.schema.as_deref());
        let additional = context.additional_data_paths(&command.additional);

        let schema = context.build_schema(&schema_path, &additional)?;

        // 不整合なスキーマはレンダリングに渡さない
        let validation = SchemaValidatorService::new().validate(&schema);
        if !validation.is_valid() {
            for error in &validation.errors {
                warn!("{}", error);
            }
            return Err(anyhow!(
                "Schema is inconsistent after merge ({} error(s)); run `check` for details",
                validation.error_count()
            ));
        }

        let serializer = SchemaSerializerService::new();
        let output = command
            .output
            .as_deref()
            .map(|p| context.resolve(p))
            .or_else(|| context.config.output.clone());

        match output {
            Some(path) => {
                serializer.serialize_to_file(&schema, &path)?;
                Ok(format!(
                    "Wrote {} table(s) and {} relation(s) to {}",
                    schema.table_count(),
                    schema.relations.len(),
                    path.display()
                ))
            }
            None => serializer.serialize_to_string(&schema),
        }
    }
}

impl Default for DocCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
