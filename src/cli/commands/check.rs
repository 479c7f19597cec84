// checkコマンドハンドラー
//
// 追加データのマージとソートを実行し、結果のスキーマを検証します。
// - マージ失敗（名前解決エラー、デコードエラー）はそのままエラー
// - 構造上の問題はフォーマットして表示し、エラーとして返す

use crate::cli::command_context::CommandContext;
use crate::core::error::ValidationResult;
use crate::core::schema::Schema;
use crate::services::schema_validator::SchemaValidatorService;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// checkコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct CheckCommand {
    /// 実行コンテキスト
    pub context: CommandContext,
    /// スキーマスナップショット（指定されない場合は設定ファイルから取得）
    pub schema: Option<PathBuf>,
    /// 追加データファイル（指定されない場合は設定ファイルから取得）
    pub additional: Vec<PathBuf>,
}

/// checkコマンドハンドラー
#[derive(Debug, Clone)]
pub struct CheckCommandHandler {}

impl CheckCommandHandler {
    /// 新しいCheckCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// checkコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は検証結果のサマリー、失敗時はエラーメッセージ
    pub fn execute(&self, command: &CheckCommand) -> Result<String> {
        let context = &command.context;
        let schema_path = context.schema_path(command.schema.as_deref());
        let additional = context.additional_data_paths(&command.additional);

        let schema = context.build_schema(&schema_path, &additional)?;
        let result = SchemaValidatorService::new().validate(&schema);
        let summary = self.format_validation_result(&result, &schema, additional.len());

        if result.is_valid() {
            Ok(summary)
        } else {
            Err(anyhow!("{}", summary))
        }
    }

    /// 検証結果をフォーマット
    fn format_validation_result(
        &self,
        result: &ValidationResult,
        schema: &Schema,
        additional_files: usize,
    ) -> String {
        let mut output = String::new();

        output.push_str("=== Schema Check Results ===\n\n");

        if !result.errors.is_empty() {
            output.push_str(&format!(
                "{}\n\n",
                format!("{} error(s) found:", result.errors.len()).red()
            ));
            for (i, error) in result.errors.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, error));
            }
            output.push('\n');
        }

        let additional_relations = schema.relations.iter().filter(|r| r.is_additional).count();

        output.push_str("=== Summary ===\n");
        output.push_str(&format!("Schema: {}\n", schema.name));
        output.push_str(&format!("Tables: {}\n", schema.table_count()));
        output.push_str(&format!(
            "Relations: {} ({} additional)\n",
            schema.relations.len(),
            additional_relations
        ));
        output.push_str(&format!("Additional data files: {}\n", additional_files));

        if result.is_valid() {
            output.push_str(&format!("\n{}\n", "Schema is consistent".green()));
        }

        output
    }
}

impl Default for CheckCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
