/// 設定ファイル管理機能のテスト
///
/// このテストは、設定ファイルの読み込み、検証、相対パスの解決が
/// 正しく動作することを確認します。

#[cfg(test)]
mod config_tests {
    use schemadoc::core::config::Config;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Config構造体が正しくデシリアライズできることを確認
    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
schema: snapshots/schema.json
additional_data:
  - docs/relations.yml
output: docs/schema.json
"#;

        let config: Config = serde_saphyr::from_str(yaml).unwrap();

        assert_eq!(config.schema, Path::new("snapshots/schema.json"));
        assert_eq!(config.additional_data, vec![PathBuf::from("docs/relations.yml")]);
        assert_eq!(config.output.as_deref(), Some(Path::new("docs/schema.json")));
        assert!(config.atomic);
    }

    /// 不正なYAMLはエラー
    #[test]
    fn test_invalid_config() {
        let result: anyhow::Result<Config> = "additional_data: 3".parse();
        assert!(result.is_err());
    }

    /// 絶対パスはそのまま、相対パスは設定ファイル基準
    #[test]
    fn test_resolve_paths() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("abs.json");
        let path = temp_dir.path().join(".schemadoc.yaml");
        fs::write(
            &path,
            format!("schema: {}\noutput: out.json\n", absolute.display()),
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.schema, absolute);
        assert_eq!(config.output, Some(temp_dir.path().join("out.json")));
    }

    /// 空の追加データパスは検証エラー
    #[test]
    fn test_validate_empty_additional_path() {
        let config = Config {
            additional_data: vec![PathBuf::new()],
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("additional_data[0]"));
    }
}
