// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、NotFoundError, AdditionalDataError, IoError, ValidationError を定義します。

use thiserror::Error;

/// 名前解決エラー
///
/// スキーマ内でテーブルまたはカラムが名前で見つからなかった場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// Table not found
    #[error("not found table '{name}'")]
    Table {
        /// テーブル名
        name: String,
    },

    /// Column not found
    #[error("not found column '{table}.{column}'")]
    Column {
        /// 所属テーブル名
        table: String,
        /// カラム名
        column: String,
    },
}

impl NotFoundError {
    /// テーブル未検出エラーを作成
    pub fn table(name: &str) -> Self {
        NotFoundError::Table {
            name: name.to_string(),
        }
    }

    /// カラム未検出エラーを作成
    pub fn column(table: &str, column: &str) -> Self {
        NotFoundError::Column {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// テーブル未検出エラーかどうか
    pub fn is_table(&self) -> bool {
        matches!(self, NotFoundError::Table { .. })
    }

    /// カラム未検出エラーかどうか
    pub fn is_column(&self) -> bool {
        matches!(self, NotFoundError::Column { .. })
    }

    /// 診断用の識別子（"table" または "table.column"）
    pub fn context(&self) -> String {
        match self {
            NotFoundError::Table { name } => name.clone(),
            NotFoundError::Column { table, column } => format!("{}.{}", table, column),
        }
    }
}

/// 追加データのデコードエラー
#[derive(Debug, Clone, Error)]
pub enum AdditionalDataError {
    /// Decode error
    #[error("Failed to decode additional data: {message}")]
    Decode {
        /// エラーメッセージ
        message: String,
    },
}

impl AdditionalDataError {
    /// デコードエラーかどうか
    pub fn is_decode(&self) -> bool {
        matches!(self, AdditionalDataError::Decode { .. })
    }
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Path resolution error
    #[error("Failed to resolve absolute path: {path} (cause: {cause})")]
    PathResolve {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_file_write(&self) -> bool {
        matches!(self, IoError::FileWrite { .. })
    }

    /// パス解決エラーかどうか
    pub fn is_path_resolve(&self) -> bool {
        matches!(self, IoError::PathResolve { .. })
    }
}

/// バリデーションエラー
///
/// スキーマグラフの構造検証時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Reference error
    #[error("Reference error: {message}{}", format_location_opt(.location))]
    Reference {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
    },

    /// Duplicate name error
    #[error("Duplicate error: {message}{}", format_location_opt(.location))]
    Duplicate {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
    },

    /// Relation shape error
    #[error("Relation error: {message}{}", format_location_opt(.location))]
    Relation {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
    },

    /// Back-reference error
    #[error("Back-reference error: {message}{}", format_location_opt(.location))]
    BackReference {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
    },
}

impl ValidationError {
    /// 参照エラーかどうか
    pub fn is_reference(&self) -> bool {
        matches!(self, ValidationError::Reference { .. })
    }

    /// 重複エラーかどうか
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ValidationError::Duplicate { .. })
    }

    /// リレーション形状エラーかどうか
    pub fn is_relation(&self) -> bool {
        matches!(self, ValidationError::Relation { .. })
    }

    /// 逆参照エラーかどうか
    pub fn is_back_reference(&self) -> bool {
        matches!(self, ValidationError::BackReference { .. })
    }

    /// エラー発生位置を取得
    pub fn location(&self) -> Option<&ErrorLocation> {
        match self {
            ValidationError::Reference { location, .. }
            | ValidationError::Duplicate { location, .. }
            | ValidationError::Relation { location, .. }
            | ValidationError::BackReference { location, .. } => location.as_ref(),
        }
    }
}

/// エラー発生位置
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorLocation {
    /// テーブル名
    pub table: Option<String>,
    /// カラム名
    pub column: Option<String>,
    /// リレーションの位置
    pub relation: Option<usize>,
}

impl ErrorLocation {
    /// 新しいエラー位置を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブル名を指定してエラー位置を作成
    pub fn with_table(table: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            ..Self::default()
        }
    }

    /// テーブル名とカラム名を指定してエラー位置を作成
    pub fn with_column(table: &str, column: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: Some(column.to_string()),
            relation: None,
        }
    }

    /// リレーション位置を指定してエラー位置を作成
    pub fn with_relation(index: usize) -> Self {
        Self {
            relation: Some(index),
            ..Self::default()
        }
    }

    /// 位置情報をフォーマット
    pub fn format(&self) -> String {
        let mut parts = Vec::new();

        if let Some(table) = &self.table {
            parts.push(format!("table: {}", table));
        }
        if let Some(column) = &self.column {
            parts.push(format!("column: {}", column));
        }
        if let Some(relation) = self.relation {
            parts.push(format!("relation: #{}", relation));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

fn format_location_opt(location: &Option<ErrorLocation>) -> String {
    location.as_ref().map_or(String::new(), |loc| loc.format())
}

/// バリデーション結果
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// エラーのリスト
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// 新しいバリデーション結果を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーを追加
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 検証が成功したかどうか（エラーがない場合は成功）
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// エラーの数を取得
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 他のバリデーション結果をマージ
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}
