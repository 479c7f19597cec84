// 追加データモデル
//
// イントロスペクションでは得られないリレーションとコメントを
// 宣言的なYAMLドキュメントとして表現する型。

use crate::core::error::AdditionalDataError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// `def` が指定されていない追加リレーションの定義文
pub const ADDITIONAL_RELATION_DEF: &str = "Additional Relation";

/// 追加データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalData {
    /// 追加リレーションのリスト
    #[serde(default)]
    pub relations: Vec<AdditionalRelation>,

    /// 追加コメントのリスト
    #[serde(default)]
    pub comments: Vec<AdditionalComment>,
}

impl AdditionalData {
    /// YAMLバイト列から追加データを読み込む
    ///
    /// # Errors
    ///
    /// UTF-8でない場合、またはドキュメントの形が合わない場合は `AdditionalDataError::Decode`
    pub fn from_slice(buf: &[u8]) -> Result<Self, AdditionalDataError> {
        let content = std::str::from_utf8(buf).map_err(|e| AdditionalDataError::Decode {
            message: e.to_string(),
        })?;
        content.parse()
    }

    /// 空のドキュメントかどうか
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty() && self.comments.is_empty()
    }
}

impl FromStr for AdditionalData {
    type Err = AdditionalDataError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        // 空ドキュメントは何も宣言していないものとして扱う
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| AdditionalDataError::Decode {
            message: e.to_string(),
        })
    }
}

/// 追加リレーション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalRelation {
    /// 参照元テーブル名
    #[serde(default)]
    pub table: String,

    /// 参照元カラム名
    #[serde(default)]
    pub columns: Vec<String>,

    /// 参照先テーブル名
    #[serde(default)]
    pub parent_table: String,

    /// 参照先カラム名
    #[serde(default)]
    pub parent_columns: Vec<String>,

    /// 定義文（空の場合は `ADDITIONAL_RELATION_DEF`）
    #[serde(default)]
    pub def: String,
}

impl AdditionalRelation {
    /// 実際に使われる定義文
    pub fn effective_def(&self) -> &str {
        if self.def.is_empty() {
            ADDITIONAL_RELATION_DEF
        } else {
            &self.def
        }
    }
}

/// 追加コメント
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalComment {
    /// 対象テーブル名
    #[serde(default)]
    pub table: String,

    /// テーブルコメント（空の場合は既存のコメントを変更しない）
    #[serde(default)]
    pub table_comment: String,

    /// カラム名 -> コメント
    #[serde(default)]
    pub column_comments: HashMap<String, String>,
}
