// スキーマドメインモデル
//
// データベーススキーマのスナップショットを表現する型システム。
// Schema, Table, Column, Index, Constraint, Trigger, Relation などの構造体と、
// 名前による検索、リレーションの逆参照リンクを提供します。

use crate::core::error::NotFoundError;
use serde::{Deserialize, Serialize};

/// リレーションID
///
/// `Schema::relations` 内の位置。カラムはリレーションをこのIDで参照します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(pub usize);

impl RelationId {
    /// `Schema::relations` 内のインデックス
    pub fn index(self) -> usize {
        self.0
    }
}

/// カラムのデフォルト値
///
/// 「デフォルトなし」と「空文字列のデフォルト」を区別します。
/// JSONでは値がある場合は文字列、ない場合は `null` になります。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ColumnDefault {
    /// デフォルト値なし
    #[default]
    Absent,
    /// デフォルト値あり
    Present(String),
}

impl ColumnDefault {
    /// デフォルト値が存在するか
    pub fn is_present(&self) -> bool {
        matches!(self, ColumnDefault::Present(_))
    }

    /// デフォルト値を取得
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            ColumnDefault::Present(value) => Some(value),
            ColumnDefault::Absent => None,
        }
    }
}

impl From<Option<String>> for ColumnDefault {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => ColumnDefault::Present(value),
            None => ColumnDefault::Absent,
        }
    }
}

impl From<ColumnDefault> for Option<String> {
    fn from(value: ColumnDefault) -> Self {
        match value {
            ColumnDefault::Present(value) => Some(value),
            ColumnDefault::Absent => None,
        }
    }
}

/// カラム定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// カラム名
    pub name: String,

    /// カラム型（データベースが返す生の型文字列）
    #[serde(rename = "type")]
    pub column_type: String,

    /// NULL許可フラグ
    pub nullable: bool,

    /// デフォルト値
    #[serde(default)]
    pub default: ColumnDefault,

    /// コメント
    #[serde(default)]
    pub comment: String,

    /// このカラムが参照元となっているリレーション
    #[serde(skip)]
    pub parent_relations: Vec<RelationId>,

    /// このカラムが参照先となっているリレーション
    #[serde(skip)]
    pub child_relations: Vec<RelationId>,
}

impl Column {
    /// 新しいカラムを作成
    pub fn new(name: &str, column_type: &str, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            column_type: column_type.to_string(),
            nullable,
            default: ColumnDefault::Absent,
            comment: String::new(),
            parent_relations: Vec::new(),
            child_relations: Vec::new(),
        }
    }

    /// デフォルト値を設定
    pub fn with_default(mut self, value: &str) -> Self {
        self.default = ColumnDefault::Present(value.to_string());
        self
    }

    /// コメントを設定
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }
}

/// インデックス定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// インデックス名
    pub name: String,
    /// 定義文
    pub def: String,
}

impl Index {
    /// 新しいインデックスを作成
    pub fn new(name: &str, def: &str) -> Self {
        Self {
            name: name.to_string(),
            def: def.to_string(),
        }
    }
}

/// 制約定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// 制約名
    pub name: String,
    /// 制約の種類（PRIMARY KEY, FOREIGN KEY など）
    #[serde(rename = "type")]
    pub constraint_type: String,
    /// 定義文
    pub def: String,
}

impl Constraint {
    /// 新しい制約を作成
    pub fn new(name: &str, constraint_type: &str, def: &str) -> Self {
        Self {
            name: name.to_string(),
            constraint_type: constraint_type.to_string(),
            def: def.to_string(),
        }
    }
}

/// トリガー定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// トリガー名
    pub name: String,
    /// 定義文
    pub def: String,
}

impl Trigger {
    /// 新しいトリガーを作成
    pub fn new(name: &str, def: &str) -> Self {
        Self {
            name: name.to_string(),
            def: def.to_string(),
        }
    }
}

/// テーブル定義
///
/// 単一のテーブル（またはビュー）の構造を表現します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// テーブル名
    pub name: String,

    /// テーブル種別（"BASE TABLE", "VIEW" など）
    #[serde(rename = "type")]
    pub table_type: String,

    /// コメント
    #[serde(default)]
    pub comment: String,

    /// カラム定義のリスト
    #[serde(default)]
    pub columns: Vec<Column>,

    /// インデックス定義のリスト
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// 制約定義のリスト
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// トリガー定義のリスト
    #[serde(default)]
    pub triggers: Vec<Trigger>,

    /// 定義文
    #[serde(default)]
    pub def: String,
}

impl Table {
    /// 新しいテーブルを作成
    pub fn new(name: &str, table_type: &str) -> Self {
        Self {
            name: name.to_string(),
            table_type: table_type.to_string(),
            comment: String::new(),
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            triggers: Vec::new(),
            def: String::new(),
        }
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// インデックスを追加
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// 制約を追加
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// トリガーを追加
    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// カラムを名前で検索
    ///
    /// 先頭から走査し、最初に一致したカラムを返します。
    ///
    /// # Errors
    ///
    /// 一致するカラムがない場合は `NotFoundError::Column`
    pub fn find_column_by_name(&self, name: &str) -> Result<&Column, NotFoundError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| NotFoundError::column(&self.name, name))
    }

    /// カラムを名前で検索（可変参照）
    pub fn find_column_by_name_mut(&mut self, name: &str) -> Result<&mut Column, NotFoundError> {
        let table_name = &self.name;
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| NotFoundError::column(table_name, name))
    }
}

/// リレーション定義
///
/// 参照元テーブル/カラム（`table`, `columns`）から
/// 参照先テーブル/カラム（`parent_table`, `parent_columns`）への有向辺。
/// テーブルとカラムは名前で参照します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// 参照元テーブル名
    pub table: String,

    /// 参照元カラム名のリスト
    pub columns: Vec<String>,

    /// 参照先テーブル名
    pub parent_table: String,

    /// 参照先カラム名のリスト（`columns` と位置で対応）
    pub parent_columns: Vec<String>,

    /// 定義文
    #[serde(default)]
    pub def: String,

    /// 追加データで宣言されたリレーションかどうか
    #[serde(default)]
    pub is_additional: bool,
}

impl Relation {
    /// 新しいリレーションを作成
    pub fn new(
        table: &str,
        columns: &[&str],
        parent_table: &str,
        parent_columns: &[&str],
        def: &str,
    ) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            parent_table: parent_table.to_string(),
            parent_columns: parent_columns.iter().map(|c| c.to_string()).collect(),
            def: def.to_string(),
            is_additional: false,
        }
    }
}

/// スキーマ定義
///
/// データベース全体のテーブルとリレーションを保持します。
/// リレーションの所有者は `relations` のみで、カラムはIDによる逆参照だけを持ちます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// スキーマ名
    pub name: String,

    /// テーブル定義のリスト
    #[serde(default)]
    pub tables: Vec<Table>,

    /// リレーション定義のリスト
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Schema {
    /// 新しいスキーマを作成
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// テーブルを追加
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// テーブルを名前で検索
    ///
    /// 先頭から走査し、最初に一致したテーブルを返します。
    ///
    /// # Errors
    ///
    /// 一致するテーブルがない場合は `NotFoundError::Table`
    pub fn find_table_by_name(&self, name: &str) -> Result<&Table, NotFoundError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| NotFoundError::table(name))
    }

    /// テーブルを名前で検索（可変参照）
    pub fn find_table_by_name_mut(&mut self, name: &str) -> Result<&mut Table, NotFoundError> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| NotFoundError::table(name))
    }

    /// IDからリレーションを取得
    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(id.index())
    }

    /// 次に追加されるリレーションのID
    pub fn next_relation_id(&self) -> RelationId {
        RelationId(self.relations.len())
    }

    /// 次に追加するリレーションのIDを確保
    ///
    /// 登録されなかったリレーションを指す逆参照を先に取り除くため、
    /// 失敗した追加の残骸が新しいリレーションに紐づくことはありません。
    pub fn reserve_relation_id(&mut self) -> RelationId {
        let id = self.next_relation_id();
        for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            column.parent_relations.retain(|r| r.index() < id.index());
            column.child_relations.retain(|r| r.index() < id.index());
        }
        id
    }

    /// カラムが参照元となっているリレーションを列挙
    pub fn parent_relations_of<'a>(
        &'a self,
        column: &'a Column,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        column
            .parent_relations
            .iter()
            .filter_map(move |id| self.relation(*id))
    }

    /// カラムが参照先となっているリレーションを列挙
    pub fn child_relations_of<'a>(
        &'a self,
        column: &'a Column,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        column
            .child_relations
            .iter()
            .filter_map(move |id| self.relation(*id))
    }

    /// 解決済みのリレーションをグラフに登録
    ///
    /// すべてのテーブル/カラムが解決できることを確認してから、
    /// `relations` への追加と各カラムへの逆参照の追加を行います。
    /// 重複排除は行いません。
    ///
    /// # Errors
    ///
    /// テーブルまたはカラムが存在しない場合は `NotFoundError`。このときスキーマは変更されません。
    pub fn link_relation(&mut self, relation: Relation) -> Result<RelationId, NotFoundError> {
        self.resolve_relation(&relation)?;

        let id = self.reserve_relation_id();
        self.attach_back_references(&relation, id)?;
        self.relations.push(relation);

        Ok(id)
    }

    /// すべてのカラムの逆参照を `relations` から再構築
    ///
    /// # Errors
    ///
    /// リレーションが存在しないテーブル/カラムを指している場合は `NotFoundError`
    pub fn rebuild_back_references(&mut self) -> Result<(), NotFoundError> {
        for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            column.parent_relations.clear();
            column.child_relations.clear();
        }

        let relations = std::mem::take(&mut self.relations);
        let result = relations
            .iter()
            .enumerate()
            .try_for_each(|(i, relation)| self.attach_back_references(relation, RelationId(i)));
        self.relations = relations;

        result
    }

    fn resolve_relation(&self, relation: &Relation) -> Result<(), NotFoundError> {
        let table = self.find_table_by_name(&relation.table)?;
        for name in &relation.columns {
            table.find_column_by_name(name)?;
        }
        let parent_table = self.find_table_by_name(&relation.parent_table)?;
        for name in &relation.parent_columns {
            parent_table.find_column_by_name(name)?;
        }
        Ok(())
    }

    fn attach_back_references(
        &mut self,
        relation: &Relation,
        id: RelationId,
    ) -> Result<(), NotFoundError> {
        let table = self.find_table_by_name_mut(&relation.table)?;
        for name in &relation.columns {
            table.find_column_by_name_mut(name)?.parent_relations.push(id);
        }

        let parent_table = self.find_table_by_name_mut(&relation.parent_table)?;
        for name in &relation.parent_columns {
            parent_table
                .find_column_by_name_mut(name)?
                .child_relations
                .push(id);
        }

        Ok(())
    }
}
