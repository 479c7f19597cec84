// 追加データマージサービス
//
// 宣言的に記述されたリレーションとコメントをスキーマへ反映するサービス。
// 名前解決はSchema/Tableの検索を使い、リレーションはカラムの逆参照と同時にリンクします。

use crate::core::additional_data::{AdditionalComment, AdditionalData, AdditionalRelation};
use crate::core::error::IoError;
use crate::core::schema::{Relation, Schema};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const ADD_RELATION: &str = "failed to add relation";
const ADD_TABLE_COMMENT: &str = "failed to add table comment";
const ADD_COLUMN_COMMENT: &str = "failed to add column comment";
const LOAD_ADDITIONAL_DATA: &str = "failed to load additional data";

/// 追加データマージサービス
#[derive(Debug, Clone)]
pub struct AdditionalDataService {}

impl AdditionalDataService {
    /// 新しいAdditionalDataServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// ファイルから追加データを読み込み、スキーマにマージ
    ///
    /// パスは絶対パスに解決してから読み込みます。
    ///
    /// # Errors
    ///
    /// すべてのエラーは "failed to load additional data" でラップされます。
    pub fn load_additional_data(&self, schema: &mut Schema, path: &Path) -> Result<()> {
        let buf = self.read_file(path).context(LOAD_ADDITIONAL_DATA)?;
        self.add_additional_data(schema, &buf)
            .context(LOAD_ADDITIONAL_DATA)
    }

    /// ファイルから追加データを読み込み、全件成功した場合のみスキーマに反映
    pub fn load_additional_data_atomic(&self, schema: &mut Schema, path: &Path) -> Result<()> {
        let buf = self.read_file(path).context(LOAD_ADDITIONAL_DATA)?;
        let data = AdditionalData::from_slice(&buf).context(LOAD_ADDITIONAL_DATA)?;
        self.merge_atomic(schema, &data)
            .context(LOAD_ADDITIONAL_DATA)
    }

    /// YAMLバイト列をデコードしてスキーマにマージ
    ///
    /// リレーションをすべて処理してからコメントを処理します。
    /// 途中で失敗した場合、それまでの変更（失敗したレコードの途中までの逆参照を含む）は残ります。
    pub fn add_additional_data(&self, schema: &mut Schema, buf: &[u8]) -> Result<()> {
        let data = AdditionalData::from_slice(buf)?;
        self.merge(schema, &data)
    }

    /// デコード済みの追加データをスキーマにマージ
    pub fn merge(&self, schema: &mut Schema, data: &AdditionalData) -> Result<()> {
        self.add_relations(schema, &data.relations)?;
        self.add_comments(schema, &data.comments)?;

        info!(
            relations = data.relations.len(),
            comments = data.comments.len(),
            "Merged additional data"
        );
        Ok(())
    }

    /// 追加データをスキーマのコピーに適用し、成功した場合のみ反映
    ///
    /// 失敗した場合、`schema` は呼び出し前の状態のままです。
    pub fn merge_atomic(&self, schema: &mut Schema, data: &AdditionalData) -> Result<()> {
        let mut staged = schema.clone();
        self.merge(&mut staged, data)?;
        *schema = staged;
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = std::path::absolute(path).map_err(|e| IoError::PathResolve {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
        debug!(path = %full_path.display(), "Loading additional data");

        let buf = fs::read(&full_path).map_err(|e| IoError::FileRead {
            path: full_path.display().to_string(),
            cause: e.to_string(),
        })?;
        Ok(buf)
    }

    fn add_relations(&self, schema: &mut Schema, relations: &[AdditionalRelation]) -> Result<()> {
        for r in relations {
            self.add_relation(schema, r).context(ADD_RELATION)?;
        }
        Ok(())
    }

    fn add_relation(&self, schema: &mut Schema, r: &AdditionalRelation) -> Result<()> {
        let id = schema.reserve_relation_id();
        let mut relation = Relation {
            table: String::new(),
            columns: Vec::with_capacity(r.columns.len()),
            parent_table: String::new(),
            parent_columns: Vec::with_capacity(r.parent_columns.len()),
            def: r.effective_def().to_string(),
            is_additional: true,
        };

        let table = schema.find_table_by_name_mut(&r.table)?;
        relation.table = table.name.clone();
        for name in &r.columns {
            let column = table.find_column_by_name_mut(name)?;
            relation.columns.push(column.name.clone());
            column.parent_relations.push(id);
        }

        let parent_table = schema.find_table_by_name_mut(&r.parent_table)?;
        relation.parent_table = parent_table.name.clone();
        for name in &r.parent_columns {
            let column = parent_table.find_column_by_name_mut(name)?;
            relation.parent_columns.push(column.name.clone());
            column.child_relations.push(id);
        }

        debug!(
            table = %relation.table,
            parent_table = %relation.parent_table,
            "Added additional relation"
        );
        schema.relations.push(relation);
        Ok(())
    }

    fn add_comments(&self, schema: &mut Schema, comments: &[AdditionalComment]) -> Result<()> {
        for c in comments {
            let table = schema
                .find_table_by_name_mut(&c.table)
                .context(ADD_TABLE_COMMENT)?;
            if !c.table_comment.is_empty() {
                table.comment = c.table_comment.clone();
            }

            for (name, comment) in &c.column_comments {
                let column = table
                    .find_column_by_name_mut(name)
                    .context(ADD_COLUMN_COMMENT)?;
                column.comment = comment.clone();
            }
        }
        Ok(())
    }
}

impl Default for AdditionalDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::additional_data::ADDITIONAL_RELATION_DEF;
    use crate::core::error::{AdditionalDataError, NotFoundError};
    use crate::core::schema::{Column, RelationId, Table};
    use std::collections::HashMap;

    fn users_posts() -> Schema {
        let mut schema = Schema::new("testdb");

        let mut users = Table::new("users", "BASE TABLE");
        users.add_column(Column::new("id", "integer", false));
        users.add_column(Column::new("tenant_id", "integer", false));
        users.comment = "original".to_string();
        schema.add_table(users);

        let mut posts = Table::new("posts", "BASE TABLE");
        posts.add_column(Column::new("id", "integer", false));
        posts.add_column(Column::new("user_id", "integer", false));
        posts.add_column(Column::new("tenant_id", "integer", false).with_comment("tenant"));
        schema.add_table(posts);

        schema
    }

    fn relation(table: &str, columns: &[&str], parent: &str, parents: &[&str]) -> AdditionalRelation {
        AdditionalRelation {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            parent_table: parent.to_string(),
            parent_columns: parents.iter().map(|c| c.to_string()).collect(),
            def: String::new(),
        }
    }

    #[test]
    fn test_merge_single_relation() {
        let mut schema = users_posts();
        let data = AdditionalData {
            relations: vec![relation("posts", &["user_id"], "users", &["id"])],
            comments: vec![],
        };

        AdditionalDataService::new().merge(&mut schema, &data).unwrap();

        assert_eq!(schema.relations.len(), 1);
        let r = &schema.relations[0];
        assert!(r.is_additional);
        assert_eq!(r.def, ADDITIONAL_RELATION_DEF);
        assert_eq!(schema.tables[1].columns[1].parent_relations, vec![RelationId(0)]);
        assert_eq!(schema.tables[0].columns[0].child_relations, vec![RelationId(0)]);
    }

    #[test]
    fn test_merge_composite_relation_with_def() {
        let mut schema = users_posts();
        let mut r = relation("posts", &["user_id", "tenant_id"], "users", &["id", "tenant_id"]);
        r.def = "posts(user_id, tenant_id) -> users(id, tenant_id)".to_string();
        let data = AdditionalData {
            relations: vec![r],
            comments: vec![],
        };

        AdditionalDataService::new().merge(&mut schema, &data).unwrap();

        let merged = &schema.relations[0];
        assert_eq!(merged.columns, vec!["user_id", "tenant_id"]);
        assert_eq!(merged.parent_columns, vec!["id", "tenant_id"]);
        assert_eq!(merged.def, "posts(user_id, tenant_id) -> users(id, tenant_id)");
        for column in &schema.tables[1].columns[1..] {
            assert_eq!(column.parent_relations, vec![RelationId(0)]);
        }
        for column in &schema.tables[0].columns {
            assert_eq!(column.child_relations, vec![RelationId(0)]);
        }
    }

    #[test]
    fn test_missing_table_aborts_merge() {
        let mut schema = users_posts();
        let data = AdditionalData {
            relations: vec![
                relation("posts", &["user_id"], "users", &["id"]),
                relation("comments", &["post_id"], "posts", &["id"]),
            ],
            comments: vec![AdditionalComment {
                table: "users".to_string(),
                table_comment: "never applied".to_string(),
                column_comments: HashMap::new(),
            }],
        };

        let err = AdditionalDataService::new()
            .merge(&mut schema, &data)
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to add relation");
        assert_eq!(
            err.downcast_ref::<NotFoundError>(),
            Some(&NotFoundError::table("comments"))
        );
        // 先行レコードは反映済み、失敗したレコードとコメントは未反映
        assert_eq!(schema.relations.len(), 1);
        assert_eq!(schema.tables[0].comment, "original");
    }

    #[test]
    fn test_partial_record_leaves_back_references() {
        let mut schema = users_posts();
        let data = AdditionalData {
            relations: vec![relation("posts", &["user_id", "missing"], "users", &["id", "id"])],
            comments: vec![],
        };

        let err = AdditionalDataService::new()
            .merge(&mut schema, &data)
            .unwrap_err();

        assert!(format!("{:#}", err).contains("not found column 'posts.missing'"));
        assert!(schema.relations.is_empty());
        assert_eq!(schema.tables[1].columns[1].parent_relations, vec![RelationId(0)]);
        assert!(schema.relation(RelationId(0)).is_none());
    }

    #[test]
    fn test_failed_record_ids_are_not_reused() {
        let mut schema = users_posts();
        let service = AdditionalDataService::new();
        let failed = AdditionalData {
            relations: vec![relation("posts", &["user_id", "missing"], "users", &["id", "id"])],
            comments: vec![],
        };
        let succeeded = AdditionalData {
            relations: vec![relation("posts", &["tenant_id"], "users", &["tenant_id"])],
            comments: vec![],
        };

        assert!(service.merge(&mut schema, &failed).is_err());
        service.merge(&mut schema, &succeeded).unwrap();

        assert_eq!(schema.relations.len(), 1);
        assert!(schema.tables[1].columns[1].parent_relations.is_empty());
        assert_eq!(schema.tables[1].columns[2].parent_relations, vec![RelationId(0)]);
        assert_eq!(schema.tables[0].columns[1].child_relations, vec![RelationId(0)]);
    }

    #[test]
    fn test_merge_atomic_rolls_back() {
        let mut schema = users_posts();
        let before = schema.clone();
        let data = AdditionalData {
            relations: vec![
                relation("posts", &["user_id"], "users", &["id"]),
                relation("posts", &["user_id"], "accounts", &["id"]),
            ],
            comments: vec![],
        };

        assert!(AdditionalDataService::new()
            .merge_atomic(&mut schema, &data)
            .is_err());
        assert_eq!(schema, before);
    }

    #[test]
    fn test_comment_overwrite_rules() {
        let mut schema = users_posts();
        let service = AdditionalDataService::new();

        let mut column_comments = HashMap::new();
        column_comments.insert("tenant_id".to_string(), String::new());
        column_comments.insert("id".to_string(), "Post ID".to_string());
        let data = AdditionalData {
            relations: vec![],
            comments: vec![
                AdditionalComment {
                    table: "users".to_string(),
                    table_comment: String::new(),
                    column_comments: HashMap::new(),
                },
                AdditionalComment {
                    table: "posts".to_string(),
                    table_comment: "Blog posts".to_string(),
                    column_comments,
                },
            ],
        };

        service.merge(&mut schema, &data).unwrap();

        assert_eq!(schema.tables[0].comment, "original");
        assert_eq!(schema.tables[1].comment, "Blog posts");
        assert_eq!(schema.tables[1].columns[0].comment, "Post ID");
        assert_eq!(schema.tables[1].columns[2].comment, "");
    }

    #[test]
    fn test_comment_errors_are_labelled() {
        let service = AdditionalDataService::new();

        let mut schema = users_posts();
        let data = AdditionalData {
            relations: vec![],
            comments: vec![AdditionalComment {
                table: "nope".to_string(),
                ..AdditionalComment::default()
            }],
        };
        let err = service.merge(&mut schema, &data).unwrap_err();
        assert_eq!(err.to_string(), "failed to add table comment");

        let mut column_comments = HashMap::new();
        column_comments.insert("nope".to_string(), "x".to_string());
        let data = AdditionalData {
            relations: vec![],
            comments: vec![AdditionalComment {
                table: "users".to_string(),
                table_comment: String::new(),
                column_comments,
            }],
        };
        let err = service.merge(&mut schema, &data).unwrap_err();
        assert_eq!(err.to_string(), "failed to add column comment");
        assert!(err.downcast_ref::<NotFoundError>().is_some_and(|e| e.is_column()));
    }

    #[test]
    fn test_add_additional_data_decode_error() {
        let mut schema = users_posts();
        let err = AdditionalDataService::new()
            .add_additional_data(&mut schema, b"comments: {table: [1, 2")
            .unwrap_err();

        assert!(err.downcast_ref::<AdditionalDataError>().is_some());
        assert!(schema.relations.is_empty());
    }
}
