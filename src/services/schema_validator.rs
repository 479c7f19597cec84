// スキーマバリデーターサービス
//
// スキーマグラフの構造的な整合性を検証するサービス。
// 名前の一意性、リレーションの参照整合性、カラムの逆参照の一致を確認します。

use crate::core::error::{ErrorLocation, ValidationError, ValidationResult};
use crate::core::schema::{RelationId, Schema, Table};
use std::collections::{BTreeMap, HashSet};

/// スキーマバリデーターサービス
#[derive(Debug, Clone)]
pub struct SchemaValidatorService {}

impl SchemaValidatorService {
    /// 新しいSchemaValidatorServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマグラフ全体の検証を実行
    pub fn validate(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.merge(self.validate_unique_names(schema));
        result.merge(self.validate_relations(schema));
        result.merge(self.validate_back_references(schema));

        result
    }

    /// テーブル名とテーブル内のカラム名の一意性を検証
    fn validate_unique_names(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        let mut table_names = HashSet::new();
        for table in &schema.tables {
            if !table_names.insert(table.name.as_str()) {
                result.add_error(ValidationError::Duplicate {
                    message: format!("Table '{}' is defined more than once", table.name),
                    location: Some(ErrorLocation::with_table(&table.name)),
                });
            }

            let mut column_names = HashSet::new();
            for column in &table.columns {
                if !column_names.insert(column.name.as_str()) {
                    result.add_error(ValidationError::Duplicate {
                        message: format!(
                            "Column '{}' is defined more than once in table '{}'",
                            column.name, table.name
                        ),
                        location: Some(ErrorLocation::with_column(&table.name, &column.name)),
                    });
                }
            }
        }

        result
    }

    /// リレーションが同じスキーマ内のテーブル/カラムを指しているかを検証
    fn validate_relations(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (index, relation) in schema.relations.iter().enumerate() {
            if relation.columns.len() != relation.parent_columns.len() {
                result.add_error(ValidationError::Relation {
                    message: format!(
                        "Relation '{}' has {} column(s) but {} parent column(s)",
                        relation.def,
                        relation.columns.len(),
                        relation.parent_columns.len()
                    ),
                    location: Some(ErrorLocation::with_relation(index)),
                });
            }

            self.check_side(schema, index, &relation.table, &relation.columns, &mut result);
            self.check_side(
                schema,
                index,
                &relation.parent_table,
                &relation.parent_columns,
                &mut result,
            );
        }

        result
    }

    fn check_side(
        &self,
        schema: &Schema,
        index: usize,
        table_name: &str,
        columns: &[String],
        result: &mut ValidationResult,
    ) {
        let table: &Table = match schema.find_table_by_name(table_name) {
            Ok(table) => table,
            Err(e) => {
                result.add_error(ValidationError::Reference {
                    message: format!("Relation #{} refers to a missing table: {}", index, e),
                    location: Some(ErrorLocation::with_relation(index)),
                });
                return;
            }
        };

        for column in columns {
            if let Err(e) = table.find_column_by_name(column) {
                result.add_error(ValidationError::Reference {
                    message: format!("Relation #{} refers to a missing column: {}", index, e),
                    location: Some(ErrorLocation {
                        table: Some(table_name.to_string()),
                        column: Some(column.clone()),
                        relation: Some(index),
                    }),
                });
            }
        }
    }

    /// カラムの逆参照がリレーションの集合と一致するかを検証
    fn validate_back_references(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        // (テーブル名, カラム名) -> 期待されるリレーションID
        let mut expected_parents: BTreeMap<(&str, &str), Vec<RelationId>> = BTreeMap::new();
        let mut expected_children: BTreeMap<(&str, &str), Vec<RelationId>> = BTreeMap::new();
        for (index, relation) in schema.relations.iter().enumerate() {
            for column in &relation.columns {
                expected_parents
                    .entry((relation.table.as_str(), column.as_str()))
                    .or_default()
                    .push(RelationId(index));
            }
            for column in &relation.parent_columns {
                expected_children
                    .entry((relation.parent_table.as_str(), column.as_str()))
                    .or_default()
                    .push(RelationId(index));
            }
        }

        for table in &schema.tables {
            for column in &table.columns {
                let key = (table.name.as_str(), column.name.as_str());
                let checks = [
                    ("parent", &column.parent_relations, expected_parents.get(&key)),
                    ("child", &column.child_relations, expected_children.get(&key)),
                ];

                for (side, actual, expected) in checks {
                    let mut actual = actual.clone();
                    let mut expected = expected.cloned().unwrap_or_default();
                    actual.sort();
                    expected.sort();

                    if actual != expected {
                        result.add_error(ValidationError::BackReference {
                            message: format!(
                                "Column '{}.{}' has {} relation link(s) {:?}, expected {:?}",
                                table.name,
                                column.name,
                                side,
                                ids(&actual),
                                ids(&expected)
                            ),
                            location: Some(ErrorLocation::with_column(&table.name, &column.name)),
                        });
                    }
                }
            }
        }

        result
    }
}

fn ids(list: &[RelationId]) -> Vec<usize> {
    list.iter().map(|id| id.index()).collect()
}

impl Default for SchemaValidatorService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, Relation};

    fn valid_schema() -> Schema {
        let mut schema = Schema::new("testdb");

        let mut users = Table::new("users", "BASE TABLE");
        users.add_column(Column::new("id", "integer", false));
        schema.add_table(users);

        let mut posts = Table::new("posts", "BASE TABLE");
        posts.add_column(Column::new("user_id", "integer", false));
        schema.add_table(posts);

        schema
            .link_relation(Relation::new("posts", &["user_id"], "users", &["id"], "fk"))
            .unwrap();
        schema
    }

    #[test]
    fn test_valid_schema() {
        let result = SchemaValidatorService::new().validate(&valid_schema());
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_empty_schema_is_valid() {
        assert!(SchemaValidatorService::new()
            .validate(&Schema::new("empty"))
            .is_valid());
    }

    #[test]
    fn test_duplicate_names() {
        let mut schema = valid_schema();
        schema.tables[0].add_column(Column::new("id", "bigint", false));
        schema.add_table(Table::new("posts", "VIEW"));

        let result = SchemaValidatorService::new().validate(&schema);
        assert_eq!(result.errors.iter().filter(|e| e.is_duplicate()).count(), 2);
    }

    #[test]
    fn test_relation_arity_mismatch() {
        let mut schema = valid_schema();
        schema.relations[0].parent_columns.push("id".to_string());

        let result = SchemaValidatorService::new().validate(&schema);
        assert!(result.errors.iter().any(|e| e.is_relation()));
    }

    #[test]
    fn test_relation_missing_reference() {
        let mut schema = valid_schema();
        schema.relations.push(Relation::new("posts", &["ghost"], "accounts", &["id"], "x"));

        let result = SchemaValidatorService::new().validate(&schema);
        let references = result.errors.iter().filter(|e| e.is_reference()).count();
        assert_eq!(references, 2);
    }

    #[test]
    fn test_dangling_back_reference() {
        let mut schema = valid_schema();
        schema.tables[1].columns[0].parent_relations.push(RelationId(1));

        let result = SchemaValidatorService::new().validate(&schema);
        assert_eq!(result.error_count(), 1);
        assert!(result.errors[0].is_back_reference());
        assert_eq!(
            result.errors[0].location().and_then(|l| l.column.as_deref()),
            Some("user_id")
        );
    }

    #[test]
    fn test_missing_back_reference() {
        let mut schema = valid_schema();
        schema.tables[0].columns[0].child_relations.clear();

        let result = SchemaValidatorService::new().validate(&schema);
        assert!(result.errors.iter().any(|e| e.is_back_reference()));
    }
}
