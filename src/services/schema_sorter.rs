// スキーマソートサービス
//
// スキーマグラフ内のすべてのコレクションを名前順に安定ソートし、
// イントロスペクションの返却順に依存しない出力を保証します。

use crate::core::schema::{Relation, RelationId, Schema};
use anyhow::Result;
use tracing::debug;

/// スキーマソートサービス
#[derive(Debug, Clone)]
pub struct SchemaSorterService;

impl SchemaSorterService {
    /// 新しいSchemaSorterServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// スキーマ全体をソート
    ///
    /// - テーブル内: カラム、インデックス、制約、トリガーを名前順
    /// - カラム内: 逆参照を、参照先リレーションの参照元テーブル名順
    /// - スキーマ: テーブルを名前順、リレーションを参照元テーブル名順
    ///
    /// すべて安定ソートです。リレーションの並び替えに合わせてカラムの逆参照IDも付け替えます。
    pub fn sort(&self, schema: &mut Schema) -> Result<()> {
        let relations = &schema.relations;
        let table_name_of =
            |id: &RelationId| relations.get(id.index()).map(|r| r.table.as_str());

        for table in &mut schema.tables {
            for column in &mut table.columns {
                column
                    .parent_relations
                    .sort_by(|a, b| table_name_of(a).cmp(&table_name_of(b)));
                column
                    .child_relations
                    .sort_by(|a, b| table_name_of(a).cmp(&table_name_of(b)));
            }
            table.columns.sort_by(|a, b| a.name.cmp(&b.name));
            table.indexes.sort_by(|a, b| a.name.cmp(&b.name));
            table.constraints.sort_by(|a, b| a.name.cmp(&b.name));
            table.triggers.sort_by(|a, b| a.name.cmp(&b.name));
        }

        schema.tables.sort_by(|a, b| a.name.cmp(&b.name));
        self.sort_relations(schema);

        debug!(
            tables = schema.tables.len(),
            relations = schema.relations.len(),
            "Sorted schema"
        );
        Ok(())
    }

    /// リレーションを参照元テーブル名順に並べ、逆参照IDを新しい位置に付け替える
    fn sort_relations(&self, schema: &mut Schema) {
        let mut order: Vec<usize> = (0..schema.relations.len()).collect();
        order.sort_by(|&a, &b| schema.relations[a].table.cmp(&schema.relations[b].table));

        // 旧位置 -> 新位置
        let mut remap = vec![0; order.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = new_index;
        }

        let mut slots: Vec<Option<Relation>> =
            std::mem::take(&mut schema.relations).into_iter().map(Some).collect();
        schema.relations = order
            .iter()
            .filter_map(|&old_index| slots[old_index].take())
            .collect();

        let rewrite = |id: &mut RelationId| {
            // 未登録のIDはそのまま残す
            if let Some(&new_index) = remap.get(id.index()) {
                *id = RelationId(new_index);
            }
        };
        for column in schema.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            column.parent_relations.iter_mut().for_each(rewrite);
            column.child_relations.iter_mut().for_each(rewrite);
        }
    }
}

impl Default for SchemaSorterService {
    fn default() -> Self {
        Self::new()
    }
}
