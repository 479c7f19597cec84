// Services Layer
// スキーマグラフに対するマージ、ソート、検証、シリアライズを行うサービス層

pub mod additional_data;
pub mod schema_serializer;
pub mod schema_sorter;
pub mod schema_validator;
