// CLIコマンドハンドラー

pub mod check;
pub mod doc;
