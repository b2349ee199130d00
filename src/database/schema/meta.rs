use redb::TableDefinition;

// 資料庫層級的設定，例如 schema 版本與下一個 id
pub const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

pub const SCHEMA_VERSION_KEY: &str = "schema_version";

pub const NEXT_ID_KEY: &str = "next_id";
