use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ledger row per source document. `links` is a JSON object mapping
/// language code to the destination URL once that language completes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translation_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, column_type = "Text")]
    pub source_id: String,
    #[sea_orm(column_type = "Text")]
    pub source_url: String,
    pub links: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
