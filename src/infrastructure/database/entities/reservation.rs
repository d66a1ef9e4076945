//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub business_id: String,

    /// `None` for walk-ins
    #[sea_orm(nullable)]
    pub resource_id: Option<String>,
    #[sea_orm(nullable)]
    pub client_id: Option<String>,

    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    #[sea_orm(nullable)]
    pub contact_dni: Option<String>,

    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub number_of_guests: i32,

    #[sea_orm(nullable)]
    pub notes: Option<String>,

    /// Reservation status: Pending, Confirmed, Cancelled
    pub status: String,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business::Entity",
        from = "Column::BusinessId",
        to = "super::business::Column::Id"
    )]
    Business,
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl Related<super::business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
