use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub shipping_certificate_id: i64,
    pub user_id: i64,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_cost: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipping_certificates::Entity",
        from = "Column::ShippingCertificateId",
        to = "super::shipping_certificates::Column::Id",
        on_delete = "Cascade"
    )]
    ShippingCertificates,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::shipping_certificates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingCertificates.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
