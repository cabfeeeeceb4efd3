use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipping_certificate_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub shipping_certificate_id: i64,
    pub certificate_id: i64,
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
        belongs_to = "super::course_certificates::Entity",
        from = "Column::CertificateId",
        to = "super::course_certificates::Column::Id",
        on_delete = "Cascade"
    )]
    Certificates,
}

impl Related<super::shipping_certificates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingCertificates.def()
    }
}

impl Related<super::course_certificates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
