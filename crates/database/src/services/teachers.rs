use crate::{
    entities::{classes, lessons, teachers},
    services::ServiceError,
};
use chrono::Utc;
use log::{debug, info};
use models::input::{TeacherDraft, TeacherInput};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QueryTrait, TransactionTrait, prelude::Expr,
};
use uuid::Uuid;

pub struct TeacherService;

impl TeacherService {
    /// All teachers, ordered by surname then name
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<teachers::Model>, ServiceError> {
        Ok(teachers::Entity::find()
            .order_by_asc(teachers::Column::Surname)
            .order_by_asc(teachers::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<teachers::Model, ServiceError> {
        Self::find(db, id).await
    }

    pub(crate) async fn find<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<teachers::Model, ServiceError> {
        teachers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::TeacherNotFound(id))
    }

    pub async fn create(
        db: &DatabaseConnection,
        draft: &TeacherDraft,
    ) -> Result<teachers::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        Self::ensure_unique(&txn, &input, None).await?;

        let now = Utc::now().naive_utc();
        let teacher = teachers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            surname: Set(input.surname),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created teacher {}", teacher.id);
        Ok(teacher)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        draft: &TeacherDraft,
    ) -> Result<teachers::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        let existing = Self::find(&txn, id).await?;
        if existing.name == input.name && existing.surname == input.surname {
            return Err(ServiceError::NoChangesDetected);
        }
        Self::ensure_unique(&txn, &input, Some(id)).await?;

        let mut teacher: teachers::ActiveModel = existing.into();
        teacher.name = Set(input.name);
        teacher.surname = Set(input.surname);
        teacher.updated_at = Set(Utc::now().naive_utc());
        let teacher = teacher.update(&txn).await?;

        txn.commit().await?;
        info!("Updated teacher {id}");
        Ok(teacher)
    }

    /// Deletes a teacher, their lessons, and their main-teacher assignment
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        Self::find(&txn, id).await?;

        classes::Entity::update_many()
            .col_expr(
                classes::Column::MainTeacherId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(classes::Column::MainTeacherId.eq(id))
            .exec(&txn)
            .await?;
        let removed = lessons::Entity::delete_many()
            .filter(lessons::Column::TeacherId.eq(id))
            .exec(&txn)
            .await?;
        teachers::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            "Deleted teacher {id} and {} of their lessons",
            removed.rows_affected
        );
        Ok(())
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        input: &TeacherInput,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let duplicate = teachers::Entity::find()
            .filter(teachers::Column::Name.eq(input.name.as_str()))
            .filter(teachers::Column::Surname.eq(input.surname.as_str()))
            .apply_if(exclude, |query, id| {
                query.filter(teachers::Column::Id.ne(id))
            })
            .one(conn)
            .await?;

        match duplicate {
            Some(teacher) => {
                debug!("Teacher {} {} already exists", teacher.name, teacher.surname);
                Err(ServiceError::AlreadyExists {
                    entity: "Teacher",
                    field: "surname",
                    name: teacher.full_name(),
                })
            }
            None => Ok(()),
        }
    }
}
