use crate::{
    entities::{lessons, subjects},
    services::ServiceError,
};
use chrono::Utc;
use log::{debug, info};
use models::input::SubjectDraft;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

pub struct SubjectService;

impl SubjectService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<subjects::Model>, ServiceError> {
        Ok(subjects::Entity::find()
            .order_by_asc(subjects::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<subjects::Model, ServiceError> {
        Self::find(db, id).await
    }

    pub(crate) async fn find<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<subjects::Model, ServiceError> {
        subjects::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::SubjectNotFound(id))
    }

    pub async fn create(
        db: &DatabaseConnection,
        draft: &SubjectDraft,
    ) -> Result<subjects::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        Self::ensure_unique(&txn, &input.name, None).await?;

        let now = Utc::now().naive_utc();
        let subject = subjects::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created subject {}", subject.id);
        Ok(subject)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        draft: &SubjectDraft,
    ) -> Result<subjects::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        let existing = Self::find(&txn, id).await?;
        if existing.name == input.name {
            return Err(ServiceError::NoChangesDetected);
        }
        Self::ensure_unique(&txn, &input.name, Some(id)).await?;

        let mut subject: subjects::ActiveModel = existing.into();
        subject.name = Set(input.name);
        subject.updated_at = Set(Utc::now().naive_utc());
        let subject = subject.update(&txn).await?;

        txn.commit().await?;
        info!("Updated subject {id}");
        Ok(subject)
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        Self::find(&txn, id).await?;

        let removed = lessons::Entity::delete_many()
            .filter(lessons::Column::SubjectId.eq(id))
            .exec(&txn)
            .await?;
        subjects::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!("Deleted subject {id} and {} lessons", removed.rows_affected);
        Ok(())
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let duplicate = subjects::Entity::find()
            .filter(subjects::Column::Name.eq(name))
            .apply_if(exclude, |query, id| {
                query.filter(subjects::Column::Id.ne(id))
            })
            .one(conn)
            .await?;

        if duplicate.is_some() {
            debug!("Subject {name} already exists");
            return Err(ServiceError::AlreadyExists {
                entity: "Subject",
                field: "name",
                name: name.to_string(),
            });
        }

        Ok(())
    }
}
