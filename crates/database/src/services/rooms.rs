use crate::{
    entities::{lessons, rooms},
    services::{ServiceError, capacity},
};
use chrono::Utc;
use log::{debug, info};
use models::input::RoomDraft;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

pub struct RoomService;

impl RoomService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<rooms::Model>, ServiceError> {
        Ok(rooms::Entity::find()
            .order_by_asc(rooms::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<rooms::Model, ServiceError> {
        Self::find(db, id).await
    }

    pub(crate) async fn find<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<rooms::Model, ServiceError> {
        rooms::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::RoomNotFound(id))
    }

    pub async fn create(
        db: &DatabaseConnection,
        draft: &RoomDraft,
    ) -> Result<rooms::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        Self::ensure_unique(&txn, &input.name, None).await?;

        let now = Utc::now().naive_utc();
        let room = rooms::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            capacity: Set(input.capacity),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created room {}", room.id);
        Ok(room)
    }

    /// Updates a room; shrinking it below the size of a lesson held there is
    /// rejected
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        draft: &RoomDraft,
    ) -> Result<rooms::Model, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        let existing = Self::find(&txn, id).await?;
        if existing.name == input.name && existing.capacity == input.capacity {
            return Err(ServiceError::NoChangesDetected);
        }
        Self::ensure_unique(&txn, &input.name, Some(id)).await?;
        if input.capacity < existing.capacity {
            capacity::ensure_room_fits(&txn, &existing, input.capacity).await?;
        }

        let mut room: rooms::ActiveModel = existing.into();
        room.name = Set(input.name);
        room.capacity = Set(input.capacity);
        room.updated_at = Set(Utc::now().naive_utc());
        let room = room.update(&txn).await?;

        txn.commit().await?;
        info!("Updated room {id}");
        Ok(room)
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        Self::find(&txn, id).await?;

        let removed = lessons::Entity::delete_many()
            .filter(lessons::Column::RoomId.eq(id))
            .exec(&txn)
            .await?;
        rooms::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!("Deleted room {id} and {} lessons", removed.rows_affected);
        Ok(())
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let duplicate = rooms::Entity::find()
            .filter(rooms::Column::Name.eq(name))
            .apply_if(exclude, |query, id| query.filter(rooms::Column::Id.ne(id)))
            .one(conn)
            .await?;

        if duplicate.is_some() {
            debug!("Room {name} already exists");
            return Err(ServiceError::AlreadyExists {
                entity: "Room",
                field: "name",
                name: name.to_string(),
            });
        }

        Ok(())
    }
}
