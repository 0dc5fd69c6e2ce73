use crate::{
    entities::{classes, groups, lessons},
    services::{
        ServiceError, capacity,
        split::{SplitManager, SplitPlan, bump_revision},
        teachers::TeacherService,
    },
};
use chrono::Utc;
use log::{debug, info};
use models::input::ClassDraft;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QueryTrait, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A class together with its groups, ordered by position
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDetails {
    pub class: classes::Model,
    pub groups: Vec<groups::Model>,
}

impl ClassDetails {
    pub fn split_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}

pub struct ClassService;

impl ClassService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<ClassDetails>, ServiceError> {
        let classes = classes::Entity::find()
            .order_by_asc(classes::Column::Name)
            .all(db)
            .await?;

        let mut groups_by_class: HashMap<Uuid, Vec<groups::Model>> = HashMap::new();
        for group in groups::Entity::find()
            .order_by_asc(groups::Column::Position)
            .all(db)
            .await?
        {
            groups_by_class.entry(group.class_id).or_default().push(group);
        }

        Ok(classes
            .into_iter()
            .map(|class| ClassDetails {
                groups: groups_by_class.remove(&class.id).unwrap_or_default(),
                class,
            })
            .collect())
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ClassDetails, ServiceError> {
        let class = Self::find(db, id).await?;
        let groups = SplitManager::groups_of(db, id).await?;
        Ok(ClassDetails { class, groups })
    }

    pub(crate) async fn find<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<classes::Model, ServiceError> {
        classes::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::ClassNotFound(id))
    }

    /// Creates a class, split into groups when the draft lists two
    pub async fn create(
        db: &DatabaseConnection,
        draft: &ClassDraft,
    ) -> Result<ClassDetails, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        Self::ensure_unique(&txn, &input.name, None).await?;
        Self::ensure_main_teacher(&txn, input.main_teacher_id, None).await?;
        let plan = SplitPlan::new(
            input.amount_of_students,
            input.groups.as_deref().unwrap_or_default(),
        )?;

        let now = Utc::now().naive_utc();
        let class = classes::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            main_teacher_id: Set(input.main_teacher_id),
            amount_of_students: Set(input.amount_of_students),
            revision: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        let groups = SplitManager::apply(&txn, class.id, &plan, Vec::new()).await?;

        txn.commit().await?;
        info!("Created class {}", class.id);
        Ok(ClassDetails { class, groups })
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        draft: &ClassDraft,
    ) -> Result<ClassDetails, ServiceError> {
        let input = draft.validate()?;
        let txn = db.begin().await?;

        let existing = Self::find(&txn, id).await?;
        let existing_groups = SplitManager::groups_of(&txn, id).await?;
        let plan = match input.groups.as_deref() {
            Some(groups) => SplitPlan::new(input.amount_of_students, groups)?,
            None => SplitPlan::keep(input.amount_of_students, &existing_groups)?,
        };

        if existing.name == input.name
            && existing.main_teacher_id == input.main_teacher_id
            && existing.amount_of_students == input.amount_of_students
            && plan.matches(&existing_groups)
        {
            return Err(ServiceError::NoChangesDetected);
        }

        Self::ensure_unique(&txn, &input.name, Some(id)).await?;
        Self::ensure_main_teacher(&txn, input.main_teacher_id, Some(id)).await?;
        bump_revision(&txn, id).await?;
        capacity::ensure_class_fits(
            &txn,
            id,
            input.amount_of_students,
            &plan.kept_sizes(&existing_groups),
        )
        .await?;

        let mut class: classes::ActiveModel = existing.into();
        class.name = Set(input.name);
        class.main_teacher_id = Set(input.main_teacher_id);
        class.amount_of_students = Set(input.amount_of_students);
        class.updated_at = Set(Utc::now().naive_utc());
        let class = class.update(&txn).await?;
        let groups = SplitManager::apply(&txn, id, &plan, existing_groups).await?;

        txn.commit().await?;
        info!("Updated class {id}");
        Ok(ClassDetails { class, groups })
    }

    /// Deletes a class with its lessons and groups
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        Self::find(&txn, id).await?;

        let removed = lessons::Entity::delete_many()
            .filter(lessons::Column::ClassId.eq(id))
            .exec(&txn)
            .await?;
        groups::Entity::delete_many()
            .filter(groups::Column::ClassId.eq(id))
            .exec(&txn)
            .await?;
        classes::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!("Deleted class {id} and {} lessons", removed.rows_affected);
        Ok(())
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let duplicate = classes::Entity::find()
            .filter(classes::Column::Name.eq(name))
            .apply_if(exclude, |query, id| {
                query.filter(classes::Column::Id.ne(id))
            })
            .one(conn)
            .await?;

        if duplicate.is_some() {
            debug!("Class {name} already exists");
            return Err(ServiceError::AlreadyExists {
                entity: "Class",
                field: "name",
                name: name.to_string(),
            });
        }

        Ok(())
    }

    /// A main teacher must exist and lead no other class
    async fn ensure_main_teacher<C: ConnectionTrait>(
        conn: &C,
        teacher_id: Option<Uuid>,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let Some(teacher_id) = teacher_id else {
            return Ok(());
        };
        TeacherService::find(conn, teacher_id).await?;

        let led = classes::Entity::find()
            .filter(classes::Column::MainTeacherId.eq(teacher_id))
            .apply_if(exclude, |query, id| {
                query.filter(classes::Column::Id.ne(id))
            })
            .one(conn)
            .await?;

        match led {
            Some(class) => {
                debug!("Teacher {teacher_id} already leads class {}", class.id);
                Err(ServiceError::TeacherAlreadyAssigned {
                    teacher_id,
                    class_name: class.name,
                })
            }
            None => Ok(()),
        }
    }
}
