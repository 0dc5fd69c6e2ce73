//! Keeps a class and its groups consistent.
//!
//! A class is either whole (no groups) or split into exactly two groups whose
//! sizes add up to the class size. Groups are stored with their position so
//! that editing a split class updates both rows in place and keeps their ids,
//! which lessons reference.

use crate::{
    entities::{classes, groups, lessons},
    services::{ServiceError, capacity, classes::ClassDetails},
};
use chrono::Utc;
use log::{debug, info};
use models::input::{GroupDraft, GroupInput, validate_split};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::Expr,
};
use std::collections::HashMap;
use uuid::Uuid;

/// One group of a requested split, at its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub position: i16,
    pub name: String,
    pub amount_of_students: i32,
}

/// The outcome of validating a split request against a class size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitPlan {
    Whole,
    Split([GroupSpec; 2]),
}

impl SplitPlan {
    /// Checks the group count, completeness, name clash and the headcount sum
    pub fn new(amount_of_students: i32, groups: &[GroupInput]) -> Result<Self, ServiceError> {
        let [first, second] = match groups {
            [] => return Ok(Self::Whole),
            [first, second] => [first, second],
            _ => return Err(ServiceError::InvalidGroupCount(groups.len())),
        };

        let spec = |position: i16, group: &GroupInput| match (&group.name, group.amount_of_students)
        {
            (Some(name), Some(amount)) => Ok(GroupSpec {
                position,
                name: name.clone(),
                amount_of_students: amount,
            }),
            _ => Err(ServiceError::GroupStudentsRequired),
        };
        let specs = [spec(0, first)?, spec(1, second)?];

        if specs[0].name == specs[1].name {
            return Err(ServiceError::AlreadyExists {
                entity: "Group",
                field: "groups",
                name: specs[0].name.clone(),
            });
        }

        let sum = specs[0].amount_of_students + specs[1].amount_of_students;
        if sum != amount_of_students {
            return Err(ServiceError::InvalidGroupStudentsSum {
                expected: amount_of_students,
                actual: sum,
            });
        }

        Ok(Self::Split(specs))
    }

    /// Keeps the `existing` groups (ordered by position) of a class that now
    /// has `amount_of_students`, re-checking that they still add up
    pub fn keep(amount_of_students: i32, existing: &[groups::Model]) -> Result<Self, ServiceError> {
        let current: Vec<GroupInput> = existing
            .iter()
            .map(|group| GroupInput::new(group.name.clone(), group.amount_of_students))
            .collect();
        Self::new(amount_of_students, &current)
    }

    /// Whether `existing` (ordered by position) already matches this plan
    pub fn matches(&self, existing: &[groups::Model]) -> bool {
        match self {
            Self::Whole => existing.is_empty(),
            Self::Split(specs) => {
                existing.len() == specs.len()
                    && existing.iter().zip(specs).all(|(group, spec)| {
                        group.position == spec.position
                            && group.name == spec.name
                            && group.amount_of_students == spec.amount_of_students
                    })
            }
        }
    }

    /// New sizes of the groups that are kept, by group id
    pub(crate) fn kept_sizes(&self, existing: &[groups::Model]) -> HashMap<Uuid, i32> {
        match self {
            Self::Whole => HashMap::new(),
            Self::Split(specs) => existing
                .iter()
                .filter_map(|group| {
                    specs
                        .iter()
                        .find(|spec| spec.position == group.position)
                        .map(|spec| (group.id, spec.amount_of_students))
                })
                .collect(),
        }
    }
}

pub struct SplitManager;

impl SplitManager {
    pub(crate) async fn groups_of<C: ConnectionTrait>(
        conn: &C,
        class_id: Uuid,
    ) -> Result<Vec<groups::Model>, ServiceError> {
        Ok(groups::Entity::find()
            .filter(groups::Column::ClassId.eq(class_id))
            .order_by_asc(groups::Column::Position)
            .all(conn)
            .await?)
    }

    /// Splits, re-splits or unsplits a class
    pub async fn set_split(
        db: &DatabaseConnection,
        class_id: Uuid,
        drafts: &[GroupDraft],
    ) -> Result<ClassDetails, ServiceError> {
        let inputs = validate_split(drafts)?;
        let txn = db.begin().await?;

        let class = classes::Entity::find_by_id(class_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::ClassNotFound(class_id))?;
        bump_revision(&txn, class_id).await?;

        let plan = SplitPlan::new(class.amount_of_students, &inputs)?;
        let existing = Self::groups_of(&txn, class_id).await?;
        capacity::ensure_class_fits(
            &txn,
            class_id,
            class.amount_of_students,
            &plan.kept_sizes(&existing),
        )
        .await?;

        let groups = Self::apply(&txn, class_id, &plan, existing).await?;
        txn.commit().await?;

        Ok(ClassDetails { class, groups })
    }

    /// Writes `plan` over the `existing` groups of a class. All checks must
    /// have passed already.
    pub(crate) async fn apply<C: ConnectionTrait>(
        conn: &C,
        class_id: Uuid,
        plan: &SplitPlan,
        existing: Vec<groups::Model>,
    ) -> Result<Vec<groups::Model>, ServiceError> {
        let now = Utc::now().naive_utc();

        match plan {
            SplitPlan::Whole if existing.is_empty() => Ok(Vec::new()),
            SplitPlan::Whole => {
                let ids: Vec<Uuid> = existing.iter().map(|g| g.id).collect();
                let removed = lessons::Entity::delete_many()
                    .filter(lessons::Column::GroupId.is_in(ids.clone()))
                    .exec(conn)
                    .await?;
                groups::Entity::delete_many()
                    .filter(groups::Column::Id.is_in(ids))
                    .exec(conn)
                    .await?;

                info!(
                    "Unsplit class {class_id}, removed {} group lessons",
                    removed.rows_affected
                );
                Ok(Vec::new())
            }
            SplitPlan::Split(specs) if existing.is_empty() => {
                let mut created = Vec::with_capacity(specs.len());
                for spec in specs {
                    let group = groups::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        class_id: Set(class_id),
                        name: Set(spec.name.clone()),
                        amount_of_students: Set(spec.amount_of_students),
                        position: Set(spec.position),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(conn)
                    .await?;
                    created.push(group);
                }

                info!("Split class {class_id} into 2 groups");
                Ok(created)
            }
            SplitPlan::Split(specs) => {
                if plan.matches(&existing) {
                    return Ok(existing);
                }

                // Renaming one group to the other's current name would trip the
                // (class, name) index halfway through, so park the names first.
                for group in &existing {
                    let mut parked: groups::ActiveModel = group.clone().into();
                    parked.name = Set(group.id.simple().to_string()[..20].to_string());
                    parked.update(conn).await?;
                }

                let mut updated = Vec::with_capacity(specs.len());
                for (group, spec) in existing.into_iter().zip(specs) {
                    let mut group: groups::ActiveModel = group.into();
                    group.name = Set(spec.name.clone());
                    group.amount_of_students = Set(spec.amount_of_students);
                    group.updated_at = Set(now);
                    updated.push(group.update(conn).await?);
                }

                debug!("Updated the groups of class {class_id} in place");
                Ok(updated)
            }
        }
    }
}

/// Serialises writers on one class: the row lock taken here is held until
/// the surrounding transaction ends
pub(crate) async fn bump_revision<C: ConnectionTrait>(
    conn: &C,
    class_id: Uuid,
) -> Result<(), ServiceError> {
    classes::Entity::update_many()
        .col_expr(
            classes::Column::Revision,
            Expr::col(classes::Column::Revision).add(1),
        )
        .filter(classes::Column::Id.eq(class_id))
        .exec(conn)
        .await?;

    Ok(())
}
