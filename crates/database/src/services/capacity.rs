//! Re-checks that every lesson still fits its room after a headcount or
//! capacity change.

use crate::{
    entities::{classes, groups, lessons, rooms},
    services::ServiceError,
};
use log::debug;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;
use uuid::Uuid;

/// Students attending each lesson of `lessons`
pub(crate) async fn headcounts<C: ConnectionTrait>(
    conn: &C,
    lessons: &[lessons::Model],
) -> Result<HashMap<Uuid, i32>, ServiceError> {
    let class_ids: Vec<Uuid> = lessons.iter().map(|l| l.class_id).collect();
    let group_ids: Vec<Uuid> = lessons.iter().filter_map(|l| l.group_id).collect();

    let classes: HashMap<Uuid, i32> = classes::Entity::find()
        .filter(classes::Column::Id.is_in(class_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.amount_of_students))
        .collect();
    let groups: HashMap<Uuid, i32> = groups::Entity::find()
        .filter(groups::Column::Id.is_in(group_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|g| (g.id, g.amount_of_students))
        .collect();

    Ok(lessons
        .iter()
        .filter_map(|lesson| {
            let attending = match lesson.group_id {
                Some(group_id) => groups.get(&group_id),
                None => classes.get(&lesson.class_id),
            };
            attending.map(|n| (lesson.id, *n))
        })
        .collect())
}

/// Fails with `RoomTooSmall` if `room` shrunk to `capacity` can no longer
/// hold one of its lessons
pub(crate) async fn ensure_room_fits<C: ConnectionTrait>(
    conn: &C,
    room: &rooms::Model,
    capacity: i32,
) -> Result<(), ServiceError> {
    let lessons = lessons::Entity::find()
        .filter(lessons::Column::RoomId.eq(room.id))
        .all(conn)
        .await?;

    let required = headcounts(conn, &lessons)
        .await?
        .into_values()
        .max()
        .unwrap_or_default();

    if required > capacity {
        debug!("Room {} cannot shrink to {capacity}, a lesson has {required}", room.id);
        return Err(ServiceError::RoomTooSmall {
            room: room.name.clone(),
            capacity,
            required,
        });
    }

    Ok(())
}

/// Fails with `RoomTooSmall` if a lesson of the class would no longer fit
/// its room with the given class size and group sizes (by group id)
pub(crate) async fn ensure_class_fits<C: ConnectionTrait>(
    conn: &C,
    class_id: Uuid,
    amount_of_students: i32,
    group_sizes: &HashMap<Uuid, i32>,
) -> Result<(), ServiceError> {
    let lessons = lessons::Entity::find()
        .filter(lessons::Column::ClassId.eq(class_id))
        .find_also_related(rooms::Entity)
        .all(conn)
        .await?;

    for (lesson, room) in lessons {
        let Some(room) = room else { continue };
        let required = match lesson.group_id {
            Some(group_id) => match group_sizes.get(&group_id) {
                Some(size) => *size,
                None => continue,
            },
            None => amount_of_students,
        };

        if required > room.capacity {
            debug!("Class {class_id} would overflow room {} with {required}", room.id);
            return Err(ServiceError::RoomTooSmall {
                room: room.name,
                capacity: room.capacity,
                required,
            });
        }
    }

    Ok(())
}
