mod common;

use common::{School, setup, slot, split_class};
use database::{
    entities::classes,
    services::{
        ServiceError,
        lessons::{LessonFilter, LessonService, PlacementMode},
    },
};
use models::{days::DayOfWeek, scope::LessonScope};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

#[tokio::test]
async fn test_place_and_list_lesson() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;

    let at = slot(DayOfWeek::Monday, 0);
    let lesson = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    assert_eq!(lesson.slot(), at);
    assert_eq!(lesson.scope(), LessonScope::WholeClass);

    let listed = LessonService::list(
        &db,
        LessonFilter {
            class_id: Some(class.class.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(listed, vec![lesson]);
}

#[tokio::test]
async fn test_room_too_small_for_class() {
    let db = setup().await;
    let school = School::new(&db).await;
    let small = common::room(&db, "S1", 20).await;
    let class = common::class(&db, "1A", 25).await;

    let candidate = models::input::LessonCandidate {
        room_id: small.id,
        ..school.lesson(class.class.id, slot(DayOfWeek::Monday, 1), 0, 0)
    };
    let err = LessonService::place_lesson(&db, candidate, PlacementMode::Create)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::RoomTooSmall {
            capacity: 20,
            required: 25,
            ..
        }
    ));
}

#[tokio::test]
async fn test_groups_share_a_slot_but_whole_class_does_not() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = split_class(&db, "2B", [("G1", 15), ("G2", 15)]).await;
    let (g1, g2) = (&class.groups[0], &class.groups[1]);
    let at = slot(DayOfWeek::Monday, 3);

    LessonService::place_lesson(&db, school.group_lesson(g1, at, 0, 0), PlacementMode::Create)
        .await
        .unwrap();
    LessonService::place_lesson(&db, school.group_lesson(g2, at, 1, 1), PlacementMode::Create)
        .await
        .unwrap();

    let err = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 2, 2),
        PlacementMode::Create,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "ClassHasLessonAtThisTime");
}

#[tokio::test]
async fn test_whole_class_blocks_group_lesson() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = split_class(&db, "2B", [("G1", 15), ("G2", 15)]).await;
    let at = slot(DayOfWeek::Tuesday, 4);

    LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    let err = LessonService::place_lesson(
        &db,
        school.group_lesson(&class.groups[1], at, 1, 1),
        PlacementMode::Create,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "ClassHasLessonAtThisTime");
}

#[tokio::test]
async fn test_same_class_slot_is_not_overwritten_on_create() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;
    let at = slot(DayOfWeek::Friday, 14);

    let first = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    let err = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 1, 1),
        PlacementMode::Create,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ClassHasLessonAtThisTime { lesson_id, .. } if lesson_id == first.id
    ));
}

#[tokio::test]
async fn test_teacher_busy_across_classes() {
    let db = setup().await;
    let school = School::new(&db).await;
    let a = common::class(&db, "1A", 25).await;
    let b = common::class(&db, "1B", 25).await;
    let at = slot(DayOfWeek::Wednesday, 5);

    LessonService::place_lesson(&db, school.lesson(a.class.id, at, 0, 0), PlacementMode::Create)
        .await
        .unwrap();

    let err =
        LessonService::place_lesson(&db, school.lesson(b.class.id, at, 1, 0), PlacementMode::Create)
            .await
            .unwrap_err();
    match err {
        ServiceError::TeacherAlreadyBusy { class_name, .. } => assert_eq!(class_name, "1A"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_room_taken_names_the_other_class() {
    let db = setup().await;
    let school = School::new(&db).await;
    let a = common::class(&db, "1A", 25).await;
    let b = common::class(&db, "1B", 25).await;
    let at = slot(DayOfWeek::Thursday, 2);

    LessonService::place_lesson(&db, school.lesson(a.class.id, at, 0, 0), PlacementMode::Create)
        .await
        .unwrap();

    let err =
        LessonService::place_lesson(&db, school.lesson(b.class.id, at, 0, 1), PlacementMode::Create)
            .await
            .unwrap_err();
    assert_eq!(err.kind(), "RoomAlreadyTaken");
    assert_eq!(err.conflicting_entity(), Some("1A"));
}

#[tokio::test]
async fn test_missing_references() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;
    let at = slot(DayOfWeek::Monday, 0);

    let err = LessonService::place_lesson(
        &db,
        school.lesson(Uuid::new_v4(), at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "ClassNotFound");

    let mut candidate = school.lesson(class.class.id, at, 0, 0);
    candidate.room_id = Uuid::new_v4();
    let err = LessonService::place_lesson(&db, candidate, PlacementMode::Create)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "RoomNotFound");

    let mut candidate = school.lesson(class.class.id, at, 0, 0);
    candidate.scope = LessonScope::Group(Uuid::new_v4());
    let err = LessonService::place_lesson(&db, candidate, PlacementMode::Create)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "GroupNotFound");

    let err = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, at, 0, 0),
        PlacementMode::Update(Uuid::new_v4()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "LessonNotFound");
}

#[tokio::test]
async fn test_group_of_another_class_is_rejected() {
    let db = setup().await;
    let school = School::new(&db).await;
    let split = split_class(&db, "2B", [("G1", 15), ("G2", 15)]).await;
    let other = common::class(&db, "1A", 25).await;

    let mut candidate = school.lesson(other.class.id, slot(DayOfWeek::Monday, 0), 0, 0);
    candidate.scope = LessonScope::Group(split.groups[0].id);

    let err = LessonService::place_lesson(&db, candidate, PlacementMode::Create)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "GroupNotFound");
}

#[tokio::test]
async fn test_update_without_changes() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;
    let candidate = school.lesson(class.class.id, slot(DayOfWeek::Monday, 6), 0, 0);

    let lesson = LessonService::place_lesson(&db, candidate, PlacementMode::Create)
        .await
        .unwrap();
    let err = LessonService::place_lesson(&db, candidate, PlacementMode::Update(lesson.id))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NoChangesDetected));
    assert_eq!(LessonService::get(&db, lesson.id).await.unwrap(), lesson);
}

#[tokio::test]
async fn test_update_moves_lesson_and_keeps_its_own_resources() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;

    let lesson = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, slot(DayOfWeek::Monday, 1), 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    // same slot and teacher in a new room: the lesson does not collide with itself
    let moved = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, slot(DayOfWeek::Monday, 1), 1, 0),
        PlacementMode::Update(lesson.id),
    )
    .await
    .unwrap();
    assert_eq!(moved.id, lesson.id);
    assert_eq!(moved.room_id, school.rooms[1].id);

    let moved = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, slot(DayOfWeek::Tuesday, 2), 1, 0),
        PlacementMode::Update(lesson.id),
    )
    .await
    .unwrap();
    assert_eq!(moved.slot(), slot(DayOfWeek::Tuesday, 2));
}

#[tokio::test]
async fn test_update_overwrites_lesson_of_same_scope() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;
    let target = slot(DayOfWeek::Tuesday, 8);

    let occupant = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, target, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();
    let mover = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, slot(DayOfWeek::Monday, 8), 1, 1),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    // the occupant's room is free for the mover since the occupant goes away
    let moved = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, target, 0, 1),
        PlacementMode::Update(mover.id),
    )
    .await
    .unwrap();

    assert_eq!(moved.slot(), target);
    assert_eq!(
        LessonService::get(&db, occupant.id).await.unwrap_err().kind(),
        "LessonNotFound"
    );
}

#[tokio::test]
async fn test_replace_displaces_cell_occupant() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = split_class(&db, "2B", [("G1", 15), ("G2", 15)]).await;
    let at = slot(DayOfWeek::Friday, 3);

    let g1_lesson = LessonService::place_lesson(
        &db,
        school.group_lesson(&class.groups[0], at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();
    let g2_lesson = LessonService::place_lesson(
        &db,
        school.group_lesson(&class.groups[1], at, 1, 1),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    let replacement = LessonService::place_lesson(
        &db,
        school.group_lesson(&class.groups[0], at, 2, 2),
        PlacementMode::Replace,
    )
    .await
    .unwrap();

    let remaining: Vec<_> = LessonService::list(&db, LessonFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert!(remaining.contains(&replacement.id));
    assert!(remaining.contains(&g2_lesson.id));
    assert!(!remaining.contains(&g1_lesson.id));
}

#[tokio::test]
async fn test_rejected_placement_commits_nothing() {
    let db = setup().await;
    let school = School::new(&db).await;
    let a = common::class(&db, "1A", 25).await;
    let b = common::class(&db, "1B", 25).await;
    let at = slot(DayOfWeek::Monday, 9);

    let a_lesson = LessonService::place_lesson(
        &db,
        school.lesson(a.class.id, at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();
    let b_lesson = LessonService::place_lesson(
        &db,
        school.lesson(b.class.id, at, 1, 1),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    // replacing b's lesson with one in a's room fails, so b keeps its lesson
    let err = LessonService::place_lesson(
        &db,
        school.lesson(b.class.id, at, 0, 2),
        PlacementMode::Replace,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "RoomAlreadyTaken");

    assert!(LessonService::get(&db, a_lesson.id).await.is_ok());
    assert!(LessonService::get(&db, b_lesson.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_lesson() {
    let db = setup().await;
    let school = School::new(&db).await;
    let class = common::class(&db, "1A", 25).await;

    let lesson = LessonService::place_lesson(
        &db,
        school.lesson(class.class.id, slot(DayOfWeek::Monday, 0), 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();

    LessonService::delete(&db, lesson.id).await.unwrap();
    assert_eq!(
        LessonService::delete(&db, lesson.id).await.unwrap_err().kind(),
        "LessonNotFound"
    );
}

#[tokio::test]
async fn test_moving_lesson_to_another_class_touches_both_classes() {
    let db = setup().await;
    let school = School::new(&db).await;
    let from = common::class(&db, "1A", 25).await;
    let to = common::class(&db, "1B", 25).await;
    let at = slot(DayOfWeek::Wednesday, 5);

    let lesson = LessonService::place_lesson(
        &db,
        school.lesson(from.class.id, at, 0, 0),
        PlacementMode::Create,
    )
    .await
    .unwrap();
    let moved = LessonService::place_lesson(
        &db,
        school.lesson(to.class.id, at, 0, 0),
        PlacementMode::Update(lesson.id),
    )
    .await
    .unwrap();
    assert_eq!(moved.class_id, to.class.id);

    assert_eq!(revision(&db, from.class.id).await, 2);
    assert_eq!(revision(&db, to.class.id).await, 1);
}

async fn revision(db: &DatabaseConnection, class_id: Uuid) -> i64 {
    classes::Entity::find_by_id(class_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .revision
}
