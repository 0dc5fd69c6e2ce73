use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who attends a lesson: the whole class or one of its two groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Uuid>", into = "Option<Uuid>")]
pub enum LessonScope {
    WholeClass,
    Group(Uuid),
}

impl LessonScope {
    pub fn group_id(self) -> Option<Uuid> {
        match self {
            Self::WholeClass => None,
            Self::Group(id) => Some(id),
        }
    }

    /// Whether two lessons of the same class with these scopes would need the
    /// same students at the same time.
    ///
    /// A whole-class lesson overlaps everything; two group lessons overlap only
    /// when they target the same group.
    pub fn overlaps(self, other: Self) -> bool {
        match (self, other) {
            (Self::WholeClass, _) | (_, Self::WholeClass) => true,
            (Self::Group(a), Self::Group(b)) => a == b,
        }
    }
}

impl From<Option<Uuid>> for LessonScope {
    fn from(group_id: Option<Uuid>) -> Self {
        group_id.map_or(Self::WholeClass, Self::Group)
    }
}

impl From<LessonScope> for Option<Uuid> {
    fn from(scope: LessonScope) -> Self {
        scope.group_id()
    }
}
