//! Bucket classification shared by `pr create` and `pr update` (C9 Phase B).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    PushAndCreate,
    CreateOnly,
    PushAndUpdate,
    UpdateOnly,
    SkipBehind,
    SkipMissingBase,
    SkipPermission,
}

impl Bucket {
    pub fn is_push(&self) -> bool {
        matches!(self, Bucket::PushAndCreate | Bucket::PushAndUpdate)
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Bucket::PushAndCreate | Bucket::CreateOnly)
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Bucket::SkipBehind | Bucket::SkipMissingBase | Bucket::SkipPermission
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::PushAndCreate => "push-and-create",
            Bucket::CreateOnly => "create-only",
            Bucket::PushAndUpdate => "push-and-update",
            Bucket::UpdateOnly => "update-only",
            Bucket::SkipBehind => "skip (behind)",
            Bucket::SkipMissingBase => "skip (missing base)",
            Bucket::SkipPermission => "skip (no write permission)",
        }
    }
}

/// Classify a single repo given its preflight state. `has_write_permission`
/// and `base_exists` are checked ahead of ahead/behind because they gate
/// participation outright.
pub fn categorize(
    has_open_pr: bool,
    ahead: u32,
    behind: u32,
    base_exists: bool,
    has_write_permission: bool,
) -> Bucket {
    if !has_write_permission {
        return Bucket::SkipPermission;
    }
    if !base_exists {
        return Bucket::SkipMissingBase;
    }
    if behind > 0 {
        return Bucket::SkipBehind;
    }
    match (has_open_pr, ahead > 0) {
        (false, true) => Bucket::PushAndCreate,
        (false, false) => Bucket::CreateOnly,
        (true, true) => Bucket::PushAndUpdate,
        (true, false) => Bucket::UpdateOnly,
    }
}
