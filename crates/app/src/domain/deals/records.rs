//! Deal Records

use creator_deals::deals::Deal;

use crate::uuids::TypedUuid;

/// Deal UUID
pub type DealUuid = TypedUuid<Deal>;

/// Creator profile record.
#[derive(Debug, Clone, Copy)]
pub struct CreatorRecord;

/// Creator UUID
pub type CreatorUuid = TypedUuid<CreatorRecord>;
