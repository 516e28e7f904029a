/// Codename prefix of the per-record-type manage permission.
pub const MANAGE_PERMISSION_PREFIX: &str = "can_manage_";

/// Field on owned records that carries the owning subject.
pub const OWNER_FIELD: &str = "owner";
