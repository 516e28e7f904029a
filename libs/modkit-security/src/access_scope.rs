use uuid::Uuid;

/// Access scope defining which owners' records a request can see.
///
/// An empty scope (not unrestricted, no owners) is considered a "deny all" scope.
/// An unrestricted scope bypasses owner filtering entirely.
#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AccessScope {
    pub(crate) unrestricted: bool,
    pub(crate) owner_ids: Vec<Uuid>,
}

impl AccessScope {
    #[inline]
    #[must_use]
    pub fn owner_ids(&self) -> &[Uuid] {
        &self.owner_ids
    }

    /// Returns true if this scope bypasses owner filtering.
    #[inline]
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Returns true if this scope is empty (no owners, not unrestricted).
    /// An empty scope results in a "deny all" condition in queries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.unrestricted && self.owner_ids.is_empty()
    }

    #[must_use]
    pub fn owners_only(owner_ids: Vec<Uuid>) -> Self {
        Self {
            unrestricted: false,
            owner_ids,
        }
    }

    #[must_use]
    pub fn owner(owner_id: Uuid) -> Self {
        Self::owners_only(vec![owner_id])
    }

    /// Scope for privileged access: every record regardless of owner.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            unrestricted: true,
            owner_ids: Vec::new(),
        }
    }

    /// Returns true if a record with the given owner falls inside this scope.
    /// Ownerless records are only visible through an unrestricted scope.
    #[must_use]
    pub fn allows_owner(&self, owner: Option<Uuid>) -> bool {
        if self.unrestricted {
            return true;
        }
        owner.is_some_and(|id| self.owner_ids.contains(&id))
    }

    /// Intersect two scopes (AND).
    #[must_use]
    pub fn narrow(&self, other: &AccessScope) -> AccessScope {
        match (self.unrestricted, other.unrestricted) {
            (true, _) => other.clone(),
            (false, true) => self.clone(),
            (false, false) => Self::owners_only(
                self.owner_ids
                    .iter()
                    .filter(|id| other.owner_ids.contains(id))
                    .copied()
                    .collect(),
            ),
        }
    }
}
