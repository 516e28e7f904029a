use crate::constants::MANAGE_PERMISSION_PREFIX;

/// Errors produced while building or parsing a [`Permission`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("app_label is required")]
    MissingAppLabel,
    #[error("codename is required")]
    MissingCodename,
    #[error("Expected format 'app_label.codename', got: {0}")]
    InvalidFormat(String),
    #[error("Label must contain only lowercase alphanumeric characters or underscores, got: {0}")]
    InvalidLabel(String),
}

/// A named permission in `"{app_label}.{codename}"` form.
///
/// Examples:
///  - `"blog.can_manage_post"`
///  - `"library.can_manage_book"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    /// Application the permission belongs to, e.g. `"blog"`
    app_label: String,

    /// Permission name inside the application, e.g. `"can_manage_post"`
    codename: String,
}

impl serde::Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.app_label, self.codename)
    }
}

impl std::str::FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((app_label, codename)) = s.split_once('.') else {
            return Err(PermissionError::InvalidFormat(s.to_owned()));
        };

        Permission::builder()
            .app_label(app_label)
            .codename(codename)
            .build()
    }
}

impl Permission {
    #[must_use]
    pub fn builder() -> PermissionBuilder {
        PermissionBuilder::default()
    }

    /// Manage permission for a record type: `"{app_label}.can_manage_{model_name}"`.
    ///
    /// # Errors
    ///
    /// Returns an error if either label is empty or contains characters other
    /// than lowercase ASCII alphanumerics and underscores.
    pub fn manage(app_label: &str, model_name: &str) -> Result<Self, PermissionError> {
        validate_label(model_name)?;
        Permission::builder()
            .app_label(app_label)
            .codename(&format!("{MANAGE_PERMISSION_PREFIX}{model_name}"))
            .build()
    }

    #[must_use]
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    #[must_use]
    pub fn codename(&self) -> &str {
        &self.codename
    }

    /// Returns true if this is a `can_manage_*` permission.
    #[must_use]
    pub fn is_manage(&self) -> bool {
        self.codename.starts_with(MANAGE_PERMISSION_PREFIX)
    }
}

pub(crate) fn validate_label(label: &str) -> Result<(), PermissionError> {
    if label.is_empty()
        || !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(PermissionError::InvalidLabel(label.to_owned()));
    }
    Ok(())
}

#[derive(Default)]
pub struct PermissionBuilder {
    app_label: Option<String>,
    codename: Option<String>,
}

impl PermissionBuilder {
    #[must_use]
    pub fn app_label(mut self, app_label: &str) -> Self {
        self.app_label = Some(app_label.to_owned());
        self
    }

    #[must_use]
    pub fn codename(mut self, codename: &str) -> Self {
        self.codename = Some(codename.to_owned());
        self
    }

    /// Build the permission
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `app_label` is not set
    /// - `codename` is not set
    /// - either contains characters other than lowercase alphanumeric or underscore
    pub fn build(self) -> Result<Permission, PermissionError> {
        let app_label = self.app_label.ok_or(PermissionError::MissingAppLabel)?;
        let codename = self.codename.ok_or(PermissionError::MissingCodename)?;

        validate_label(&app_label)?;
        validate_label(&codename)?;

        Ok(Permission {
            app_label,
            codename,
        })
    }
}
