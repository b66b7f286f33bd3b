//! Plan and role gating for the catalog.
//!
//! Everything here is advisory UI gating: it decides which controls to show
//! and which catalog to ask for. The backend enforces the real rules.
//!
//! All tiers resolve through one table ([`PlanTable`]) so that every front
//! end applies the same rules.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AccessConfig, PlanTable};

/// How administrators are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminRule {
    /// Profile `role` column equals `admin`
    #[default]
    Role,
    /// User id equals the configured `admin_id`
    FixedId,
    /// Either of the above
    Either,
}

/// Which catalog a tier may browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogScope {
    /// Nothing; the pricing section is shown instead
    None,
    /// The viewer's own frozen copy of the catalog
    PersonalCopy,
    /// The live catalog
    Live,
}

/// Rules for one subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRules {
    pub catalog: CatalogScope,
    pub can_copy: bool,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Ultimate,
}

impl Plan {
    /// Parse a profile plan value. Unknown or blank values are Free.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pro" => Plan::Pro,
            "ultimate" => Plan::Ultimate,
            _ => Plan::Free,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Ultimate => "Ultimate",
        }
    }
}

impl PlanTable {
    pub fn rules(&self, plan: Plan) -> PlanRules {
        match plan {
            Plan::Free => self.free,
            Plan::Pro => self.pro,
            Plan::Ultimate => self.ultimate,
        }
    }
}

/// Row from the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Profile {
    pub fn plan(&self) -> Plan {
        self.plan.as_deref().map(Plan::parse).unwrap_or_default()
    }

    pub fn is_admin_role(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.trim().eq_ignore_ascii_case("admin"))
    }
}

/// Who is looking at the library, as reported by the session provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<String>,
    /// `None` when signed in but the profile lookup failed or was empty
    pub profile: Option<Profile>,
}

impl Viewer {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>, profile: Option<Profile>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            profile,
        }
    }
}

/// What to fetch for a given access level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    pub table: String,
    /// Restrict rows to this `user_id`
    pub owner: Option<String>,
    /// Column to sort by, newest first
    pub order_by: String,
}

impl CatalogQuery {
    pub fn live() -> Self {
        Self {
            table: "prompts".to_string(),
            owner: None,
            order_by: "updated_at".to_string(),
        }
    }

    pub fn personal_copy(user_id: &str) -> Self {
        Self {
            table: "prompts_copy".to_string(),
            owner: Some(user_id.to_string()),
            order_by: "original_created_at".to_string(),
        }
    }
}

/// Resolved capabilities for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub user_id: Option<String>,
    pub plan: Plan,
    pub is_admin: bool,
    /// `None` means no catalog is shown at all
    pub catalog: Option<CatalogQuery>,
    pub can_copy: bool,
    /// Create, edit and delete prompts
    pub can_manage: bool,
}

impl Access {
    /// A signed-out visitor: pricing page only.
    pub fn guest() -> Self {
        Self {
            user_id: None,
            plan: Plan::Free,
            is_admin: false,
            catalog: None,
            can_copy: false,
            can_manage: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Plan badge label; admins and guests get none.
    pub fn badge(&self) -> Option<&'static str> {
        if self.is_admin || !self.is_signed_in() {
            None
        } else {
            Some(self.plan.label())
        }
    }

    pub fn shows_catalog(&self) -> bool {
        self.catalog.is_some()
    }
}

/// Resolves a [`Viewer`] into an [`Access`] using the configured table.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    config: AccessConfig,
}

impl AccessPolicy {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    fn is_admin(&self, user_id: &str, profile: Option<&Profile>) -> bool {
        let by_role = profile.is_some_and(Profile::is_admin_role);
        let by_id = self.config.admin_id.as_deref() == Some(user_id);

        match self.config.admin_rule {
            AdminRule::Role => by_role,
            AdminRule::FixedId => by_id,
            AdminRule::Either => by_role || by_id,
        }
    }

    pub fn resolve(&self, viewer: &Viewer) -> Access {
        let Some(user_id) = viewer.user_id.as_deref() else {
            return Access::guest();
        };

        let profile = viewer.profile.as_ref();
        if profile.is_none() {
            warn!(user_id, "profile not found, treated as free");
        }

        let plan = profile.map(Profile::plan).unwrap_or_default();
        let is_admin = self.is_admin(user_id, profile);

        let rules = if is_admin {
            self.config.plans.admin
        } else {
            self.config.plans.rules(plan)
        };
        let catalog = match rules.catalog {
            CatalogScope::None => None,
            CatalogScope::PersonalCopy => Some(CatalogQuery::personal_copy(user_id)),
            CatalogScope::Live => Some(CatalogQuery::live()),
        };

        let access = Access {
            user_id: Some(user_id.to_string()),
            plan,
            is_admin,
            catalog,
            can_copy: rules.can_copy,
            can_manage: is_admin,
        };

        debug!(
            user_id,
            plan = ?access.plan,
            is_admin = access.is_admin,
            catalog = ?access.catalog.as_ref().map(|q| q.table.as_str()),
            "resolved access"
        );
        access
    }
}
