use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Where an entity is visible. Entities removed from both surfaces have no row
/// at all, so "removed but still public" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    DashboardHidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::DashboardHidden => "dashboard_hidden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(Visibility::Visible),
            "dashboard_hidden" => Some(Visibility::DashboardHidden),
            _ => None,
        }
    }

    /// Hide from the admin dashboard. Hiding an already-hidden entity is a no-op.
    pub fn hide(self) -> Self {
        Visibility::DashboardHidden
    }

    /// Bring back into the admin dashboard. Restoring a visible entity is a no-op.
    pub fn restore(self) -> Self {
        Visibility::Visible
    }

    pub fn shown_on_dashboard(self) -> bool {
        self == Visibility::Visible
    }
}

impl FromSql for Visibility {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Visibility::parse(s).ok_or_else(|| {
            FromSqlError::Other(format!("unknown visibility value: {s}").into())
        })
    }
}

impl ToSql for Visibility {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// The caller must pick one of the two deletion scopes explicitly; there is no
/// default and the two are never coalesced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Hide from the admin dashboard only; the public site keeps the entity.
    Dashboard,
    /// Remove the record outright from both surfaces.
    Both,
}

impl DeleteScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dashboard" => Some(DeleteScope::Dashboard),
            "both" => Some(DeleteScope::Both),
            _ => None,
        }
    }
}

/// Which listing a read is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListScope {
    /// The public website: every stored entity, hidden or not.
    #[default]
    Public,
    /// The admin dashboard: only entities not hidden from it.
    Dashboard,
}

/// The four entity kinds sharing the dual-scope deletion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Event,
    TeamMember,
    Testimonial,
    MinistryRegistration,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Event => "events",
            EntityKind::TeamMember => "team_members",
            EntityKind::Testimonial => "testimonials",
            EntityKind::MinistryRegistration => "ministry_registrations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Event => "Event",
            EntityKind::TeamMember => "Team member",
            EntityKind::Testimonial => "Testimonial",
            EntityKind::MinistryRegistration => "Ministry registration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_and_restore_are_idempotent() {
        let v = Visibility::Visible;
        assert_eq!(v.hide(), Visibility::DashboardHidden);
        assert_eq!(v.hide().hide(), Visibility::DashboardHidden);
        assert_eq!(v.hide().restore(), Visibility::Visible);
        assert_eq!(v.restore(), Visibility::Visible);
    }

    #[test]
    fn hidden_entities_leave_the_dashboard_only() {
        assert!(Visibility::Visible.shown_on_dashboard());
        assert!(!Visibility::DashboardHidden.shown_on_dashboard());
    }

    #[test]
    fn delete_scope_requires_an_exact_choice() {
        assert_eq!(DeleteScope::parse("dashboard"), Some(DeleteScope::Dashboard));
        assert_eq!(DeleteScope::parse("both"), Some(DeleteScope::Both));
        assert_eq!(DeleteScope::parse(""), None);
        assert_eq!(DeleteScope::parse("all"), None);
    }

    #[test]
    fn visibility_round_trips_through_text() {
        for v in [Visibility::Visible, Visibility::DashboardHidden] {
            assert_eq!(Visibility::parse(v.as_str()), Some(v));
        }
        assert_eq!(Visibility::parse("deleted"), None);
    }
}
