//! Who may do what.
//!
//! Access is decided per role category. Administrators may do everything; any
//! other user must belong to the team in question and hold a role which grants
//! the permission. Managing a team additionally requires having created it, as
//! anyone holding the join code can pick any role when they join.

use serde::{Deserialize, Serialize};

use crate::{auth::User, teams::Team};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UserType {
    Coach,
    Parent,
    Player,
}

impl UserType {
    pub const ALL: [UserType; 3] =
        [UserType::Coach, UserType::Parent, UserType::Player];

    /// The two-letter value stored in `users.user_type`.
    pub fn code(self) -> &'static str {
        match self {
            UserType::Coach => "CO",
            UserType::Parent => "PL",
            UserType::Player => "PA",
        }
    }

    pub fn from_code(code: &str) -> Option<UserType> {
        match code {
            "CO" => Some(UserType::Coach),
            "PL" => Some(UserType::Parent),
            "PA" => Some(UserType::Player),
            _ => None,
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        match self {
            UserType::Coach => true,
            UserType::Parent => matches!(permission, Permission::ViewTeam),
            UserType::Player => matches!(
                permission,
                Permission::ViewTeam | Permission::UploadVideo
            ),
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UserType::Coach => "Coach",
            UserType::Parent => "Parent",
            UserType::Player => "Player",
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Permission {
    ViewTeam,
    /// Create teams and view their join codes.
    ManageTeam,
    DeleteTeam,
    UploadVideo,
    ManageFixtures,
    RecordEvaluations,
}

impl Permission {
    /// Permissions reserved for the coach who created the team.
    pub fn manages_team(self) -> bool {
        matches!(
            self,
            Permission::ManageTeam
                | Permission::DeleteTeam
                | Permission::ManageFixtures
                | Permission::RecordEvaluations
        )
    }
}

impl User {
    /// Coarse check used for administrative actions: administrators hold
    /// every named permission, nobody else holds any.
    pub fn has_perm(&self, _codename: &str) -> bool {
        self.is_admin
    }

    /// Whether the user's role allows this, independent of any team.
    pub fn role_grants(&self, permission: Permission) -> bool {
        self.has_perm("*") || self.role().grants(permission)
    }

    pub fn can(&self, permission: Permission, team: &Team) -> bool {
        if self.has_perm("*") {
            return true;
        }
        if !self.is_active || self.team_id.as_deref() != Some(team.id.as_str())
        {
            return false;
        }
        if permission.manages_team() && !team.is_created_by(self) {
            return false;
        }
        self.role().grants(permission)
    }
}
