//! Authorization policy for control-plane operations
//!
//! Every component method calls [`authorize`] before touching domain state.
//! All administrative actions require a global administrator. Book founders
//! do not manage their own books through the control plane.

use std::fmt;

use docdesk_db::entities::member::{MemberRole, MemberStatus};
use serde::{Deserialize, Serialize};

/// Authenticated member performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub member_id: i32,
    pub role: MemberRole,
    pub status: MemberStatus,
}

impl Caller {
    pub fn new(member_id: i32, role: MemberRole, status: MemberStatus) -> Self {
        Self {
            member_id,
            role,
            status,
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Operation being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewDashboard,
    ListMembers,
    CreateMember,
    SetMemberStatus,
    SetMemberRole,
    ListBooks,
    ViewBook,
    CreateBook,
    EditBook,
    SetVisibility,
    DeleteBook,
    IssueToken,
    RevokeToken,
    TransferOwnership,
    ModerateComment,
    ManageSettings,
}

/// Target of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    Site,
    Member(i32),
    Book(&'a str),
    BookId(i32),
    Comment(i32),
}

impl fmt::Display for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Site => write!(f, "site"),
            Resource::Member(id) => write!(f, "member:{}", id),
            Resource::Book(identify) => write!(f, "book:{}", identify),
            Resource::BookId(id) => write!(f, "book#{}", id),
            Resource::Comment(id) => write!(f, "comment:{}", id),
        }
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    CallerDisabled,
    NotAdministrator,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::CallerDisabled => write!(f, "caller account is disabled"),
            DenyReason::NotAdministrator => write!(f, "administrator role required"),
        }
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Evaluate whether `caller` may perform `action` on `resource`
pub fn authorize(caller: &Caller, action: Action, resource: Resource<'_>) -> Decision {
    let decision = if !caller.is_active() {
        Decision::Deny(DenyReason::CallerDisabled)
    } else {
        match action {
            // Any active member may start a book of their own.
            Action::CreateBook => Decision::Allow,
            _ if caller.is_administrator() => Decision::Allow,
            _ => Decision::Deny(DenyReason::NotAdministrator),
        }
    };

    if let Decision::Deny(reason) = decision {
        tracing::debug!(
            member_id = caller.member_id,
            action = ?action,
            resource = %resource,
            %reason,
            "Policy denied request"
        );
    }

    decision
}
