#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewJobs,
    ManageOwnJobs,
    ManageAllJobs,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewJobs,
    Permission::ManageOwnJobs,
    Permission::ManageAllJobs,
];
const RECRUITER_PERMISSIONS: &[Permission] = &[Permission::ViewJobs, Permission::ManageOwnJobs];
const VIEWER_PERMISSIONS: &[Permission] = &[Permission::ViewJobs];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Recruiter,
    Viewer,
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Recruiter => RECRUITER_PERMISSIONS,
            Role::Viewer => VIEWER_PERMISSIONS,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "recruiter" => Some(Role::Recruiter),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// The authenticated caller of a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub tenant_id: Option<String>,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: None,
            role,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.permissions().contains(&permission)
    }

    pub fn can_manage_jobs(&self) -> bool {
        self.has_permission(Permission::ManageOwnJobs) || self.has_permission(Permission::ManageAllJobs)
    }

    /// Owners may always touch their jobs; others need `ManageAllJobs`.
    pub fn can_modify(&self, owner_id: &str) -> bool {
        (self.user_id == owner_id && self.has_permission(Permission::ManageOwnJobs))
            || self.has_permission(Permission::ManageAllJobs)
    }
}
