//! Staff accounts, credential hashing and role permissions
//!
//! Passwords are stored as bcrypt hashes. Token issuance is left to whatever
//! front end sits on top; a successful login yields an `AuthenticatedUser`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::persistence::UserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Anything other than an explicit "admin" request registers a plain user.
    pub fn from_request(requested: Option<&str>) -> Self {
        match requested.map(str::trim) {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => Permission::ALL,
            Role::User => &[
                Permission::ViewResidents,
                Permission::AddResident,
                Permission::EditResident,
                Permission::DeleteResident,
                Permission::ViewVisualization,
                Permission::UserInfo,
                Permission::Household,
                Permission::Documents,
                Permission::Events,
            ],
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewResidents,
    AddResident,
    EditResident,
    DeleteResident,
    ViewUsers,
    ViewVisualization,
    UserInfo,
    Household,
    Documents,
    Events,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::ViewResidents,
        Permission::AddResident,
        Permission::EditResident,
        Permission::DeleteResident,
        Permission::ViewUsers,
        Permission::ViewVisualization,
        Permission::UserInfo,
        Permission::Household,
        Permission::Documents,
        Permission::Events,
    ];
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ViewResidents => "view_residents",
            Permission::AddResident => "add_resident",
            Permission::EditResident => "edit_resident",
            Permission::DeleteResident => "delete_resident",
            Permission::ViewUsers => "view_user",
            Permission::ViewVisualization => "view_visualization",
            Permission::UserInfo => "user_info",
            Permission::Household => "household",
            Permission::Documents => "documents",
            Permission::Events => "events",
        };
        f.write_str(name)
    }
}

/// A stored staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Account details safe to hand to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn can(&self, permission: Permission) -> bool {
        self.role.allows(permission)
    }

    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(RegistryError::Forbidden(format!(
                "{} ({}) lacks {}",
                self.email, self.role, permission
            )))
        }
    }
}

impl From<&UserAccount> for AuthenticatedUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role,
        }
    }
}

/// Registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
}

/// Register and authenticate accounts against a `UserStore`.
#[derive(Debug, Clone, Copy)]
pub struct Authenticator {
    hash_cost: u32,
}

impl Authenticator {
    /// `hash_cost` is the bcrypt work factor (4 to 31).
    pub fn new(hash_cost: u32) -> Self {
        Self { hash_cost }
    }

    pub fn register<S: UserStore + ?Sized>(
        &self,
        store: &mut S,
        registration: &Registration,
    ) -> Result<AuthenticatedUser> {
        let email = registration.email.trim();
        if email.is_empty() || registration.password.is_empty() {
            return Err(RegistryError::Validation(
                "email and password are required".into(),
            ));
        }
        if store.find_user(email)?.is_some() {
            return Err(RegistryError::AlreadyExists {
                kind: "User",
                id: email.to_string(),
            });
        }

        let account = UserAccount {
            email: email.to_string(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            role: Role::from_request(registration.role.as_deref()),
            password_hash: hash_password(&registration.password, self.hash_cost)?,
        };
        let user = AuthenticatedUser::from(&account);
        store.insert_user(account)?;
        info!("Registered {} as {}", user.email, user.role);
        Ok(user)
    }

    pub fn login<S: UserStore + ?Sized>(
        &self,
        store: &S,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser> {
        let account = match store.find_user(email.trim())? {
            Some(account) => account,
            None => {
                warn!("Login attempt for unknown account {}", email);
                return Err(RegistryError::Unauthorized);
            }
        };
        if !verify_password(password, &account.password_hash) {
            warn!("Rejected password for {}", account.email);
            return Err(RegistryError::Unauthorized);
        }
        info!("User logged in: {}", account.email);
        Ok(AuthenticatedUser::from(&account))
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
