use clap::Subcommand;
use serde_json::json;

use registry::auth::{AuthenticatedUser, Permission, Registration};
use registry::persistence::UserStore;

use super::Output;
use crate::state::{AppState, MessageResult};

#[derive(Subcommand)]
pub enum UsersCommand {
    /// Create a staff account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// "admin" for an administrator, anything else for a regular user
        #[arg(long)]
        role: Option<String>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// The logged-in account
    Me,
    /// All accounts (administrators only)
    List,
}

pub fn run(state: &mut AppState, command: UsersCommand) -> anyhow::Result<Output> {
    let output = match command {
        UsersCommand::Register {
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            let registration = Registration {
                email,
                password,
                first_name,
                last_name,
                role,
            };
            let user = state.auth.register(&mut state.store, &registration)?;
            state
                .session
                .record(format!("Registered account: {} ({})", user.email, user.role));
            serde_json::to_value(user)?
        }
        UsersCommand::Login { email, password } => {
            let user = state.auth.login(&state.store, &email, &password)?;
            state.session.login(user.clone());
            json!({ "message": "Login successful", "user": user })
        }
        UsersCommand::Logout => {
            state.session.logout();
            serde_json::to_value(MessageResult::new("Logged out"))?
        }
        UsersCommand::Me => {
            let user = state.session.require(Permission::UserInfo)?.clone();
            let permissions: Vec<String> =
                user.role.permissions().iter().map(|p| p.to_string()).collect();
            json!({ "user": user, "permissions": permissions })
        }
        UsersCommand::List => {
            state.session.require(Permission::ViewUsers)?;
            let users: Vec<AuthenticatedUser> = state
                .store
                .list_users()?
                .iter()
                .map(AuthenticatedUser::from)
                .collect();
            serde_json::to_value(users)?
        }
    };
    Ok(output)
}
