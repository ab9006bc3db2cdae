//! Admin Account Storage
//! Mission: Securely store and verify admin panel credentials with SQLite

use crate::auth::models::{AdminUser, Role};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::env;
use tracing::{info, warn};
use uuid::Uuid;

/// Credential store with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS admin_users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Create the bootstrap admin account if none exists.
    ///
    /// Username and password come from ADMIN_USERNAME / ADMIN_PASSWORD,
    /// with development fallbacks.
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM admin_users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin accounts")?;

        if count == 0 {
            let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
            let (password, defaulted) =
                resolve_bootstrap_password(env::var("ADMIN_PASSWORD").ok());

            let password_hash = hash(&password, DEFAULT_COST).context("Failed to hash password")?;

            let admin = AdminUser {
                id: Uuid::new_v4(),
                username,
                password_hash,
                role: Role::Admin,
                created_at: Utc::now().to_rfc3339(),
            };

            conn.execute(
                "INSERT INTO admin_users (id, username, password_hash, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    admin.id.to_string(),
                    admin.username,
                    admin.password_hash,
                    admin.role.as_str(),
                    admin.created_at,
                ],
            )
            .context("Failed to insert admin account")?;

            info!("🔐 Default admin account created (username: {})", admin.username);
            if defaulted {
                warn!("⚠️  ADMIN_PASSWORD not set - bootstrap admin uses an insecure dev default, change it in production!");
            }
        }

        Ok(())
    }

    /// Get an account by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, role, created_at
             FROM admin_users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| {
            let id_str: String = row.get(0)?;
            let role_str: String = row.get(3)?;
            Ok(AdminUser {
                id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
                username: row.get(1)?,
                password_hash: row.get(2)?,
                role: Role::from_str(&role_str).unwrap_or(Role::User),
                created_at: row.get(4)?,
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a username/password pair.
    ///
    /// Returns `None` both for an unknown username and for a wrong
    /// password; callers must map both to the same generic rejection so
    /// usernames cannot be enumerated.
    pub fn verify_login(&self, username: &str, password: &str) -> Result<Option<AdminUser>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        if valid {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Create a new account
    pub fn create_user(&self, username: &str, password: &str, role: Role) -> Result<AdminUser> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = AdminUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO admin_users (id, username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .context("Failed to insert account")?;

        info!("✅ Created account: {} ({})", user.username, user.role.as_str());

        Ok(user)
    }

    /// List all accounts (admin only)
    pub fn list_users(&self) -> Result<Vec<AdminUser>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt =
            conn.prepare("SELECT id, username, password_hash, role, created_at FROM admin_users")?;

        let users = stmt
            .query_map([], |row| {
                let id_str: String = row.get(0)?;
                let role_str: String = row.get(3)?;
                Ok(AdminUser {
                    id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: Role::from_str(&role_str).unwrap_or(Role::User),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}

/// Pick the bootstrap admin password, reporting whether the insecure
/// development default had to be used.
fn resolve_bootstrap_password(env_value: Option<String>) -> (String, bool) {
    match env_value {
        Some(password) if !password.trim().is_empty() => (password, false),
        _ => ("admin123".to_string(), true),
    }
}
