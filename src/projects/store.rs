//! Project Storage
//! Mission: Persist portfolio projects with SQLite

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Portfolio project record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for creating or updating a project
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Project storage with SQLite backend
pub struct ProjectStore {
    db_path: String,
}

impl ProjectStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        // technologies is a JSON array stored as TEXT
        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                image_path TEXT,
                technologies TEXT NOT NULL DEFAULT '[]',
                project_url TEXT,
                github_url TEXT,
                featured INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
        let id_str: String = row.get(0)?;
        let technologies_json: String = row.get(4)?;
        Ok(Project {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
            title: row.get(1)?,
            description: row.get(2)?,
            image_path: row.get(3)?,
            technologies: serde_json::from_str(&technologies_json).unwrap_or_default(),
            project_url: row.get(5)?,
            github_url: row.get(6)?,
            featured: row.get::<_, i64>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    /// All projects, featured first, newest first
    pub fn list_all(&self) -> Result<Vec<Project>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, image_path, technologies,
                    project_url, github_url, featured, created_at, updated_at
             FROM projects ORDER BY featured DESC, created_at DESC",
        )?;

        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// Featured projects, newest first
    pub fn list_featured(&self) -> Result<Vec<Project>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, image_path, technologies,
                    project_url, github_url, featured, created_at, updated_at
             FROM projects WHERE featured = 1 ORDER BY created_at DESC",
        )?;

        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Project>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, image_path, technologies,
                    project_url, github_url, featured, created_at, updated_at
             FROM projects WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], Self::row_to_project) {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, input: &ProjectInput) -> Result<Project> {
        let now = Utc::now().to_rfc3339();
        let project = Project {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            image_path: input.image_path.clone(),
            technologies: input.technologies.clone(),
            project_url: input.project_url.clone(),
            github_url: input.github_url.clone(),
            featured: input.featured,
            created_at: now.clone(),
            updated_at: now,
        };

        let technologies_json =
            serde_json::to_string(&project.technologies).context("Failed to encode technologies")?;

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO projects (id, title, description, image_path, technologies,
                                   project_url, github_url, featured, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                project.id.to_string(),
                project.title,
                project.description,
                project.image_path,
                technologies_json,
                project.project_url,
                project.github_url,
                project.featured as i64,
                project.created_at,
                project.updated_at,
            ],
        )
        .context("Failed to insert project")?;

        info!("✅ Created project: {} ({})", project.title, project.id);

        Ok(project)
    }

    /// Update a project. Returns the updated record, or None if absent.
    pub fn update(&self, id: &Uuid, input: &ProjectInput) -> Result<Option<Project>> {
        let technologies_json =
            serde_json::to_string(&input.technologies).context("Failed to encode technologies")?;
        let updated_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE projects
             SET title = ?2, description = ?3, image_path = ?4, technologies = ?5,
                 project_url = ?6, github_url = ?7, featured = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                id.to_string(),
                input.title,
                input.description,
                input.image_path,
                technologies_json,
                input.project_url,
                input.github_url,
                input.featured as i64,
                updated_at,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        self.get(id)
    }

    /// Delete a project. Returns false if absent.
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;

        if rows > 0 {
            info!("🗑️  Deleted project: {}", id);
        }

        Ok(rows > 0)
    }
}
