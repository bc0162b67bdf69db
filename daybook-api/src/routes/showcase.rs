/// Fixed sample endpoints
///
/// These answer with constant data and never touch the database. Clients
/// use them as a smoke test of the deployment.
///
/// # Endpoints
///
/// - `GET /` - Welcome text
/// - `GET /music` - Three songs
/// - `GET /calendar` - Two events
/// - `GET /tasks` - Three tasks

use axum::Json;
use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "👋 Welcome to the MCP server! Try /music, /calendar, or /tasks";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub event: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task: String,
    pub status: String,
}

pub async fn welcome() -> &'static str {
    WELCOME
}

pub async fn music() -> Json<Vec<Song>> {
    let songs = [
        ("Blinding Lights", "The Weeknd"),
        ("Levitating", "Dua Lipa"),
        ("Peaches", "Justin Bieber"),
    ];

    Json(
        songs
            .into_iter()
            .map(|(title, artist)| Song {
                title: title.to_string(),
                artist: artist.to_string(),
            })
            .collect(),
    )
}

pub async fn calendar() -> Json<Vec<Appointment>> {
    let events = [
        ("Team Meeting", "2025-08-10", "10:00 AM"),
        ("Code Review", "2025-08-11", "2:00 PM"),
    ];

    Json(
        events
            .into_iter()
            .map(|(event, date, time)| Appointment {
                event: event.to_string(),
                date: date.to_string(),
                time: time.to_string(),
            })
            .collect(),
    )
}

pub async fn tasks() -> Json<Vec<TaskStatus>> {
    let tasks = [
        ("Complete MCP Submission", "Pending"),
        ("Record Demo Video", "In Progress"),
        ("Submit GitHub Link", "Done"),
    ];

    Json(
        tasks
            .into_iter()
            .map(|(task, status)| TaskStatus {
                task: task.to_string(),
                status: status.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_music_order() {
        let Json(songs) = music().await;
        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Blinding Lights", "Levitating", "Peaches"]);
    }

    #[tokio::test]
    async fn test_tasks_serialize_with_task_and_status_keys() {
        let Json(tasks) = tasks().await;
        let json = serde_json::to_value(&tasks[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"task": "Record Demo Video", "status": "In Progress"})
        );
    }
}
