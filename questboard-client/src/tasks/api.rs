use serde::{Deserialize, Serialize};
use yew::services::fetch::Response;
use yew::services::ConsoleService;

use std::collections::HashMap;

pub type TaskId = i64;
pub type VerificationId = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Daily,
    Multi,
    Single,
    Weekly,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Daily => "daily",
            TaskType::Multi => "multi",
            TaskType::Single => "single",
            TaskType::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Option<TaskType> {
        match s {
            "daily" => Some(TaskType::Daily),
            "multi" => Some(TaskType::Multi),
            "single" => Some(TaskType::Single),
            "weekly" => Some(TaskType::Weekly),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Health,
    Normal,
    Cool,
    Productivity,
    Insane,
}

impl TaskCategory {
    pub const ORDERED: [TaskCategory; 5] = [
        TaskCategory::Health,
        TaskCategory::Normal,
        TaskCategory::Cool,
        TaskCategory::Productivity,
        TaskCategory::Insane,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Health => "health",
            TaskCategory::Normal => "normal",
            TaskCategory::Cool => "cool",
            TaskCategory::Productivity => "productivity",
            TaskCategory::Insane => "insane",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Health => "Health",
            TaskCategory::Normal => "Become Normal",
            TaskCategory::Cool => "POV: Cool",
            TaskCategory::Productivity => "Productivity",
            TaskCategory::Insane => "INSANE",
        }
    }

    pub fn parse(s: &str) -> Option<TaskCategory> {
        match s {
            "health" => Some(TaskCategory::Health),
            "normal" => Some(TaskCategory::Normal),
            "cool" => Some(TaskCategory::Cool),
            "productivity" => Some(TaskCategory::Productivity),
            "insane" => Some(TaskCategory::Insane),
            _ => None,
        }
    }
}

pub type ScoreMap = HashMap<String, f64>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub points: f64,
    pub category: TaskCategory,
    pub lower: bool,
    #[serde(default)]
    pub scores: ScoreMap,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Verification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<VerificationId>,
    pub task_id: TaskId,
    pub user: String,
    pub amount: f64,
    pub description: String,
    pub status: VerificationStatus,
    pub submitted_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Session established once at startup from the page query string. Replaces
/// the ambient browser-storage code/username pair with an explicit object
/// passed down the component tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub name: String,
    pub code: Option<String>,
}

impl Session {
    /// Query values arrive percent-encoded from `Location::search()` and
    /// must be decoded before they are compared against store keys.
    pub fn from_query(query: &str) -> Session {
        let mut session = Session::default();

        for pair in query.trim_start_matches('?').split('&') {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("name"), Some(value)) => {
                    session.name = decode_query_value(value).to_lowercase()
                }
                (Some("code"), Some(value)) if !value.is_empty() => {
                    session.code = Some(decode_query_value(value))
                }
                _ => {}
            }
        }

        session
    }

    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }
}

pub type TextFetchResponse = Response<yew::format::Text>;

pub fn encode_query_value(s: &str) -> String {
    String::from(js_sys::encode_uri_component(s))
}

#[cfg(target_arch = "wasm32")]
pub fn decode_query_value(s: &str) -> String {
    js_sys::decode_uri_component(s)
        .map(String::from)
        .unwrap_or_else(|_| s.to_string())
}

// js_sys imports cannot be called outside the browser, so host-side tests
// get a plain percent decoder with the same behavior.
#[cfg(not(target_arch = "wasm32"))]
pub fn decode_query_value(s: &str) -> String {
    let raw = s.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'%' && i + 2 < raw.len() {
            if let Some(byte) = std::str::from_utf8(&raw[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn log_error_to_js(e: anyhow::Error) {
    ConsoleService::log(format!("{}", e).as_str());
}

pub fn log_to_js(d: &impl std::fmt::Debug) {
    ConsoleService::log(format!("{:?}", d).as_str());
}

/// Decodes a response into the canonical single shape the server promises:
/// the record itself on success, the server's `message` field otherwise.
pub fn parse_record<T: serde::de::DeserializeOwned>(
    success: bool,
    body: Result<String, anyhow::Error>,
) -> Result<T, String> {
    if !success {
        return Err(error_message(body));
    }

    match body {
        Ok(text) => serde_json::from_str(&text).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Pulls the server's `message` out of a failure body, falling back to the
/// raw text or the transport error.
pub fn error_message(body: Result<String, anyhow::Error>) -> String {
    match body {
        Ok(text) => serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text),
        Err(e) => e.to_string(),
    }
}

/// Folds a server-confirmed task into the local list: the entry with the
/// same id is replaced, an unknown id is appended. Touches exactly one
/// entry and preserves the order of the rest.
pub fn patch_task(tasks: &mut Vec<Task>, saved: Task) {
    match tasks.iter_mut().find(|existing| existing.id == saved.id) {
        Some(existing) => *existing = saved,
        None => tasks.push(saved),
    }
}

pub fn remove_task(tasks: &mut Vec<Task>, task_id: TaskId) {
    tasks.retain(|task| task.id != Some(task_id));
}

/// Same shape as [`patch_task`], keyed on the user's name.
pub fn patch_user(users: &mut Vec<User>, saved: User) {
    match users.iter_mut().find(|existing| existing.name == saved.name) {
        Some(existing) => *existing = saved,
        None => users.push(saved),
    }
}

/// Single tasks the user has not yet completed. A non-zero score means the
/// task was already done once and must not be offered again.
pub fn eligible_single_tasks(tasks: &[Task], user: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.task_type == TaskType::Single)
        .filter(|task| task.scores.get(user).copied().unwrap_or(0.0) == 0.0)
        .cloned()
        .collect()
}

pub fn tasks_of_type(tasks: &[Task], task_type: TaskType) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.task_type == task_type)
        .cloned()
        .collect()
}

/// Per-user point totals (score x task points), highest first; ties broken
/// by name so the ordering is stable.
pub fn leaderboard_totals(tasks: &[Task]) -> Vec<(String, f64)> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for task in tasks {
        for (user, score) in task.scores.iter() {
            *totals.entry(user.clone()).or_default() += score * task.points;
        }
    }

    let mut out: Vec<(String, f64)> = totals.into_iter().collect();
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    out
}

/// Form state for the create/edit dialog. Text fields stay raw strings so
/// partial input survives re-renders; conversion happens on submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub name: String,
    pub description: String,
    pub points: String,
    pub category: Option<TaskCategory>,
    pub task_type: Option<TaskType>,
    pub lower: bool,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> TaskForm {
        TaskForm {
            name: task.name.clone(),
            description: task.description.clone(),
            points: task.points.to_string(),
            category: Some(task.category),
            task_type: Some(task.task_type),
            lower: task.lower,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.name.is_empty() {
            errors.push("Name must be a minimum of 1 character.".to_string());
        } else if self.name.chars().count() > 64 {
            errors.push("Name must be a maximum of 64 characters.".to_string());
        }

        if self.description.is_empty() {
            errors.push("Description must be a minimum of 1 character.".to_string());
        }

        match self.points.parse::<f64>() {
            Ok(points) if points >= 0.1 => {}
            _ => errors.push("Task must be worth a minimum of 0.1 points.".to_string()),
        }

        if self.category.is_none() {
            errors.push("Select a category.".to_string());
        }

        if self.task_type.is_none() {
            errors.push("Select a type.".to_string());
        }

        errors
    }

    /// Builds the task payload once validation has passed. `id` and `scores`
    /// come from the task being edited, if any.
    pub fn to_task(&self, id: Option<TaskId>, scores: ScoreMap) -> Option<Task> {
        if !self.validate().is_empty() {
            return None;
        }

        Some(Task {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            task_type: self.task_type?,
            points: self.points.parse().ok()?,
            category: self.category?,
            lower: self.lower,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, task_type: TaskType, scores: &[(&str, f64)]) -> Task {
        Task {
            id: Some(1),
            name: name.to_string(),
            description: "desc".to_string(),
            task_type,
            points: 2.0,
            category: TaskCategory::Normal,
            lower: false,
            scores: scores.iter().map(|(u, s)| (u.to_string(), *s)).collect(),
        }
    }

    fn task_with_id(id: TaskId, name: &str) -> Task {
        let mut t = task(name, TaskType::Daily, &[]);
        t.id = Some(id);
        t
    }

    #[test]
    fn saving_a_task_patches_exactly_one_entry() {
        let mut tasks = vec![task_with_id(1, "a"), task_with_id(2, "b")];

        patch_task(&mut tasks, task_with_id(2, "b renamed"));
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b renamed"]);

        patch_task(&mut tasks, task_with_id(3, "c"));
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b renamed", "c"]);
    }

    #[test]
    fn deleting_removes_only_the_matching_entry() {
        let mut tasks = vec![task_with_id(1, "a"), task_with_id(2, "b"), task_with_id(3, "c")];

        remove_task(&mut tasks, 2);
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);

        // An id the list never held leaves it untouched.
        remove_task(&mut tasks, 99);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn saving_a_user_upserts_by_name() {
        let alice = User {
            name: "alice".to_string(),
            avatar: None,
        };
        let mut users = vec![alice.clone()];

        patch_user(
            &mut users,
            User {
                name: "alice".to_string(),
                avatar: Some("https://a/1.png".to_string()),
            },
        );
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].avatar.as_deref(), Some("https://a/1.png"));

        patch_user(
            &mut users,
            User {
                name: "bob".to_string(),
                avatar: None,
            },
        );
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "bob");
    }

    #[test]
    fn completed_single_tasks_are_not_eligible() {
        let tasks = vec![
            task("done", TaskType::Single, &[("alice", 1.0)]),
            task("open", TaskType::Single, &[("bob", 1.0)]),
            task("zeroed", TaskType::Single, &[("alice", 0.0)]),
            task("daily", TaskType::Daily, &[]),
        ];

        let eligible = eligible_single_tasks(&tasks, "alice");
        let names: Vec<&str> = eligible.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["open", "zeroed"]);
    }

    #[test]
    fn leaderboard_sums_score_times_points() {
        let mut a = task("a", TaskType::Daily, &[("alice", 3.0), ("bob", 1.0)]);
        a.points = 2.0;
        let mut b = task("b", TaskType::Single, &[("bob", 1.0)]);
        b.points = 10.0;

        let totals = leaderboard_totals(&[a, b]);

        assert_eq!(totals, vec![("bob".to_string(), 12.0), ("alice".to_string(), 6.0)]);
    }

    #[test]
    fn session_parses_name_and_code_from_query() {
        let session = Session::from_query("?name=Alice&code=hunter2");
        assert_eq!(session.name, "alice");
        assert_eq!(session.code.as_deref(), Some("hunter2"));
        assert!(session.has_code());

        let gateless = Session::from_query("?name=bob");
        assert!(!gateless.has_code());

        let empty = Session::from_query("");
        assert_eq!(empty.name, "");
        assert!(!empty.has_code());
    }

    #[test]
    fn session_decodes_percent_encoded_query_values() {
        let session = Session::from_query("?name=Mary%20Jane&code=let%20me%20in");
        assert_eq!(session.name, "mary jane");
        assert_eq!(session.code.as_deref(), Some("let me in"));

        // Values with no escapes pass through untouched.
        assert_eq!(decode_query_value("alice"), "alice");
        // A stray percent sign is left as-is rather than dropped.
        assert_eq!(decode_query_value("50%"), "50%");
    }

    #[test]
    fn form_validation_gates_every_field() {
        let mut form = TaskForm::default();
        assert_eq!(form.validate().len(), 5);

        form.name = "x".repeat(65);
        form.description = "d".to_string();
        form.points = "0.05".to_string();
        form.category = Some(TaskCategory::Health);
        form.task_type = Some(TaskType::Daily);

        let errors = form.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("maximum of 64")));
        assert!(errors.iter().any(|e| e.contains("0.1 points")));

        form.name = "drink water".to_string();
        form.points = "2.5".to_string();
        assert!(form.validate().is_empty());

        let built = form.to_task(None, ScoreMap::new()).unwrap();
        assert_eq!(built.name, "drink water");
        assert_eq!(built.points, 2.5);
        assert!(built.id.is_none());
    }

    #[test]
    fn invalid_form_never_builds_a_payload() {
        let form = TaskForm::default();
        assert!(form.to_task(None, ScoreMap::new()).is_none());
    }

    #[test]
    fn responses_normalize_to_record_or_server_message() {
        let ok: Result<Task, String> = parse_record(
            true,
            Ok(r#"{"id":7,"name":"n","description":"d","type":"single","points":1.0,"category":"cool","lower":false,"scores":{}}"#.to_string()),
        );
        assert_eq!(ok.unwrap().id, Some(7));

        let failed: Result<Task, String> =
            parse_record(false, Ok(r#"{"message":"Tasks not found"}"#.to_string()));
        assert_eq!(failed.unwrap_err(), "Tasks not found");

        let network: Result<Task, String> = parse_record(true, Err(anyhow::anyhow!("offline")));
        assert_eq!(network.unwrap_err(), "offline");
    }

    #[test]
    fn wire_format_uses_type_and_lowercase_enums() {
        let json = serde_json::to_string(&task("a", TaskType::Weekly, &[])).unwrap();
        assert!(json.contains(r#""type":"weekly""#));
        assert!(json.contains(r#""category":"normal""#));
    }
}
