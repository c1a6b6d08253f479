use yew::format::Nothing;
use yew::prelude::*;
use yew::services::fetch::{FetchService, FetchTask, Request};
use yew::utils;

use crate::leaderboard::components::Leaderboard;
use crate::sidebar::components::Sidebar;
use crate::submit::components::SubmitComponent;
use crate::tasks::api::*;
use crate::toast::components::ToastComponent;

pub enum RootMsg {
    LoadTasks,
    LoadUsers,
    LoadVerifications,
    ReceivedTasks(bool, yew::format::Text),
    ReceivedUsers(bool, yew::format::Text),
    ReceivedVerifications(bool, yew::format::Text),
    TaskSaved(Task),
    TaskDeleted(TaskId),
    UserSaved(User),
    VerificationsAdded(Vec<Verification>),
}

/// App shell. Owns the session and the server-backed lists, loads them on
/// mount, and hands children patch callbacks so local state tracks exactly
/// what the server confirmed.
pub struct RootComponent {
    link: ComponentLink<Self>,
    session: Session,
    tasks: Vec<Task>,
    users: Vec<User>,
    verifications: Vec<Verification>,
    _get_tasks_fetch_task: Option<FetchTask>,
    _get_users_fetch_task: Option<FetchTask>,
    _get_verifications_fetch_task: Option<FetchTask>,
}

impl RootComponent {
    fn fetch_list(
        &self,
        url: &'static str,
        wrap: fn(bool, yew::format::Text) -> RootMsg,
    ) -> Result<FetchTask, anyhow::Error> {
        let request = Request::get(url).body(Nothing)?;

        let callback = self.link.callback(move |response: TextFetchResponse| {
            let success = response.status().is_success();
            wrap(success, response.into_body())
        });

        Ok(FetchService::fetch(request, callback)?)
    }

    fn task_name(&self, task_id: TaskId) -> String {
        self.tasks
            .iter()
            .find(|task| task.id == Some(task_id))
            .map(|task| task.name.clone())
            .unwrap_or_else(|| format!("task #{}", task_id))
    }

    fn view_verifications(&self) -> Html {
        html! {
            <div class="verify-card">
                <h2>{ "Verify" }</h2>
                { if self.verifications.is_empty() {
                    html! { <p class="verify-empty">{ "Nothing awaiting verification." }</p> }
                } else {
                    self.verifications.iter().map(|verification| {
                        html! {
                            <div class="verify-row">
                                <span class="verify-task">{ self.task_name(verification.task_id) }</span>
                                <span class="verify-user">{ &verification.user }</span>
                                <span class="verify-amount">{ verification.amount }</span>
                                <span class="verify-description">{ &verification.description }</span>
                            </div>
                        }
                    }).collect::<Html>()
                } }
            </div>
        }
    }
}

impl Component for RootComponent {
    type Message = RootMsg;
    type Properties = ();

    fn create(_props: Self::Properties, link: ComponentLink<Self>) -> Self {
        let query = utils::window()
            .location()
            .search()
            .unwrap_or_default();

        Self {
            link,
            session: Session::from_query(&query),
            tasks: vec![],
            users: vec![],
            verifications: vec![],
            _get_tasks_fetch_task: None,
            _get_users_fetch_task: None,
            _get_verifications_fetch_task: None,
        }
    }

    fn change(&mut self, _: Self::Properties) -> ShouldRender {
        false
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            RootMsg::LoadTasks => {
                match self.fetch_list("/api/get_tasks", RootMsg::ReceivedTasks) {
                    Ok(task) => self._get_tasks_fetch_task = Some(task),
                    Err(e) => log_error_to_js(e),
                }
                false
            }
            RootMsg::LoadUsers => {
                match self.fetch_list("/api/get_users", RootMsg::ReceivedUsers) {
                    Ok(task) => self._get_users_fetch_task = Some(task),
                    Err(e) => log_error_to_js(e),
                }
                false
            }
            RootMsg::LoadVerifications => {
                match self.fetch_list("/api/get_verifications", RootMsg::ReceivedVerifications) {
                    Ok(task) => self._get_verifications_fetch_task = Some(task),
                    Err(e) => log_error_to_js(e),
                }
                false
            }
            RootMsg::ReceivedTasks(success, body) => {
                match parse_record::<Vec<Task>>(success, body) {
                    Ok(tasks) => self.tasks = tasks,
                    // An empty store answers 404; that is just an empty board.
                    Err(message) => log_to_js(&message),
                }
                true
            }
            RootMsg::ReceivedUsers(success, body) => {
                match parse_record::<Vec<User>>(success, body) {
                    Ok(users) => self.users = users,
                    Err(message) => log_to_js(&message),
                }
                true
            }
            RootMsg::ReceivedVerifications(success, body) => {
                match parse_record::<Vec<Verification>>(success, body) {
                    Ok(verifications) => self.verifications = verifications,
                    Err(message) => log_to_js(&message),
                }
                true
            }
            RootMsg::TaskSaved(task) => {
                patch_task(&mut self.tasks, task);
                true
            }
            RootMsg::TaskDeleted(task_id) => {
                remove_task(&mut self.tasks, task_id);
                true
            }
            RootMsg::UserSaved(user) => {
                patch_user(&mut self.users, user);
                true
            }
            RootMsg::VerificationsAdded(mut records) => {
                self.verifications.append(&mut records);
                true
            }
        }
    }

    fn view(&self) -> Html {
        let user = self
            .users
            .iter()
            .find(|user| user.name == self.session.name)
            .cloned();

        html! {
            <main class="layout">
                <section class="layout-left">
                    <Sidebar
                        session=self.session.clone()
                        user=user
                        tasks=self.tasks.clone()
                        on_user_saved=self.link.callback(RootMsg::UserSaved)
                        on_task_saved=self.link.callback(RootMsg::TaskSaved)
                        on_task_deleted=self.link.callback(RootMsg::TaskDeleted) />
                </section>
                <section class="layout-center">
                    <SubmitComponent
                        session=self.session.clone()
                        tasks=self.tasks.clone()
                        on_submitted=self.link.callback(RootMsg::VerificationsAdded) />
                    { self.view_verifications() }
                </section>
                <section class="layout-right">
                    <Leaderboard tasks=self.tasks.clone() users=self.users.clone() />
                </section>
                <ToastComponent />
            </main>
        }
    }

    fn rendered(&mut self, first_render: bool) {
        if first_render {
            self.link.send_message(RootMsg::LoadTasks);
            self.link.send_message(RootMsg::LoadUsers);
            self.link.send_message(RootMsg::LoadVerifications);
        }
    }
}
