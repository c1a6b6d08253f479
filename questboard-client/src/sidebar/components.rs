use yew::format::Nothing;
use yew::prelude::*;
use yew::services::fetch::{FetchService, FetchTask, Request};
use yew::agent::{Dispatched, Dispatcher};
use yew::worker::*;

use crate::root::agents::{EventBus, Request as BusRequest, ToastLevel};
use crate::tasks::api::*;
use crate::tasks::components::TaskList;

#[derive(Properties, Clone)]
pub struct SidebarProps {
    pub session: Session,
    pub user: Option<User>,
    pub tasks: Vec<Task>,
    pub on_user_saved: Callback<User>,
    pub on_task_saved: Callback<Task>,
    pub on_task_deleted: Callback<TaskId>,
}

pub enum SidebarMsg {
    AvatarInput(String),
    Save,
    Saved(bool, yew::format::Text),
}

/// Profile panel: read-only name, editable avatar URL, and the task
/// management list. Everything mutating is gated on the session code.
pub struct Sidebar {
    props: SidebarProps,
    link: ComponentLink<Self>,
    event_bus: Dispatcher<EventBus>,
    avatar: String,
    _update_fetch_task: Option<FetchTask>,
}

impl Sidebar {
    fn update_user(&mut self) -> Result<(), anyhow::Error> {
        let url = format!(
            "/api/update_user?name={}&avatar={}",
            encode_query_value(&self.props.session.name.to_lowercase()),
            encode_query_value(&self.avatar),
        );

        let request = Request::post(url).body(Nothing)?;

        let callback = self.link.callback(|response: TextFetchResponse| {
            let success = response.status().is_success();
            SidebarMsg::Saved(success, response.into_body())
        });

        self._update_fetch_task = Some(FetchService::fetch(request, callback)?);

        Ok(())
    }
}

impl Component for Sidebar {
    type Message = SidebarMsg;
    type Properties = SidebarProps;

    fn create(props: Self::Properties, link: ComponentLink<Self>) -> Self {
        Self {
            props,
            link,
            event_bus: EventBus::dispatcher(),
            avatar: String::new(),
            _update_fetch_task: None,
        }
    }

    fn change(&mut self, props: Self::Properties) -> ShouldRender {
        self.props = props;
        true
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            SidebarMsg::AvatarInput(value) => {
                self.avatar = value;
                false
            }
            SidebarMsg::Save => {
                if !self.props.session.has_code() {
                    return false;
                }

                if let Err(e) = self.update_user() {
                    log_error_to_js(e);
                }
                false
            }
            SidebarMsg::Saved(success, body) => {
                match parse_record::<User>(success, body) {
                    Ok(user) => {
                        self.event_bus
                            .send(BusRequest::Toast(ToastLevel::Info, "Profile saved".to_string()));
                        self.props.on_user_saved.emit(user);
                    }
                    Err(message) => {
                        self.event_bus.send(BusRequest::Toast(
                            ToastLevel::Error,
                            format!("Could not save profile, {}", message),
                        ));
                    }
                }
                true
            }
        }
    }

    fn view(&self) -> Html {
        let has_code = self.props.session.has_code();
        let name = match (&self.props.user, has_code) {
            (_, false) => String::new(),
            (Some(user), true) => user.name.clone(),
            (None, true) => self.props.session.name.clone(),
        };

        html! {
            <div class="sidebar">
                <div class="sidebar-card">
                    <h2>{ "User" }</h2>
                    <label>{ "Name" }</label>
                    <input value=name placeholder="Loading user information..." readonly=true />
                    <label>{ "Profile Picture" }</label>
                    <input placeholder="Paste an image link here" value=self.avatar.clone()
                        disabled=!has_code
                        oninput=self.link.callback(|input: InputData| SidebarMsg::AvatarInput(input.value)) />
                    <button disabled=!has_code onclick=self.link.callback(|_| SidebarMsg::Save)>
                        { "Save" }
                    </button>
                </div>
                { if has_code {
                    html! {
                        <div class="sidebar-card">
                            <h2>{ "Tasks" }</h2>
                            <TaskList
                                session=self.props.session.clone()
                                tasks=self.props.tasks.clone()
                                on_saved=self.props.on_task_saved.clone()
                                on_deleted=self.props.on_task_deleted.clone() />
                        </div>
                    }
                } else {
                    html! {}
                } }
            </div>
        }
    }
}
