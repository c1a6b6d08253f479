use yew::format::Nothing;
use yew::prelude::*;
use yew::services::fetch::{FetchService, FetchTask, Request};
use yew::agent::{Dispatched, Dispatcher};
use yew::worker::*;

use anyhow::anyhow;

use super::api::*;
use crate::root::agents::{EventBus, Request as BusRequest, ToastLevel};

#[derive(Properties, Clone)]
pub struct TaskListProps {
    pub session: Session,
    pub tasks: Vec<Task>,
    pub on_saved: Callback<Task>,
    pub on_deleted: Callback<TaskId>,
}

/// The task management list: one row per existing task with an edit dialog,
/// plus a create dialog at the bottom.
pub struct TaskList {
    props: TaskListProps,
}

impl Component for TaskList {
    type Message = ();
    type Properties = TaskListProps;

    fn create(props: Self::Properties, _link: ComponentLink<Self>) -> Self {
        Self { props }
    }

    fn change(&mut self, props: Self::Properties) -> ShouldRender {
        self.props = props;
        true
    }

    fn update(&mut self, _msg: Self::Message) -> ShouldRender {
        false
    }

    fn view(&self) -> Html {
        html! {
            <div class="task-list">
            { self.props.tasks.iter().map(|task| {
                html! {
                    <div class="task-row">
                        <span class="task-row-name" title=task.description.clone()>{ &task.name }</span>
                        <span class="task-row-points">{ format!("{} VP", task.points) }</span>
                        <TaskDialog
                            task=Some(task.clone())
                            session=self.props.session.clone()
                            on_saved=self.props.on_saved.clone()
                            on_deleted=self.props.on_deleted.clone() />
                    </div>
                }
            }).collect::<Html>() }
            <TaskDialog
                session=self.props.session.clone()
                on_saved=self.props.on_saved.clone()
                on_deleted=self.props.on_deleted.clone() />
            </div>
        }
    }
}

#[derive(Properties, Clone)]
pub struct TaskDialogProps {
    #[prop_or_default]
    pub task: Option<Task>,
    pub session: Session,
    pub on_saved: Callback<Task>,
    pub on_deleted: Callback<TaskId>,
}

pub enum TaskDialogMsg {
    Open,
    Close,
    NameInput(String),
    DescriptionInput(String),
    PointsInput(String),
    TypePicked(String),
    CategoryPicked(String),
    PriorityPicked(String),
    Save,
    Delete,
    Saved(u32, bool, yew::format::Text),
    Deleted(u32, bool, yew::format::Text),
}

/// Modal create/edit/delete form. Network calls are gated on validation and
/// tagged with the dialog generation; a response from a dialog that has since
/// been closed or reopened is dropped on the floor.
pub struct TaskDialog {
    props: TaskDialogProps,
    link: ComponentLink<Self>,
    event_bus: Dispatcher<EventBus>,
    open: bool,
    form: TaskForm,
    errors: Vec<String>,
    generation: u32,
    _save_fetch_task: Option<FetchTask>,
    _delete_fetch_task: Option<FetchTask>,
}

impl TaskDialog {
    fn toast_error(&mut self, message: String) {
        self.event_bus
            .send(BusRequest::Toast(ToastLevel::Error, message));
    }

    fn current_name(&self) -> String {
        match &self.props.task {
            Some(task) => task.name.clone(),
            None => self.form.name.clone(),
        }
    }

    fn save_task(&mut self) -> Result<(), anyhow::Error> {
        let id = self.props.task.as_ref().and_then(|task| task.id);
        let scores = self
            .props
            .task
            .as_ref()
            .map(|task| task.scores.clone())
            .unwrap_or_default();

        let payload = self
            .form
            .to_task(id, scores)
            .ok_or_else(|| anyhow!("Form is not valid"))?;
        let data = encode_query_value(&serde_json::to_string(&payload)?);

        let url = match id {
            Some(id) => format!("/api/update_task?id={}&data={}", id, data),
            None => {
                let code = self.props.session.code.clone().unwrap_or_default();
                format!("/api/add_task?data={}&code={}", data, encode_query_value(&code))
            }
        };

        let generation = self.generation;
        let request = Request::post(url).body(Nothing)?;

        let callback = self.link.callback(move |response: TextFetchResponse| {
            let success = response.status().is_success();
            TaskDialogMsg::Saved(generation, success, response.into_body())
        });

        let task = FetchService::fetch(request, callback)?;
        self._save_fetch_task = Some(task);

        Ok(())
    }

    fn delete_task(&mut self, task_id: TaskId) -> Result<(), anyhow::Error> {
        let code = self.props.session.code.clone().unwrap_or_default();
        let url = format!("/api/del_task?id={}&code={}", task_id, encode_query_value(&code));

        let generation = self.generation;
        let request = Request::post(url).body(Nothing)?;

        let callback = self.link.callback(move |response: TextFetchResponse| {
            let success = response.status().is_success();
            TaskDialogMsg::Deleted(generation, success, response.into_body())
        });

        let task = FetchService::fetch(request, callback)?;
        self._delete_fetch_task = Some(task);

        Ok(())
    }

    fn view_type_toggle(&self) -> Html {
        let choices = [TaskType::Single, TaskType::Daily, TaskType::Multi];
        html! {
            <div class="toggle-group">
            { choices.iter().map(|choice| {
                let value = choice.as_str();
                let class = if self.form.task_type == Some(*choice) { "toggle active" } else { "toggle" };
                html! {
                    <button type="button" class=class
                        onclick=self.link.callback(move |_| TaskDialogMsg::TypePicked(value.to_string()))>
                        { value }
                    </button>
                }
            }).collect::<Html>() }
            </div>
        }
    }

    fn view_priority_toggle(&self) -> Html {
        let lower = self.form.lower;
        let higher_class = if lower { "toggle" } else { "toggle active" };
        let lower_class = if lower { "toggle active" } else { "toggle" };
        html! {
            <div class="toggle-group">
                <button type="button" class=higher_class
                    onclick=self.link.callback(|_| TaskDialogMsg::PriorityPicked("higher".to_string()))>
                    { "higher" }
                </button>
                <button type="button" class=lower_class
                    onclick=self.link.callback(|_| TaskDialogMsg::PriorityPicked("lower".to_string()))>
                    { "lower" }
                </button>
            </div>
        }
    }

    fn view_category_select(&self) -> Html {
        html! {
            <select onchange=self.link.batch_callback(|change: ChangeData| match change {
                ChangeData::Select(select) => Some(TaskDialogMsg::CategoryPicked(select.value())),
                _ => None,
            })>
                <option value="" selected=self.form.category.is_none() disabled=true>{ "Select a category" }</option>
                { TaskCategory::ORDERED.iter().map(|category| {
                    let selected = self.form.category == Some(*category);
                    html! {
                        <option value=category.as_str() selected=selected>
                            { category.label() }
                        </option>
                    }
                }).collect::<Html>() }
            </select>
        }
    }

    fn view_form(&self) -> Html {
        let title = match &self.props.task {
            Some(task) => format!("Editing \"{}\"", task.name),
            None => "Create A New Task".to_string(),
        };

        html! {
            <>
            <div class="modal-background" onclick=self.link.callback(|_| TaskDialogMsg::Close) />
            <div class="modal">
                <div class="modal-title">
                    { title }
                    { if self.props.task.is_some() {
                        html! {
                            <button class="task-delete" onclick=self.link.callback(|_| TaskDialogMsg::Delete)>{ "Delete" }</button>
                        }
                    } else {
                        html! {}
                    } }
                </div>
                <label>{ "Name" }</label>
                <input placeholder="Task Name" value=self.form.name.clone()
                    oninput=self.link.callback(|input: InputData| TaskDialogMsg::NameInput(input.value)) />
                <div class="char-count">{ format!("{:02}/64 Chars", self.form.name.chars().count()) }</div>
                <label>{ "Description" }</label>
                <textarea placeholder="Task Description" value=self.form.description.clone()
                    oninput=self.link.callback(|input: InputData| TaskDialogMsg::DescriptionInput(input.value)) />
                <label>{ "# of VPs" }</label>
                <input type="number" placeholder="Task VP Worth" value=self.form.points.clone()
                    oninput=self.link.callback(|input: InputData| TaskDialogMsg::PointsInput(input.value)) />
                <label>{ "Type" }</label>
                { self.view_type_toggle() }
                <label>{ "Priority" }<span class="hint">{ " (not required if using single)" }</span></label>
                { self.view_priority_toggle() }
                <label>{ "Category" }</label>
                { self.view_category_select() }
                { if self.errors.is_empty() {
                    html! {}
                } else {
                    html! {
                        <ul class="form-errors">
                        { self.errors.iter().map(|error| html! { <li>{ error }</li> }).collect::<Html>() }
                        </ul>
                    }
                } }
                <div class="modal-footer">
                    <button onclick=self.link.callback(|_| TaskDialogMsg::Close)>{ "Cancel" }</button>
                    <button onclick=self.link.callback(|_| TaskDialogMsg::Save)>
                        { if self.props.task.is_some() { "Submit" } else { "Create" } }
                    </button>
                </div>
            </div>
            </>
        }
    }
}

impl Component for TaskDialog {
    type Message = TaskDialogMsg;
    type Properties = TaskDialogProps;

    fn create(props: Self::Properties, link: ComponentLink<Self>) -> Self {
        Self {
            props,
            link,
            event_bus: EventBus::dispatcher(),
            open: false,
            form: TaskForm::default(),
            errors: vec![],
            generation: 0,
            _save_fetch_task: None,
            _delete_fetch_task: None,
        }
    }

    fn change(&mut self, props: Self::Properties) -> ShouldRender {
        self.props = props;
        true
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            TaskDialogMsg::Open => {
                self.form = match &self.props.task {
                    Some(task) => TaskForm::from_task(task),
                    None => TaskForm::default(),
                };
                self.errors.clear();
                self.open = true;
                self.generation += 1;
                true
            }
            TaskDialogMsg::Close => {
                self.open = false;
                self.generation += 1;
                true
            }
            TaskDialogMsg::NameInput(value) => {
                self.form.name = value;
                true
            }
            TaskDialogMsg::DescriptionInput(value) => {
                self.form.description = value;
                false
            }
            TaskDialogMsg::PointsInput(value) => {
                self.form.points = value;
                false
            }
            TaskDialogMsg::TypePicked(value) => {
                self.form.task_type = TaskType::parse(&value);
                true
            }
            TaskDialogMsg::CategoryPicked(value) => {
                self.form.category = TaskCategory::parse(&value);
                true
            }
            TaskDialogMsg::PriorityPicked(value) => {
                self.form.lower = value == "lower";
                true
            }
            TaskDialogMsg::Save => {
                self.errors = self.form.validate();
                if !self.errors.is_empty() {
                    return true;
                }

                if let Err(e) = self.save_task() {
                    log_error_to_js(e);
                }
                false
            }
            TaskDialogMsg::Delete => {
                if let Some(id) = self.props.task.as_ref().and_then(|task| task.id) {
                    if let Err(e) = self.delete_task(id) {
                        log_error_to_js(e);
                    }
                }
                false
            }
            TaskDialogMsg::Saved(generation, success, body) => {
                if generation != self.generation {
                    return false;
                }

                match parse_record::<Task>(success, body) {
                    Ok(task) => {
                        self.props.on_saved.emit(task);
                        self.open = false;
                        self.generation += 1;
                        if self.props.task.is_none() {
                            self.form = TaskForm::default();
                        }
                    }
                    Err(message) => {
                        let verb = if self.props.task.is_some() { "updating" } else { "adding" };
                        self.toast_error(format!(
                            "We ran into an error when {} {}, {}",
                            verb,
                            self.current_name(),
                            message
                        ));
                    }
                }
                true
            }
            TaskDialogMsg::Deleted(generation, success, body) => {
                if generation != self.generation {
                    return false;
                }

                if success {
                    if let Some(id) = self.props.task.as_ref().and_then(|task| task.id) {
                        self.props.on_deleted.emit(id);
                    }
                    self.open = false;
                    self.generation += 1;
                } else {
                    self.toast_error(format!(
                        "We ran into an error when deleting {}, {}",
                        self.current_name(),
                        error_message(body)
                    ));
                }
                true
            }
        }
    }

    fn view(&self) -> Html {
        let trigger = match &self.props.task {
            Some(_) => html! {
                <button class="task-edit" onclick=self.link.callback(|_| TaskDialogMsg::Open)>{ "Edit" }</button>
            },
            None => html! {
                <button class="task-create" onclick=self.link.callback(|_| TaskDialogMsg::Open)>{ "Create new task" }</button>
            },
        };

        html! {
            <>
            { trigger }
            { if self.open { self.view_form() } else { html! {} } }
            </>
        }
    }
}
