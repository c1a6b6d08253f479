use std::collections::HashSet;

use yew::format::Nothing;
use yew::prelude::*;
use yew::services::fetch::{FetchService, FetchTask, Request};
use yew::agent::{Dispatched, Dispatcher};
use yew::worker::*;

use crate::root::agents::{EventBus, Request as BusRequest, ToastLevel};
use crate::tasks::api::*;

#[derive(Properties, Clone)]
pub struct SubmitProps {
    pub session: Session,
    pub tasks: Vec<Task>,
    pub on_submitted: Callback<Vec<Verification>>,
}

pub enum SubmitMsg {
    TypePicked(String),
    SelectTask(TaskId),
    ToggleTask(TaskId),
    AmountInput(String),
    InfoInput(String),
    Submit,
    SubmittedOne(u32, bool, yew::format::Text),
    SubmittedBulk(u32, bool, yew::format::Text),
}

/// Submission card: pick a type, pick the eligible task(s), add proof, send.
/// Daily selections go out as one bulk request. Form state survives a failed
/// request so the user can retry; it is only cleared on success.
pub struct SubmitComponent {
    props: SubmitProps,
    link: ComponentLink<Self>,
    event_bus: Dispatcher<EventBus>,
    picked_type: Option<TaskType>,
    selected: Option<TaskId>,
    selected_set: HashSet<TaskId>,
    amount: String,
    info: String,
    generation: u32,
    _submit_fetch_task: Option<FetchTask>,
}

impl SubmitComponent {
    fn clear_form(&mut self) {
        self.selected = None;
        self.selected_set.clear();
        self.amount = String::new();
        self.info = String::new();
    }

    fn submit_one(&mut self, task_id: TaskId) -> Result<(), anyhow::Error> {
        let amount: f64 = self.amount.parse().unwrap_or(1.0);
        let url = format!(
            "/api/submit_task?id={}&name={}&amount={}&description={}",
            task_id,
            encode_query_value(&self.props.session.name),
            amount,
            encode_query_value(&self.info),
        );

        let generation = self.generation;
        let request = Request::post(url).body(Nothing)?;

        let callback = self.link.callback(move |response: TextFetchResponse| {
            let success = response.status().is_success();
            SubmitMsg::SubmittedOne(generation, success, response.into_body())
        });

        self._submit_fetch_task = Some(FetchService::fetch(request, callback)?);

        Ok(())
    }

    fn submit_bulk(&mut self) -> Result<(), anyhow::Error> {
        let mut task_ids: Vec<TaskId> = self.selected_set.iter().copied().collect();
        task_ids.sort_unstable();

        let amount: f64 = self.amount.parse().unwrap_or(1.0);
        let url = format!(
            "/api/bulk_task?tasks={}&name={}&amount={}&description={}",
            encode_query_value(&serde_json::to_string(&task_ids)?),
            encode_query_value(&self.props.session.name),
            amount,
            encode_query_value(&self.info),
        );

        let generation = self.generation;
        let request = Request::post(url).body(Nothing)?;

        let callback = self.link.callback(move |response: TextFetchResponse| {
            let success = response.status().is_success();
            SubmitMsg::SubmittedBulk(generation, success, response.into_body())
        });

        self._submit_fetch_task = Some(FetchService::fetch(request, callback)?);

        Ok(())
    }

    fn handle_submitted(&mut self, records: Result<Vec<Verification>, String>) {
        match records {
            Ok(records) => {
                self.event_bus.send(BusRequest::Toast(
                    ToastLevel::Info,
                    format!("Submitted {} task(s) for verification", records.len()),
                ));
                self.props.on_submitted.emit(records);
                self.clear_form();
                self.generation += 1;
            }
            Err(message) => {
                // Selection and proof text are kept for retry.
                self.event_bus.send(BusRequest::Toast(
                    ToastLevel::Error,
                    format!("Submission failed ({}), your input was kept", message),
                ));
            }
        }
    }

    fn eligible_tasks(&self) -> Vec<Task> {
        match self.picked_type {
            Some(TaskType::Single) => {
                eligible_single_tasks(&self.props.tasks, &self.props.session.name)
            }
            Some(task_type) => tasks_of_type(&self.props.tasks, task_type),
            None => vec![],
        }
    }

    fn view_task_row(&self, task: &Task) -> Html {
        let id = match task.id {
            Some(id) => id,
            None => return html! {},
        };

        let multi_select = self.picked_type == Some(TaskType::Daily);
        let checked = if multi_select {
            self.selected_set.contains(&id)
        } else {
            self.selected == Some(id)
        };

        let onclick = if multi_select {
            self.link.callback(move |_| SubmitMsg::ToggleTask(id))
        } else {
            self.link.callback(move |_| SubmitMsg::SelectTask(id))
        };

        let class = if checked { "submit-row selected" } else { "submit-row" };

        html! {
            <div class=class onclick=onclick>
                <span class="submit-row-name">{ &task.name }</span>
                <span class="submit-row-category">{ task.category.label() }</span>
                <span class="submit-row-points">{ task.points }</span>
            </div>
        }
    }

    fn view_amount_input(&self) -> Html {
        // Single completions are one-shot; only repeatable types take an amount.
        match self.picked_type {
            Some(TaskType::Daily) | Some(TaskType::Multi) => html! {
                <>
                <label>{ "Amount" }</label>
                <input type="number" value=self.amount.clone()
                    oninput=self.link.callback(|input: InputData| SubmitMsg::AmountInput(input.value)) />
                </>
            },
            _ => html! {},
        }
    }
}

impl Component for SubmitComponent {
    type Message = SubmitMsg;
    type Properties = SubmitProps;

    fn create(props: Self::Properties, link: ComponentLink<Self>) -> Self {
        Self {
            props,
            link,
            event_bus: EventBus::dispatcher(),
            picked_type: None,
            selected: None,
            selected_set: HashSet::new(),
            amount: String::new(),
            info: String::new(),
            generation: 0,
            _submit_fetch_task: None,
        }
    }

    fn change(&mut self, props: Self::Properties) -> ShouldRender {
        self.props = props;
        true
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            SubmitMsg::TypePicked(value) => {
                self.picked_type = TaskType::parse(&value);
                self.selected = None;
                self.selected_set.clear();
                self.generation += 1;
                true
            }
            SubmitMsg::SelectTask(id) => {
                self.selected = Some(id);
                true
            }
            SubmitMsg::ToggleTask(id) => {
                if !self.selected_set.remove(&id) {
                    self.selected_set.insert(id);
                }
                true
            }
            SubmitMsg::AmountInput(value) => {
                self.amount = value;
                false
            }
            SubmitMsg::InfoInput(value) => {
                self.info = value;
                false
            }
            SubmitMsg::Submit => {
                let result = match self.picked_type {
                    Some(TaskType::Daily) => {
                        if self.selected_set.is_empty() {
                            return false;
                        }
                        self.submit_bulk()
                    }
                    Some(_) => match self.selected {
                        Some(id) => self.submit_one(id),
                        None => return false,
                    },
                    None => return false,
                };

                if let Err(e) = result {
                    log_error_to_js(e);
                }
                false
            }
            SubmitMsg::SubmittedOne(generation, success, body) => {
                if generation != self.generation {
                    return false;
                }

                let records = parse_record::<Verification>(success, body).map(|record| vec![record]);
                self.handle_submitted(records);
                true
            }
            SubmitMsg::SubmittedBulk(generation, success, body) => {
                if generation != self.generation {
                    return false;
                }

                let records = parse_record::<Vec<Verification>>(success, body);
                self.handle_submitted(records);
                true
            }
        }
    }

    fn view(&self) -> Html {
        let tasks = self.eligible_tasks();

        html! {
            <div class="submit-card">
                <h2>{ "Submit" }</h2>
                <label>{ "Type" }</label>
                <select onchange=self.link.batch_callback(|change: ChangeData| match change {
                    ChangeData::Select(select) => Some(SubmitMsg::TypePicked(select.value())),
                    _ => None,
                })>
                    <option value="" selected=self.picked_type.is_none() disabled=true>{ "Select a type" }</option>
                    { [TaskType::Single, TaskType::Daily, TaskType::Multi].iter().map(|choice| {
                        let selected = self.picked_type == Some(*choice);
                        html! {
                            <option value=choice.as_str() selected=selected>{ choice.as_str() }</option>
                        }
                    }).collect::<Html>() }
                </select>
                { if self.picked_type.is_some() {
                    html! {
                        <>
                        <label>{ "Tasks" }</label>
                        <div class="submit-header">
                            <h3>{ "Name" }</h3>
                            <h3>{ "Category" }</h3>
                            <h3>{ "Points" }</h3>
                        </div>
                        <div class="submit-rows">
                        { tasks.iter().map(|task| self.view_task_row(task)).collect::<Html>() }
                        </div>
                        { self.view_amount_input() }
                        <label>{ "More info" }</label>
                        <textarea placeholder="Put a bit more info about your task completion"
                            value=self.info.clone()
                            oninput=self.link.callback(|input: InputData| SubmitMsg::InfoInput(input.value)) />
                        </>
                    }
                } else {
                    html! {}
                } }
                <button class="submit-button" onclick=self.link.callback(|_| SubmitMsg::Submit)>{ "Submit" }</button>
            </div>
        }
    }
}
