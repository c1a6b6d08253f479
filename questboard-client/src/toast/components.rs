use std::time::Duration;

use yew::prelude::*;
use yew::services::interval::{IntervalService, IntervalTask};
use yew::worker::*;

use crate::root::agents::{EventBus, Request as BusRequest, ToastLevel};

const TICKS_BEFORE_EXPIRY: u32 = 6;

struct Toast {
    level: ToastLevel,
    message: String,
    ticks: u32,
}

pub enum ToastComponentMsg {
    Incoming(BusRequest),
    Tick,
}

/// Non-blocking notification stack fed by the event bus. Toasts expire on
/// their own; nothing here ever interrupts the rest of the UI.
pub struct ToastComponent {
    _producer: Box<dyn Bridge<EventBus>>,
    _interval_task: Option<IntervalTask>,
    toasts: Vec<Toast>,
    link: ComponentLink<Self>,
}

impl Component for ToastComponent {
    type Message = ToastComponentMsg;
    type Properties = ();

    fn create(_props: Self::Properties, link: ComponentLink<Self>) -> Self {
        Self {
            _producer: EventBus::bridge(link.callback(ToastComponentMsg::Incoming)),
            _interval_task: None,
            toasts: vec![],
            link,
        }
    }

    fn change(&mut self, _: Self::Properties) -> ShouldRender {
        false
    }

    fn update(&mut self, msg: Self::Message) -> ShouldRender {
        match msg {
            ToastComponentMsg::Incoming(BusRequest::Toast(level, message)) => {
                self.toasts.push(Toast {
                    level,
                    message,
                    ticks: 0,
                });
                true
            }
            ToastComponentMsg::Tick => {
                if self.toasts.is_empty() {
                    return false;
                }

                for toast in self.toasts.iter_mut() {
                    toast.ticks += 1;
                }
                self.toasts.retain(|toast| toast.ticks < TICKS_BEFORE_EXPIRY);
                true
            }
        }
    }

    fn view(&self) -> Html {
        html! {
            <div class="toast-stack">
            { self.toasts.iter().map(|toast| {
                let class = match toast.level {
                    ToastLevel::Info => "toast",
                    ToastLevel::Error => "toast toast-error",
                };
                html! {
                    <div class=class>{ &toast.message }</div>
                }
            }).collect::<Html>() }
            </div>
        }
    }

    fn rendered(&mut self, first_render: bool) {
        if first_render {
            self._interval_task = Some(IntervalService::spawn(
                Duration::new(1, 0),
                self.link.callback(|_| ToastComponentMsg::Tick),
            ));
        }
    }
}
